//! Configuration loading from TOML
//!
//! # Configuration File Format
//!
//! ```toml
//! [device]
//! path = "/dev/ipts/0"
//! buffer_size = 16384
//!
//! [detection]
//! activation_threshold = 0.24
//! deactivation_threshold = 0.20
//! min_cluster_size = 3
//! normalize = true
//!
//! [tracking]
//! max_distance = 0.1
//!
//! [stability]
//! temporal_window = 3
//! check_temporal_stability = true
//! size_threshold = [0.01, 0.1]
//! position_threshold = [0.005, 0.1]
//! orientation_threshold = [0.02, 0.2]
//!
//! [validation]
//! track_validity = true
//! size_limits = [0.002, 0.3]
//! aspect_limits = [1.0, 2.5]
//! ```
//!
//! All hysteresis thresholds are `[dead_band, break_band]` pairs; leaving a
//! pair out disables that stage. See `sparshaio.toml` for a complete example.
//!
//! # Validation
//!
//! A malformed configuration is the only fatal condition at the pipeline's
//! level: it is rejected here, at load time, and never surfaced per-frame.

use crate::contacts::{
    DetectorConfig, FinderConfig, StabilizerConfig, TrackerConfig, ValidatorConfig,
};
use crate::error::{Error, Result};
use crate::protocol::constants::DEFAULT_BUFFER_SIZE;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Device configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Path of the IPTS character device (or a raw dump to replay).
    ///
    /// **Default**: "/dev/ipts/0"
    #[serde(default = "default_device_path")]
    pub path: String,

    /// Size of one raw device buffer in bytes.
    ///
    /// **Default**: 16384
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_device_path() -> String {
    "/dev/ipts/0".to_string()
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: default_device_path(),
            buffer_size: default_buffer_size(),
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub detection: DetectorConfig,

    #[serde(default)]
    pub tracking: TrackerConfig,

    #[serde(default)]
    pub stability: StabilizerConfig,

    #[serde(default)]
    pub validation: ValidatorConfig,
}

impl Config {
    /// The contact pipeline part of the configuration.
    pub fn finder(&self) -> FinderConfig {
        FinderConfig {
            detection: self.detection,
            tracking: self.tracking,
            stability: self.stability,
            validation: self.validation,
        }
    }

    /// Load configuration from a TOML file
    ///
    /// # Validation
    ///
    /// - `activation_threshold` must be above `deactivation_threshold`,
    ///   which must be positive
    /// - every hysteresis pair needs `dead_band <= break_band`
    /// - `temporal_window` must be at least 2 when temporal checking
    ///   is enabled
    /// - `max_distance` must be positive, `min_cluster_size` at least 1
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = basic_toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks the cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let detection = &self.detection;

        if detection.deactivation_threshold <= 0.0 {
            return Err(Error::Config(
                "deactivation_threshold must be positive".to_string(),
            ));
        }

        if detection.activation_threshold <= detection.deactivation_threshold {
            return Err(Error::Config(format!(
                "activation_threshold ({}) must be above deactivation_threshold ({})",
                detection.activation_threshold, detection.deactivation_threshold
            )));
        }

        if detection.min_cluster_size == 0 {
            return Err(Error::Config(
                "min_cluster_size must be at least 1".to_string(),
            ));
        }

        if self.tracking.max_distance <= 0.0 {
            return Err(Error::Config("max_distance must be positive".to_string()));
        }

        let stability = &self.stability;

        if stability.check_temporal_stability && stability.temporal_window < 2 {
            return Err(Error::Config(format!(
                "temporal_window must be at least 2 when temporal checking is enabled (got {})",
                stability.temporal_window
            )));
        }

        check_band("size_threshold", stability.size_threshold)?;
        check_band("position_threshold", stability.position_threshold)?;
        check_band("orientation_threshold", stability.orientation_threshold)?;

        check_band("size_limits", self.validation.size_limits)?;
        check_band("aspect_limits", self.validation.aspect_limits)?;

        if self.device.buffer_size == 0 {
            return Err(Error::Config("buffer_size must be positive".to_string()));
        }

        Ok(())
    }
}

fn check_band(name: &str, band: Option<(f32, f32)>) -> Result<()> {
    if let Some((lo, hi)) = band {
        if hi < lo {
            return Err(Error::Config(format!(
                "{}: upper bound {} is below lower bound {}",
                name, hi, lo
            )));
        }
    }

    Ok(())
}
