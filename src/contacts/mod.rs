//! Contact extraction from capacitive heatmaps.
//!
//! The [`Finder`] composes the four processing stages:
//!
//! ```text
//! heatmap ─▶ [detector] ─▶ [tracker] ─▶ [stabilizer] ─▶ [validator] ─▶ contacts
//! ```
//!
//! Detection is a pure function of the heatmap; tracking, stabilization and
//! validation each carry a small amount of per-session state that is cleared
//! by [`Finder::reset`].

mod detector;
mod stabilizer;
mod tracker;
mod validator;

pub use detector::{Blob, BlobDetector, Covariance2, DetectorConfig};
pub use stabilizer::{Stabilizer, StabilizerConfig};
pub use tracker::{Tracker, TrackerConfig};
pub use validator::{Validator, ValidatorConfig};

use crate::types::{Contact, Heatmap};
use serde::Deserialize;
use std::f32::consts::PI;

/// Configuration of the whole contact pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinderConfig {
    #[serde(default)]
    pub detection: DetectorConfig,

    #[serde(default)]
    pub tracking: TrackerConfig,

    #[serde(default)]
    pub stability: StabilizerConfig,

    #[serde(default)]
    pub validation: ValidatorConfig,
}

/// Extracts tracked, stabilized contacts from capacitive heatmaps.
pub struct Finder {
    detector: BlobDetector,
    tracker: Tracker,
    stabilizer: Stabilizer,
    validator: Validator,

    // Blob scratch list, reused across frames.
    blobs: Vec<Blob>,
}

impl Finder {
    pub fn new(config: FinderConfig) -> Self {
        let window = config.stability.temporal_window;

        Self {
            detector: BlobDetector::new(config.detection),
            tracker: Tracker::new(config.tracking, window),
            stabilizer: Stabilizer::new(config.stability),
            validator: Validator::new(config.validation),
            blobs: Vec::with_capacity(16),
        }
    }

    /// Resets the finder by clearing all stored previous frames.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.stabilizer.reset();
        self.validator.reset();
    }

    /// Extracts contacts from a capacitive heatmap.
    ///
    /// After detection every contact is assigned an index that identifies it
    /// over consecutive frames, then its movement is stabilized against the
    /// recent history and its geometry validated.
    pub fn find(&mut self, heatmap: &Heatmap, contacts: &mut Vec<Contact>) {
        self.detector.detect(heatmap, &mut self.blobs);

        contacts.clear();

        let normalize = self.detector.config().normalize;
        let width = heatmap.width() as f32;
        let height = heatmap.height() as f32;
        let diagonal = width.hypot(height);

        for blob in &self.blobs {
            let mut contact = Contact {
                index: None,
                mean: blob.mean,
                size: blob.size,
                orientation: blob.orientation,
                normalized: normalize,
                stable: true,
                valid: true,
            };

            if normalize {
                contact.mean.x /= width;
                contact.mean.y /= height;
                contact.size.x /= diagonal;
                contact.size.y /= diagonal;
                contact.orientation /= PI;
            }

            contacts.push(contact);
        }

        self.tracker.track(contacts, self.stabilizer.last_frame());
        self.stabilizer.stabilize(contacts);
        self.validator.validate(contacts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaussian_heatmap(cx: f32, cy: f32) -> Heatmap {
        let mut map = Heatmap::new(72, 48);

        for y in 0..48 {
            for x in 0..72 {
                let dx = (x as f32 - cx) / 2.0;
                let dy = (y as f32 - cy) / 2.0;
                map.set(x, y, (-0.5 * (dx * dx + dy * dy)).exp());
            }
        }

        map
    }

    fn test_config() -> FinderConfig {
        FinderConfig {
            detection: DetectorConfig {
                activation_threshold: 0.1,
                deactivation_threshold: 0.05,
                min_cluster_size: 3,
                normalize: true,
            },
            tracking: TrackerConfig { max_distance: 0.1 },
            stability: StabilizerConfig {
                temporal_window: 2,
                check_temporal_stability: true,
                ..Default::default()
            },
            validation: ValidatorConfig::default(),
        }
    }

    #[test]
    fn test_empty_heatmap_empty_frame() {
        let mut finder = Finder::new(test_config());
        let map = Heatmap::new(72, 48);
        let mut contacts = Vec::new();

        finder.find(&map, &mut contacts);
        assert!(contacts.is_empty());

        // History still rotates on empty frames
        finder.find(&map, &mut contacts);
        assert!(contacts.is_empty());
    }

    #[test]
    fn test_contact_is_normalized() {
        let mut finder = Finder::new(test_config());
        let map = gaussian_heatmap(20.0, 15.0);
        let mut contacts = Vec::new();

        finder.find(&map, &mut contacts);

        assert_eq!(contacts.len(), 1);
        let contact = &contacts[0];

        assert!(contact.normalized);
        assert!((contact.mean.x - 20.0 / 72.0).abs() < 0.01);
        assert!((contact.mean.y - 15.0 / 48.0).abs() < 0.01);
        assert!(contact.size.x > 0.0 && contact.size.x < 1.0);
        assert!(contact.orientation >= 0.0 && contact.orientation < 1.0);
    }

    #[test]
    fn test_identity_and_stability_across_frames() {
        let mut finder = Finder::new(test_config());
        let map = gaussian_heatmap(20.0, 15.0);
        let mut contacts = Vec::new();

        finder.find(&map, &mut contacts);
        assert_eq!(contacts[0].index, Some(0));
        assert!(!contacts[0].stable);

        finder.find(&map, &mut contacts);
        assert_eq!(contacts[0].index, Some(0));
        assert!(contacts[0].stable);
    }

    #[test]
    fn test_reset_forgets_identities() {
        let mut finder = Finder::new(test_config());
        let map = gaussian_heatmap(20.0, 15.0);
        let mut contacts = Vec::new();

        finder.find(&map, &mut contacts);
        finder.find(&map, &mut contacts);
        assert!(contacts[0].stable);

        finder.reset();

        finder.find(&map, &mut contacts);
        assert_eq!(contacts[0].index, Some(0));
        assert!(!contacts[0].stable);
    }
}
