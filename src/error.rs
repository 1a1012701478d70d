//! Error types for SparshaIO
//!
//! # Error Recovery Strategies
//!
//! Different error types require different recovery approaches:
//!
//! ## Per-Frame Errors (Log and Continue)
//!
//! - **`EndOfData`**, **`InvalidRead`**, **`InvalidSeek`**: The decoder ran
//!   past the bounds of a device buffer. The buffer is discarded and the
//!   pipeline continues with the next one. A momentary parse error manifests
//!   as a single skipped frame of output; persistent errors (a device
//!   delivering garbage) produce no contacts and no crash.
//!
//! ## Transient Errors (Retry Recommended)
//!
//! - **`Io`**: Generic I/O error from the device file. Usually retryable
//!   after a brief delay, unless the device node disappeared.
//!
//! ## Configuration Errors (Fix and Restart)
//!
//! - **`Config`**: Configuration file is missing, malformed, or violates a
//!   constraint (e.g. a hysteresis threshold pair with `hi < lo`). This is
//!   the only fatal condition at the pipeline's level; it is rejected at
//!   startup and never surfaced per-frame.

use thiserror::Error;

/// Errors that can occur in SparshaIO
///
/// See module-level documentation for recovery strategies.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Tried to read {requested} bytes but no data left")]
    EndOfData { requested: usize },

    #[error("Tried to read {requested} bytes with only {available} bytes available")]
    InvalidRead { requested: usize, available: usize },

    #[error("Tried to seek to position {index} when {max} is the max")]
    InvalidSeek { index: usize, max: usize },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
