//! SparshaIO - Touch and stylus processing for Intel Precise Touch & Stylus
//!
//! The library turns raw IPTS device buffers into a stream of stabilized,
//! tracked contact events and decoded stylus samples:
//!
//! ```text
//! raw bytes ─▶ [protocol] ─▶ [contacts] ─▶ contact frames
//!                  │
//!                  └──▶ stylus samples
//! ```
//!
//! - [`protocol`]: bounded reader, packed wire records, frame decoder
//! - [`contacts`]: blob detection, tracking, stabilization, validation
//! - [`core`]: the seams to the outside (device source, event sink)
//! - [`app`]: the pipeline that wires it all together

pub mod app;
pub mod config;
pub mod contacts;
pub mod core;
pub mod error;
pub mod protocol;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
