//! Event sink seam.
//!
//! The pipeline emits decoded stylus samples and stabilized contact frames
//! through this trait; the synthetic input device behind it (uinput or
//! otherwise) lives outside the core.

use crate::error::Result;
use crate::types::{Contact, StylusEvent};

/// Consumer of the events produced by the pipeline.
pub trait EventSink {
    /// Emits one decoded stylus sample, in absolute device units.
    fn emit_stylus(&mut self, stylus: &StylusEvent) -> Result<()>;

    /// Emits one complete stabilized contact frame.
    fn emit_contacts(&mut self, frame: &[Contact]) -> Result<()>;
}

/// Sink that logs every event, used when running without an output device.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit_stylus(&mut self, stylus: &StylusEvent) -> Result<()> {
        log::debug!(
            "stylus: x={} y={} pressure={} tilt=({}, {}) prox={} contact={} button={} rubber={}",
            stylus.x,
            stylus.y,
            stylus.pressure,
            stylus.tilt_x,
            stylus.tilt_y,
            stylus.proximity,
            stylus.contact,
            stylus.button,
            stylus.rubber,
        );
        Ok(())
    }

    fn emit_contacts(&mut self, frame: &[Contact]) -> Result<()> {
        log::debug!("contacts: {} active", frame.len());

        for contact in frame {
            log::trace!(
                "contact {:?}: mean=({:.3}, {:.3}) size=({:.3}, {:.3}) stable={} valid={}",
                contact.index,
                contact.mean.x,
                contact.mean.y,
                contact.size.x,
                contact.size.y,
                contact.stable,
                contact.valid,
            );
        }

        Ok(())
    }
}

/// Sink that records every event, for unit and integration testing.
#[derive(Debug, Default)]
pub struct MockSink {
    pub stylus: Vec<StylusEvent>,
    pub frames: Vec<Vec<Contact>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for MockSink {
    fn emit_stylus(&mut self, stylus: &StylusEvent) -> Result<()> {
        self.stylus.push(*stylus);
        Ok(())
    }

    fn emit_contacts(&mut self, frame: &[Contact]) -> Result<()> {
        self.frames.push(frame.to_vec());
        Ok(())
    }
}
