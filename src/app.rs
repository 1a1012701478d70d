//! Pipeline orchestration.
//!
//! Wires the frame decoder to the contact finder and the event sink, and
//! contains per-buffer errors: a buffer that fails to decode is logged and
//! dropped, and the pipeline continues with the next one.

use crate::contacts::{Finder, FinderConfig};
use crate::core::EventSink;
use crate::protocol::{HeatmapSample, Parser, ParserEvents};
use crate::types::{Contact, Heatmap, StylusEvent};

/// The synchronous processing pipeline for one device.
///
/// Drives one raw buffer at a time end-to-end. Stylus samples are forwarded
/// to the sink as they are decoded; heatmaps run through the contact finder
/// first. The heatmap and contact buffers are reused across frames.
pub struct TouchPipeline<S: EventSink> {
    parser: Parser,
    finder: Finder,
    heatmap: Heatmap,
    contacts: Vec<Contact>,
    sink: S,
}

impl<S: EventSink> TouchPipeline<S> {
    pub fn new(config: FinderConfig, sink: S) -> Self {
        Self {
            parser: Parser::new(),
            finder: Finder::new(config),
            heatmap: Heatmap::new(0, 0),
            contacts: Vec::with_capacity(16),
            sink,
        }
    }

    /// Processes one raw device buffer end-to-end.
    pub fn process(&mut self, buffer: &[u8]) {
        let mut events = PipelineEvents {
            finder: &mut self.finder,
            heatmap: &mut self.heatmap,
            contacts: &mut self.contacts,
            sink: &mut self.sink,
        };

        if let Err(e) = self.parser.parse(buffer, &mut events) {
            // A malformed buffer costs one frame of output, nothing more.
            log::debug!("Discarding buffer: {}", e);
        }
    }

    /// Clears all temporal state, e.g. after the device was reset.
    pub fn reset(&mut self) {
        self.finder.reset();
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Borrowed view of the pipeline state for the duration of one decode pass.
struct PipelineEvents<'a, S: EventSink> {
    finder: &'a mut Finder,
    heatmap: &'a mut Heatmap,
    contacts: &'a mut Vec<Contact>,
    sink: &'a mut S,
}

impl<S: EventSink> ParserEvents for PipelineEvents<'_, S> {
    fn on_stylus(&mut self, stylus: &StylusEvent) {
        if let Err(e) = self.sink.emit_stylus(stylus) {
            log::warn!("Failed to emit stylus event: {}", e);
        }
    }

    fn on_heatmap(&mut self, sample: &HeatmapSample<'_>) {
        self.heatmap.load(
            usize::from(sample.width),
            usize::from(sample.height),
            sample.z_min,
            sample.z_max,
            sample.cells,
        );

        self.finder.find(self.heatmap, self.contacts);

        if let Err(e) = self.sink.emit_contacts(self.contacts) {
            log::warn!("Failed to emit contact frame: {}", e);
        }
    }
}
