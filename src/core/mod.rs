//! External seams of the pipeline: where buffers come from and where
//! decoded events go.

mod sink;
mod source;

pub use sink::{EventSink, LogSink, MockSink};
pub use source::{DeviceSource, FileSource, MockSource};
