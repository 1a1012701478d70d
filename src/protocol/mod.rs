//! IPTS wire protocol: bounded reader, packed records, and the streaming
//! frame decoder.
//!
//! Buffer layout, top to bottom:
//!
//! ```text
//! data header ─▶ payload ─▶ payload frames ─▶ reports
//! ```
//!
//! Each level carries a type tag and an advertised size; unknown tags at any
//! level are skipped by size so that firmware additions never break decoding.

pub mod constants;
mod parser;
mod reader;
mod records;

pub use parser::{HeatmapSample, Parser, ParserEvents};
pub use reader::Reader;
pub use records::{
    DataHeader, HeatmapDim, HeatmapTimestamp, PayloadFrame, PayloadHeader, ReportHeader,
    StylusDataV1, StylusDataV2, StylusGroup,
};
