//! IPTS frame decoder.
//!
//! Walks the four-level record hierarchy of one raw device buffer
//! (data header, payload, payload frames, reports) and dispatches on the
//! type tags. Unknown tags are skipped by their advertised size; only a
//! reader bounds error aborts the buffer, in which case the caller drops
//! the remainder and continues with the next one.

use super::constants::*;
use super::reader::Reader;
use super::records::{
    DataHeader, HeatmapDim, HeatmapTimestamp, PayloadFrame, PayloadHeader, ReportHeader,
    StylusDataV1, StylusDataV2, StylusGroup,
};
use crate::error::Result;
use crate::types::StylusEvent;
use std::f64::consts::FRAC_PI_4;

/// One decoded heatmap, borrowing the raw cells from the device buffer.
#[derive(Debug, Clone, Copy)]
pub struct HeatmapSample<'a> {
    pub width: u8,
    pub height: u8,
    pub z_min: u8,
    pub z_max: u8,
    pub count: u16,
    pub timestamp: u32,
    pub cells: &'a [u8],
}

/// Receiver for the samples produced while decoding a buffer.
///
/// Stylus samples are delivered as they are decoded; the pipeline does not
/// buffer them. Heatmap samples borrow from the device buffer and must be
/// consumed within the callback.
pub trait ParserEvents {
    fn on_stylus(&mut self, stylus: &StylusEvent);
    fn on_heatmap(&mut self, heatmap: &HeatmapSample<'_>);
}

/// Streaming decoder over raw IPTS buffers.
///
/// The heatmap dimensions arrive in a separate report from the heatmap data
/// and apply to every following heatmap, so they are cached across reports
/// and buffers. The same applies to the heatmap timestamp.
#[derive(Debug, Default)]
pub struct Parser {
    dim: Option<HeatmapDim>,
    timestamp: Option<HeatmapTimestamp>,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes one raw device buffer.
    ///
    /// Only `PAYLOAD` buffers are processed; error, vendor, HID and feature
    /// buffers are silently skipped. An `Err` means the buffer was malformed
    /// and its remainder has been discarded.
    pub fn parse(&mut self, data: &[u8], events: &mut dyn ParserEvents) -> Result<()> {
        let mut reader = Reader::new(data);
        let header = DataHeader::parse(&mut reader)?;

        match header.ty {
            DATA_TYPE_PAYLOAD => {
                let mut sub = reader.sub(header.size as usize)?;
                self.parse_payload(&mut sub, events)
            }
            DATA_TYPE_ERROR | DATA_TYPE_VENDOR | DATA_TYPE_HID_REPORT | DATA_TYPE_GET_FEATURES => {
                Ok(())
            }
            other => {
                log::debug!("Skipping buffer with unknown data type 0x{:X}", other);
                Ok(())
            }
        }
    }

    fn parse_payload(&mut self, reader: &mut Reader<'_>, events: &mut dyn ParserEvents) -> Result<()> {
        let payload = PayloadHeader::parse(reader)?;

        for _ in 0..payload.frames {
            let frame = PayloadFrame::parse(reader)?;
            let mut sub = reader.sub(frame.size as usize)?;

            match frame.ty {
                FRAME_TYPE_STYLUS | FRAME_TYPE_HEATMAP => self.parse_reports(&mut sub, events)?,
                other => {
                    // Unknown frame types are skipped, not treated as errors.
                    log::debug!(
                        "Skipping {} byte frame with unknown type 0x{:X}",
                        frame.size,
                        other
                    );
                }
            }
        }

        Ok(())
    }

    fn parse_reports(&mut self, reader: &mut Reader<'_>, events: &mut dyn ParserEvents) -> Result<()> {
        while reader.remaining() >= ReportHeader::SIZE {
            let report = ReportHeader::parse(reader)?;
            let mut sub = reader.sub(report.size as usize)?;

            match report.ty {
                REPORT_TYPE_STYLUS_V1 => self.parse_stylus_v1(&mut sub, events)?,
                REPORT_TYPE_STYLUS_V2 => self.parse_stylus_v2(&mut sub, events)?,
                REPORT_TYPE_HEATMAP_DIM => self.parse_heatmap_dim(&mut sub)?,
                REPORT_TYPE_HEATMAP_TIMESTAMP => {
                    self.timestamp = Some(HeatmapTimestamp::parse(&mut sub)?);
                }
                REPORT_TYPE_HEATMAP => self.parse_heatmap_data(&mut sub, events)?,
                other => {
                    log::debug!(
                        "Skipping {} byte report with unknown type 0x{:X}",
                        report.size,
                        other
                    );
                }
            }
        }

        Ok(())
    }

    fn parse_heatmap_dim(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        let mut dim = HeatmapDim::parse(reader)?;

        // On newer devices z_max may be 0, use a sane value instead.
        if dim.z_max == 0 {
            dim.z_max = 255;
        }

        self.dim = Some(dim);
        Ok(())
    }

    fn parse_heatmap_data(
        &mut self,
        reader: &mut Reader<'_>,
        events: &mut dyn ParserEvents,
    ) -> Result<()> {
        let Some(dim) = self.dim else {
            // Heatmap data without preceding dimensions cannot be sized.
            log::debug!("Dropping heatmap report without cached dimensions");
            return Ok(());
        };

        let size = usize::from(dim.width) * usize::from(dim.height);
        let cells = reader.read_slice(size)?;

        let (count, timestamp) = match self.timestamp {
            Some(ts) => (ts.count, ts.timestamp),
            None => (0, 0),
        };

        events.on_heatmap(&HeatmapSample {
            width: dim.width,
            height: dim.height,
            z_min: dim.z_min,
            z_max: dim.z_max,
            count,
            timestamp,
            cells,
        });

        Ok(())
    }

    fn parse_stylus_v2(&self, reader: &mut Reader<'_>, events: &mut dyn ParserEvents) -> Result<()> {
        let group = StylusGroup::parse(reader)?;

        for _ in 0..group.elements {
            let data = StylusDataV2::parse(reader)?;
            events.on_stylus(&decode_stylus_v2(&data));
        }

        Ok(())
    }

    fn parse_stylus_v1(&self, reader: &mut Reader<'_>, events: &mut dyn ParserEvents) -> Result<()> {
        let group = StylusGroup::parse(reader)?;

        for _ in 0..group.elements {
            let data = StylusDataV1::parse(reader)?;

            // v1 pressure uses a quarter of the v2 scale.
            events.on_stylus(&decode_stylus_v2(&StylusDataV2 {
                timestamp: 0,
                mode: u16::from(data.mode),
                x: data.x,
                y: data.y,
                pressure: data.pressure.saturating_mul(4),
                altitude: 0,
                azimuth: 0,
            }));
        }

        Ok(())
    }
}

fn decode_stylus_v2(data: &StylusDataV2) -> StylusEvent {
    let (tilt_x, tilt_y) = tilt(data.altitude, data.azimuth);

    StylusEvent {
        timestamp: data.timestamp,
        x: data.x,
        y: data.y,
        pressure: data.pressure,
        tilt_x,
        tilt_y,
        proximity: data.mode & MODE_BIT_PROXIMITY != 0,
        contact: data.mode & MODE_BIT_CONTACT != 0,
        button: data.mode & MODE_BIT_BUTTON != 0,
        rubber: data.mode & MODE_BIT_RUBBER != 0,
    }
}

/// Converts the spherical altitude/azimuth pair into the tilt axes expected
/// by the event sink. An altitude of zero means no tilt information.
fn tilt(altitude: u16, azimuth: u16) -> (i32, i32) {
    if altitude == 0 {
        return (0, 0);
    }

    let alt = f64::from(altitude);
    let azm = f64::from(azimuth);

    let atan_x = alt.cos().atan2(alt.sin() * azm.cos());
    let atan_y = alt.cos().atan2(alt.sin() * azm.sin());

    let tx = 9000.0 - atan_x * 4500.0 / FRAC_PI_4;
    let ty = atan_y * 4500.0 / FRAC_PI_4 - 9000.0;

    (tx as i32, ty as i32)
}
