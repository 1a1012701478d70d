//! Packed wire records of the IPTS protocol.
//!
//! Every record is transmitted packed and little-endian. Instead of casting
//! buffer pointers, each record is decoded field-by-field through the
//! [`Reader`], which keeps the decoder portable across host endianness.
//! Reserved bytes are skipped on read.

use super::reader::Reader;
use crate::error::Result;

/// Outer header of one raw device buffer.
///
/// Wire layout: `{ type: u32, size: u32, buffer: u32, reserved[52] }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    pub ty: u32,
    pub size: u32,
    pub buffer: u32,
}

impl DataHeader {
    pub const SIZE: usize = 64;

    pub fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let ty = reader.read_u32()?;
        let size = reader.read_u32()?;
        let buffer = reader.read_u32()?;
        reader.skip(52)?;

        Ok(Self { ty, size, buffer })
    }
}

/// Header of a payload, advertising the number of frames that follow.
///
/// Wire layout: `{ counter: u32, frames: u32, reserved[4] }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadHeader {
    pub counter: u32,
    pub frames: u32,
}

impl PayloadHeader {
    pub const SIZE: usize = 12;

    pub fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let counter = reader.read_u32()?;
        let frames = reader.read_u32()?;
        reader.skip(4)?;

        Ok(Self { counter, frames })
    }
}

/// Header of one payload frame.
///
/// Wire layout: `{ index: u16, type: u16, size: u32, reserved[8] }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadFrame {
    pub index: u16,
    pub ty: u16,
    pub size: u32,
}

impl PayloadFrame {
    pub const SIZE: usize = 16;

    pub fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let index = reader.read_u16()?;
        let ty = reader.read_u16()?;
        let size = reader.read_u32()?;
        reader.skip(8)?;

        Ok(Self { index, ty, size })
    }
}

/// Header of one report inside a payload frame.
///
/// Wire layout: `{ type: u16, size: u16 }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportHeader {
    pub ty: u16,
    pub size: u16,
}

impl ReportHeader {
    pub const SIZE: usize = 4;

    pub fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let ty = reader.read_u16()?;
        let size = reader.read_u16()?;

        Ok(Self { ty, size })
    }
}

/// Group header preceding a run of stylus samples.
///
/// Wire layout: `{ elements: u8, reserved[3], serial: u32 }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylusGroup {
    pub elements: u8,
    pub serial: u32,
}

impl StylusGroup {
    pub const SIZE: usize = 8;

    pub fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let elements = reader.read_u8()?;
        reader.skip(3)?;
        let serial = reader.read_u32()?;

        Ok(Self { elements, serial })
    }
}

/// Stylus sample with tilt support.
///
/// Wire layout: `{ timestamp: u16, mode: u16, x: u16, y: u16, pressure: u16,
/// altitude: u16, azimuth: u16, reserved[2] }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylusDataV2 {
    pub timestamp: u16,
    pub mode: u16,
    pub x: u16,
    pub y: u16,
    pub pressure: u16,
    pub altitude: u16,
    pub azimuth: u16,
}

impl StylusDataV2 {
    pub const SIZE: usize = 16;

    pub fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let timestamp = reader.read_u16()?;
        let mode = reader.read_u16()?;
        let x = reader.read_u16()?;
        let y = reader.read_u16()?;
        let pressure = reader.read_u16()?;
        let altitude = reader.read_u16()?;
        let azimuth = reader.read_u16()?;
        reader.skip(2)?;

        Ok(Self {
            timestamp,
            mode,
            x,
            y,
            pressure,
            altitude,
            azimuth,
        })
    }
}

/// Stylus sample without tilt support, sent by older pens.
///
/// The pressure scale is a quarter of the v2 scale and has to be multiplied
/// by 4 before emission.
///
/// Wire layout: `{ reserved[4], mode: u8, x: u16, y: u16, pressure: u16,
/// reserved2: u8 }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylusDataV1 {
    pub mode: u8,
    pub x: u16,
    pub y: u16,
    pub pressure: u16,
}

impl StylusDataV1 {
    pub const SIZE: usize = 12;

    pub fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        reader.skip(4)?;
        let mode = reader.read_u8()?;
        let x = reader.read_u16()?;
        let y = reader.read_u16()?;
        let pressure = reader.read_u16()?;
        reader.skip(1)?;

        Ok(Self {
            mode,
            x,
            y,
            pressure,
        })
    }
}

/// Dimensions and value range of the heatmaps that follow this report.
///
/// Wire layout: `{ height: u8, width: u8, y_min: u8, y_max: u8, x_min: u8,
/// x_max: u8, z_min: u8, z_max: u8 }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapDim {
    pub height: u8,
    pub width: u8,
    pub y_min: u8,
    pub y_max: u8,
    pub x_min: u8,
    pub x_max: u8,
    pub z_min: u8,
    pub z_max: u8,
}

impl HeatmapDim {
    pub const SIZE: usize = 8;

    pub fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            height: reader.read_u8()?,
            width: reader.read_u8()?,
            y_min: reader.read_u8()?,
            y_max: reader.read_u8()?,
            x_min: reader.read_u8()?,
            x_max: reader.read_u8()?,
            z_min: reader.read_u8()?,
            z_max: reader.read_u8()?,
        })
    }
}

/// Timestamp report accompanying heatmap data.
///
/// Wire layout: `{ reserved[2], count: u16, timestamp: u32 }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapTimestamp {
    pub count: u16,
    pub timestamp: u32,
}

impl HeatmapTimestamp {
    pub const SIZE: usize = 8;

    pub fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        reader.skip(2)?;
        let count = reader.read_u16()?;
        let timestamp = reader.read_u32()?;

        Ok(Self { count, timestamp })
    }
}
