//! Constant registry for the IPTS wire protocol

// Outer data header types
pub const DATA_TYPE_PAYLOAD: u32 = 0x0;
pub const DATA_TYPE_ERROR: u32 = 0x1;
pub const DATA_TYPE_VENDOR: u32 = 0x2;
pub const DATA_TYPE_HID_REPORT: u32 = 0x3;
pub const DATA_TYPE_GET_FEATURES: u32 = 0x4;

// Payload frame types
pub const FRAME_TYPE_STYLUS: u16 = 0x6;
pub const FRAME_TYPE_HEATMAP: u16 = 0x8;

// Report types
pub const REPORT_TYPE_HEATMAP_TIMESTAMP: u16 = 0x400;
pub const REPORT_TYPE_HEATMAP_DIM: u16 = 0x403;
pub const REPORT_TYPE_HEATMAP: u16 = 0x425;
pub const REPORT_TYPE_STYLUS_V1: u16 = 0x410;
pub const REPORT_TYPE_STYLUS_V2: u16 = 0x460;

// Stylus mode bitmask
pub const MODE_BIT_PROXIMITY: u16 = 1 << 0;
pub const MODE_BIT_CONTACT: u16 = 1 << 1;
pub const MODE_BIT_BUTTON: u16 = 1 << 2;
pub const MODE_BIT_RUBBER: u16 = 1 << 3;

// Device coordinate maxima
pub const MAX_X: u16 = 9600;
pub const MAX_Y: u16 = 7200;
pub const DIAGONAL: u16 = 12000;

// Maximum value of the singletouch coordinate range
pub const SINGLETOUCH_MAX: u32 = 1 << 15;

/// Default size of one raw device buffer.
///
/// The kernel driver reports the real value per device; this matches the
/// largest buffer observed across supported generations.
pub const DEFAULT_BUFFER_SIZE: usize = 16384;
