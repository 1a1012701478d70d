//! Decoded stylus state emitted to the event sink.

/// One decoded stylus sample in absolute device units.
///
/// X and Y span the device coordinate maxima (9600 x 7200), pressure is on
/// the v2 scale (v1 samples are rescaled by the decoder), and the tilt axes
/// are derived from altitude/azimuth in units of hundredths of a degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StylusEvent {
    pub timestamp: u16,
    pub x: u16,
    pub y: u16,
    pub pressure: u16,
    pub tilt_x: i32,
    pub tilt_y: i32,
    pub proximity: bool,
    pub contact: bool,
    pub button: bool,
    pub rubber: bool,
}
