//! Per-frame contact records.

use super::Vec2;

/// A single touch contact within one frame.
///
/// Identity continuity across frames is carried by the tracker's internal
/// table; the contact itself only stores the assigned `index`, which is
/// absent when the tracker could not associate it with a prior identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    /// A temporally stable index to track the contact over multiple frames.
    pub index: Option<usize>,

    /// The center position of the contact.
    ///
    /// Range: [0, 1] if normalized, [0, <input dimensions>] if not.
    pub mean: Vec2,

    /// The size of the contact (major and minor ellipse axis).
    ///
    /// Range: [0, 1] if normalized, [0, <hypot of input dimensions>] if not.
    pub size: Vec2,

    /// The orientation of the contact.
    ///
    /// Range: [0, 1) if normalized, [0, pi) if not.
    pub orientation: f32,

    /// Whether the stored values are normalized.
    pub normalized: bool,

    /// Whether the surrounding pipeline may treat the coordinates as
    /// trustworthy for this frame.
    pub stable: bool,

    /// Whether the contact passed validation.
    pub valid: bool,
}

impl Contact {
    /// Looks up the contact with the given index in a frame.
    pub fn find_in_frame(index: usize, frame: &[Contact]) -> Option<&Contact> {
        frame.iter().find(|contact| contact.index == Some(index))
    }

    /// The length of the major ellipse axis.
    pub fn major(&self) -> f32 {
        self.size.max_coeff()
    }

    /// The length of the minor ellipse axis.
    pub fn minor(&self) -> f32 {
        self.size.min_coeff()
    }

    /// Ratio of major to minor axis.
    pub fn aspect(&self) -> f32 {
        self.major() / self.minor()
    }
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            index: None,
            mean: Vec2::zero(),
            size: Vec2::zero(),
            orientation: 0.0,
            normalized: false,
            stable: true,
            valid: true,
        }
    }
}
