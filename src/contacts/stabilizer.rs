//! Temporal stabilization of tracked contacts.
//!
//! Each tracked contact is checked against a sliding window of previous
//! frames and smoothed with per-axis hysteresis: changes below the dead-band
//! threshold snap back to the previous value, changes above the break-band
//! threshold mark the contact unstable, anything in between passes through.

use crate::types::{Contact, Vec2};
use serde::Deserialize;
use std::collections::VecDeque;
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StabilizerConfig {
    /// Number of recent frames considered for stability checks, including
    /// the frame being stabilized. Below 2 no temporal processing happens.
    #[serde(default = "default_temporal_window")]
    pub temporal_window: usize,

    /// Whether a contact must be present in the whole temporal window to be
    /// reported as stable.
    #[serde(default = "default_check_temporal")]
    pub check_temporal_stability: bool,

    /// Dead-band / break-band pair for width and height changes.
    /// Absent disables size stabilization.
    #[serde(default)]
    pub size_threshold: Option<(f32, f32)>,

    /// Dead-band / break-band pair for the movement distance.
    /// Absent disables position stabilization.
    #[serde(default)]
    pub position_threshold: Option<(f32, f32)>,

    /// Dead-band / break-band pair for orientation changes.
    /// Absent disables orientation stabilization.
    #[serde(default)]
    pub orientation_threshold: Option<(f32, f32)>,
}

fn default_temporal_window() -> usize {
    3
}

fn default_check_temporal() -> bool {
    true
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            temporal_window: default_temporal_window(),
            check_temporal_stability: default_check_temporal(),
            size_threshold: None,
            position_threshold: None,
            orientation_threshold: None,
        }
    }
}

#[derive(Debug)]
pub struct Stabilizer {
    config: StabilizerConfig,

    // The last frames; the deque always holds max(temporal_window, 1)
    // entries, empty-padded at startup.
    frames: VecDeque<Vec<Contact>>,
}

impl Stabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        let len = config.temporal_window.max(1);

        let mut frames = VecDeque::with_capacity(len);
        for _ in 0..len {
            frames.push_back(Vec::new());
        }

        Self { config, frames }
    }

    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    /// Resets the stabilizer by clearing the stored copies of the last
    /// frames. The deque keeps its length.
    pub fn reset(&mut self) {
        for frame in &mut self.frames {
            frame.clear();
        }
    }

    /// The most recent stored frame, as a read-only view.
    pub fn last_frame(&self) -> &[Contact] {
        self.frames.back().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Stabilizes all contacts of a frame, then pushes a copy of the result
    /// onto the history window, dropping the oldest stored frame.
    pub fn stabilize(&mut self, frame: &mut [Contact]) {
        for contact in frame.iter_mut() {
            self.stabilize_contact(contact);
        }

        // Rotate the window, reusing the oldest frame's allocation.
        let mut oldest = self.frames.pop_front().unwrap_or_default();
        oldest.clear();
        oldest.extend_from_slice(frame);
        self.frames.push_back(oldest);
    }

    fn stabilize_contact(&self, contact: &mut Contact) {
        // Contacts that can't be tracked can't be stabilized.
        let Some(index) = contact.index else {
            return;
        };

        if self.config.check_temporal_stability && self.config.temporal_window >= 2 {
            contact.stable = self.check_temporal(index);
        } else {
            contact.stable = true;
        }

        if self.config.temporal_window < 2 {
            return;
        }

        let Some(last) = Contact::find_in_frame(index, self.last_frame()) else {
            return;
        };
        let last = last.clone();

        if let Some(threshold) = self.config.size_threshold {
            stabilize_size(contact, &last, threshold);
        }

        if let Some(threshold) = self.config.position_threshold {
            stabilize_position(contact, &last, threshold);
        }

        if let Some(threshold) = self.config.orientation_threshold {
            stabilize_orientation(contact, &last, threshold);
        }
    }

    /// A contact is temporally stable if it appears in every frame of the
    /// temporal window. The window includes the frame currently being
    /// stabilized, so the check runs over the newest `N - 1` stored frames.
    fn check_temporal(&self, index: usize) -> bool {
        self.frames
            .iter()
            .skip(1)
            .all(|frame| Contact::find_in_frame(index, frame).is_some())
    }
}

/// The hysteresis applied independently to the width and height deltas.
fn stabilize_size(current: &mut Contact, last: &Contact, threshold: (f32, f32)) {
    let (lo, hi) = threshold;
    let delta = Vec2::new(
        (current.size.x - last.size.x).abs(),
        (current.size.y - last.size.y).abs(),
    );

    // If the size is changing too slowly, discard the change.
    // If it is changing too fast, mark the contact unstable instead.

    if delta.x < lo {
        current.size.x = last.size.x;
    } else if delta.x > hi {
        current.stable = false;
    }

    if delta.y < lo {
        current.size.y = last.size.y;
    } else if delta.y > hi {
        current.stable = false;
    }
}

/// The hysteresis applied to the Euclidean movement distance: either the
/// whole mean snaps back or the contact is marked unstable.
fn stabilize_position(current: &mut Contact, last: &Contact, threshold: (f32, f32)) {
    let (lo, hi) = threshold;
    let distance = current.mean.distance(last.mean);

    if distance < lo {
        current.mean = last.mean;
    } else if distance > hi {
        current.stable = false;
    }
}

/// The hysteresis applied to the circular orientation delta.
fn stabilize_orientation(current: &mut Contact, last: &Contact, threshold: (f32, f32)) {
    // Orientation is undefined for near-circular contacts; report it as 0
    // instead of flickering between arbitrary angles.
    let aspect = current.aspect();
    if !(aspect >= 1.1) {
        current.orientation = 0.0;
        return;
    }

    let (lo, hi) = threshold;
    let max = if current.normalized { 1.0 } else { PI };

    // The angle difference in both directions; the smaller one handles
    // going from 0 degrees to 179 degrees.
    let d1 = (current.orientation - last.orientation).abs();
    let d2 = max - d1;
    let delta = d1.min(d2);

    if delta < lo {
        current.orientation = last.orientation;
    } else if delta > hi {
        current.stable = false;
    }
}
