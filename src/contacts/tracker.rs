//! Temporal association of contacts across frames.
//!
//! Every frame, current contacts are matched against the previous stabilized
//! frame by distance. Matched contacts inherit the previous identity;
//! unmatched contacts are minted a fresh one. Identities that lapse stay
//! reserved for the length of the temporal window before they can be reused,
//! so a briefly lost contact never collides with a new one.

use crate::types::Contact;
use serde::Deserialize;
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrackerConfig {
    /// Maximum distance a contact may move between two frames and still be
    /// considered the same touch. Same units as the contact coordinates.
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
}

fn default_max_distance() -> f32 {
    0.1
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_distance: default_max_distance(),
        }
    }
}

#[derive(Debug)]
pub struct Tracker {
    config: TrackerConfig,

    // Identity sets of the last frames; bounds identity reuse.
    recent: VecDeque<HashSet<usize>>,

    // Scratch: candidate pairs of (distance, contact slot, identity).
    pairs: Vec<(f32, usize, usize)>,
}

impl Tracker {
    /// Creates a tracker whose lapsed identities stay reserved for
    /// `window` frames.
    pub fn new(config: TrackerConfig, window: usize) -> Self {
        let mut recent = VecDeque::with_capacity(window.max(1));
        for _ in 0..window.max(1) {
            recent.push_back(HashSet::new());
        }

        Self {
            config,
            recent,
            pairs: Vec::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Clears all stored identity history.
    pub fn reset(&mut self) {
        for frame in &mut self.recent {
            frame.clear();
        }
    }

    /// Assigns identities to the contacts of the current frame.
    ///
    /// `previous` is the most recent stabilized frame, passed as a read-only
    /// view. Candidate pairs within `max_distance` are matched globally
    /// nearest first; ties break on slot and identity order, keeping the
    /// assignment deterministic for identical input.
    pub fn track(&mut self, contacts: &mut [Contact], previous: &[Contact]) {
        self.pairs.clear();

        for (slot, contact) in contacts.iter().enumerate() {
            for prev in previous {
                let Some(index) = prev.index else {
                    continue;
                };

                let distance = contact.mean.distance(prev.mean);
                if distance <= self.config.max_distance {
                    self.pairs.push((distance, slot, index));
                }
            }
        }

        self.pairs.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(&b.2))
        });

        let mut assigned: HashSet<usize> = HashSet::new();
        let mut matched = vec![false; contacts.len()];

        for &(_, slot, index) in &self.pairs {
            if matched[slot] || assigned.contains(&index) {
                continue;
            }

            contacts[slot].index = Some(index);
            matched[slot] = true;
            assigned.insert(index);
        }

        // Mint fresh identities for everything left unmatched: the lowest
        // non-negative integer not used this frame and not seen within the
        // reuse window.
        for (slot, contact) in contacts.iter_mut().enumerate() {
            if matched[slot] {
                continue;
            }

            let index = self.lowest_free_index(&assigned);
            contact.index = Some(index);
            assigned.insert(index);
        }

        self.recent.pop_front();
        self.recent.push_back(assigned);
    }

    fn lowest_free_index(&self, assigned: &HashSet<usize>) -> usize {
        let mut index = 0;

        loop {
            let reserved = assigned.contains(&index)
                || self.recent.iter().any(|frame| frame.contains(&index));

            if !reserved {
                return index;
            }

            index += 1;
        }
    }
}
