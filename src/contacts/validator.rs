//! Validity checking for detected contacts.
//!
//! Flags contacts whose geometry leaves the configured limits. The policy of
//! what to do with an invalid contact (e.g. lifting all inputs) is left to
//! the layers above; this stage only annotates the `valid` flag they act on.

use crate::types::Contact;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ValidatorConfig {
    /// Whether a contact that was invalid in the previous frame stays
    /// invalid, preventing a rejected touch from flickering back in.
    #[serde(default = "default_track_validity")]
    pub track_validity: bool,

    /// Allowed range for the major axis length. Absent disables the check.
    #[serde(default)]
    pub size_limits: Option<(f32, f32)>,

    /// Allowed range for the aspect ratio. Absent disables the check.
    #[serde(default)]
    pub aspect_limits: Option<(f32, f32)>,
}

fn default_track_validity() -> bool {
    true
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            track_validity: default_track_validity(),
            size_limits: None,
            aspect_limits: None,
        }
    }
}

#[derive(Debug)]
pub struct Validator {
    config: ValidatorConfig,

    // The last frame.
    last: Vec<Contact>,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            last: Vec::new(),
        }
    }

    /// Resets the validator by clearing the stored copy of the last frame.
    pub fn reset(&mut self) {
        self.last.clear();
    }

    /// Checks the validity of all contacts of a frame.
    pub fn validate(&mut self, frame: &mut [Contact]) {
        for contact in frame.iter_mut() {
            contact.valid = self.check_contact(contact);
        }

        self.last.clear();
        self.last.extend_from_slice(frame);
    }

    fn check_contact(&self, contact: &Contact) -> bool {
        // Don't invalidate unstable contacts.
        if !contact.stable {
            return true;
        }

        if self.config.track_validity && !self.check_temporal(contact) {
            return false;
        }

        if let Some((min, max)) = self.config.size_limits {
            let major = contact.major();
            if major < min || major > max {
                return false;
            }
        }

        if let Some((min, max)) = self.config.aspect_limits {
            let aspect = contact.aspect();
            if aspect < min || aspect > max {
                return false;
            }
        }

        true
    }

    /// Whether the contact was valid in the last frame.
    fn check_temporal(&self, contact: &Contact) -> bool {
        let Some(index) = contact.index else {
            return true;
        };

        match Contact::find_in_frame(index, &self.last) {
            Some(last) => last.valid,
            None => true,
        }
    }
}
