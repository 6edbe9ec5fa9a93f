//! Weapon-fired signals for the presentation layer
//!
//! The core does not render. It surfaces a [`WeaponFired`] signal per Fire
//! event and offers [`FiringAnimation`], a frame cursor that reports an
//! absent animation as `None` instead of failing.

use serde::Serialize;

use crate::core::types::{SubjectId, Timestamp};
use crate::simulation::events::SimulationEvent;
use crate::subject::{Subject, Weapon};

/// Minimum seconds between two firing frames
pub const FIRING_FRAME_GAP: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeaponFired {
    pub shooter: SubjectId,
    pub weapon: Weapon,
    pub at: Timestamp,
}

impl WeaponFired {
    pub fn from_event(event: &SimulationEvent, at: Timestamp) -> Option<Self> {
        match event {
            SimulationEvent::Fire {
                shooter,
                weapon: Some(weapon),
                ..
            } => Some(Self {
                shooter: *shooter,
                weapon: *weapon,
                at,
            }),
            _ => None,
        }
    }
}

/// Frame cursor for one firing sequence
#[derive(Debug, Clone)]
pub struct FiringAnimation {
    pub weapon: Weapon,
    next_index: usize,
    last_change: Option<Timestamp>,
}

impl FiringAnimation {
    pub fn new(fired: &WeaponFired) -> Self {
        Self {
            weapon: fired.weapon,
            next_index: 0,
            last_change: None,
        }
    }

    /// Frame to display now, if it changes.
    ///
    /// Returns `None` while the frame gap has not elapsed, and when the
    /// subject has no firing frames for its mode and weapon. Wraps back to
    /// the first frame after the last one.
    pub fn advance(&mut self, subject: &Subject, now: Timestamp) -> Option<&'static str> {
        if let Some(last) = self.last_change {
            if now - last < FIRING_FRAME_GAP {
                return None;
            }
        }

        let frames = match subject.capabilities().firing_frames(subject.mode(), self.weapon) {
            Some(frames) => frames,
            None => {
                tracing::error!(
                    "No firing animation for {:?} {} in mode {} with weapon {}",
                    subject.kind,
                    subject.id,
                    subject.mode(),
                    self.weapon.token()
                );
                return None;
            }
        };

        self.last_change = Some(now);
        if self.next_index >= frames.len() {
            self.next_index = 0;
        }
        let frame = frames[self.next_index];
        self.next_index += 1;
        Some(frame)
    }
}
