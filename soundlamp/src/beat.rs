//! Bass beat detection.
//!
//! The mean of the two lowest smoothed bands is compared against its own slow
//! average. A beat fires on the rising edge and then stays latched until the
//! combo has dropped by the deadzone below the last peak, so a sustained loud
//! passage produces one beat rather than a train of them. A cooldown bounds the
//! beat rate on top of that.

use embassy_time::{Duration, Instant};

use crate::profile::Profile;

pub struct BeatDetector {
    smooth: f32,
    level: f32,
    deadzone: f32,
    delay: Duration,
    average: f32,
    last_peak: f32,
    triggered: bool,
    last_trigger: Option<Instant>,
}

impl BeatDetector {
    pub fn new(profile: &Profile) -> Self {
        Self {
            smooth: profile.agc_smooth,
            level: profile.beat_level,
            deadzone: profile.beat_deadzone,
            delay: profile.beat_delay,
            average: 0.0,
            last_peak: 0.0,
            triggered: false,
            last_trigger: None,
        }
    }

    /// Returns true on the cycle a beat starts.
    pub fn detect(&mut self, band0: f32, band1: f32, now: Instant) -> bool {
        let combo = (band0 + band1) / 2.0;
        self.average = (1.0 - self.smooth) * self.average + self.smooth * combo;

        if self.last_peak < self.average {
            self.last_peak = self.average;
        }

        let cooled_down = self
            .last_trigger
            .is_none_or(|last| now.saturating_duration_since(last) > self.delay);

        if combo - self.average > self.level && !self.triggered && cooled_down {
            self.triggered = true;
            self.last_peak = combo;
            self.last_trigger = Some(now);
            debug!("beat at {} ms, combo {}", now.as_millis(), combo);
            true
        } else {
            if self.last_peak - combo > self.deadzone {
                self.triggered = false;
            }
            false
        }
    }

    /// Whether a beat has fired and not yet been re-armed.
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    pub fn average(&self) -> f32 {
        self.average
    }
}
