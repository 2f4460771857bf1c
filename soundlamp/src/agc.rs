//! Automatic gain control.
//!
//! A slow EMA of the mean corrected band level steers the gain towards the
//! profile's target level. Its time constant is hundreds of cycles, well apart
//! from the visual smoothing in the processor.

use crate::BANDS;
use crate::profile::Profile;

pub struct AgcController {
    smooth: f32,
    target_level: f32,
    gain_min: f32,
    gain_max: f32,
    running_average: f32,
    gain: f32,
}

impl AgcController {
    /// Starts settled: the running average equals the target, so gain is 1.
    pub fn new(profile: &Profile) -> Self {
        let mut agc = Self {
            smooth: profile.agc_smooth,
            target_level: profile.target_level,
            gain_min: profile.gain_min,
            gain_max: profile.gain_max,
            running_average: profile.target_level,
            gain: 1.0,
        };
        agc.gain = agc.gain_for(agc.running_average);
        agc
    }

    /// Feed the corrected, pre-gain band sum of one cycle and get the gain
    /// for the next one.
    pub fn update(&mut self, corrected_sum: u32) -> f32 {
        let level = corrected_sum as f32 / BANDS as f32;
        self.running_average = (1.0 - self.smooth) * self.running_average + self.smooth * level;
        self.gain = self.gain_for(self.running_average);
        self.gain
    }

    fn gain_for(&self, average: f32) -> f32 {
        let gain = self.target_level / average;
        if gain.is_nan() {
            // only reachable with a zero target on a silent input
            return self.gain_min;
        }
        // a silent input drives the average to zero and the ratio to infinity
        gain.clamp(self.gain_min, self.gain_max)
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn running_average(&self) -> f32 {
        self.running_average
    }
}
