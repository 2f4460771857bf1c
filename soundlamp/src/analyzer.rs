//! One audio cycle: processor, AGC, then beat detection.
//!
//! The processor runs with the gain computed on the previous cycle; the AGC
//! then folds in this cycle's corrected sum, and the beat detector looks at the
//! fresh smoothed bass bands.

use embassy_time::Instant;

use crate::BANDS;
use crate::agc::AgcController;
use crate::beat::BeatDetector;
use crate::processor::SpectrumProcessor;
use crate::profile::Profile;

/// Everything an effect needs from one audio cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioFrame {
    pub smoothed: [f32; BANDS],
    pub peak: [f32; BANDS],
    /// Gain that will be applied on the next cycle.
    pub gain: f32,
    pub beat: bool,
}

pub struct AudioAnalyzer {
    processor: SpectrumProcessor,
    agc: AgcController,
    beat: BeatDetector,
}

impl AudioAnalyzer {
    pub fn new(profile: &Profile) -> Self {
        Self {
            processor: SpectrumProcessor::new(profile),
            agc: AgcController::new(profile),
            beat: BeatDetector::new(profile),
        }
    }

    pub fn process(&mut self, raw: &[u16; BANDS], now: Instant) -> AudioFrame {
        let spectrum = self.processor.update(raw, self.agc.gain());
        let gain = self.agc.update(spectrum.corrected_sum);
        let beat = self
            .beat
            .detect(spectrum.smoothed[0], spectrum.smoothed[1], now);

        AudioFrame {
            smoothed: spectrum.smoothed,
            peak: spectrum.peak,
            gain,
            beat,
        }
    }

    pub fn gain(&self) -> f32 {
        self.agc.gain()
    }
}
