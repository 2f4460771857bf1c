//! Turns raw band readings into smoothed levels and decaying peaks.
//!
//! Per band, in this order:
//!
//! 1. subtract the noise floor, clamping at zero
//! 2. apply the per-band correction (integer tenths)
//! 3. add the corrected value to the AGC sum, before any gain
//! 4. apply the current gain
//! 5. smooth with an EMA
//! 6. track the peak
//!
//! The AGC has to see gain independent values, while the smoothed output has
//! to reflect the gain adjusted signal, hence the split at step 3.

use crate::BANDS;
use crate::profile::Profile;

/// Result of one processing cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpectrumFrame {
    pub smoothed: [f32; BANDS],
    pub peak: [f32; BANDS],
    /// Sum of the corrected, pre-gain band values.
    pub corrected_sum: u32,
}

pub struct SpectrumProcessor {
    noise_floor: u16,
    correction: [u8; BANDS],
    smooth: f32,
    peak_decay: f32,
    smoothed: [f32; BANDS],
    peak: [f32; BANDS],
}

impl SpectrumProcessor {
    pub fn new(profile: &Profile) -> Self {
        Self {
            noise_floor: profile.noise_floor,
            correction: profile.correction,
            smooth: profile.spectrum_smooth,
            peak_decay: profile.peak_decay,
            smoothed: [0.0; BANDS],
            peak: [0.0; BANDS],
        }
    }

    /// Noise floor and correction factor for a single band.
    fn correct(&self, band: usize, raw: u16) -> u32 {
        let above_floor = raw.saturating_sub(self.noise_floor) as u32;
        above_floor * self.correction[band] as u32 / 10
    }

    pub fn update(&mut self, raw: &[u16; BANDS], gain: f32) -> SpectrumFrame {
        let mut corrected_sum = 0u32;

        for (band, &sample) in raw.iter().enumerate() {
            let corrected = self.correct(band, sample);
            corrected_sum += corrected;

            // The device stores the gained value back into an integer sample.
            let gained = (corrected as f32 * gain) as u32;

            let smoothed = (1.0 - self.smooth) * self.smoothed[band] + self.smooth * gained as f32;
            self.smoothed[band] = smoothed;

            // Decay first so the fresh level always lands under the peak; a
            // steady input therefore holds the peak at `smoothed`, not
            // `smoothed * (1 - peak_decay)`.
            self.peak[band] = (self.peak[band] * (1.0 - self.peak_decay)).max(smoothed);
        }

        SpectrumFrame {
            smoothed: self.smoothed,
            peak: self.peak,
            corrected_sum,
        }
    }

    pub fn smoothed(&self) -> &[f32; BANDS] {
        &self.smoothed
    }

    pub fn peaks(&self) -> &[f32; BANDS] {
        &self.peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_below_noise_floor_is_zero() {
        let profile = Profile::REV_A;
        let processor = SpectrumProcessor::new(&profile);
        for band in 0..BANDS {
            for raw in 0..=profile.noise_floor {
                assert_eq!(processor.correct(band, raw), 0);
            }
        }
    }

    #[test]
    fn test_silence_stays_flat() {
        let mut processor = SpectrumProcessor::new(&Profile::REV_A);
        for _ in 0..100 {
            let frame = processor.update(&[64; BANDS], 15.0);
            assert_eq!(frame.corrected_sum, 0);
            assert_eq!(frame.smoothed, [0.0; BANDS]);
            assert_eq!(frame.peak, [0.0; BANDS]);
        }
    }

    #[test]
    fn test_correction_uses_integer_tenths() {
        let processor = SpectrumProcessor::new(&Profile::REV_A);
        // (100 - 65) * 9 / 10 = 31.5, truncated
        assert_eq!(processor.correct(0, 100), 31);
        // (100 - 65) * 13 / 10 = 45.5, truncated
        assert_eq!(processor.correct(2, 100), 45);
        assert_eq!(processor.correct(6, 1023), (1023 - 65) * 13 / 10);
    }

    #[test]
    fn test_corrected_sum_ignores_gain() {
        let raw = [500; BANDS];
        let mut low = SpectrumProcessor::new(&Profile::REV_A);
        let mut high = SpectrumProcessor::new(&Profile::REV_A);

        let a = low.update(&raw, 0.1);
        let b = high.update(&raw, 15.0);

        assert_eq!(a.corrected_sum, 3608);
        assert_eq!(a.corrected_sum, b.corrected_sum);
        assert!(b.smoothed[0] > a.smoothed[0]);
    }

    #[test]
    fn test_gain_applied_before_smoothing() {
        let mut processor = SpectrumProcessor::new(&Profile::REV_A);
        let frame = processor.update(&[165; BANDS], 2.0);
        // band 0: (165 - 65) * 9 / 10 = 90, gained to 180, smoothed by 0.08
        assert!((frame.smoothed[0] - 14.4).abs() < 1e-4);
    }

    #[test]
    fn test_converges_monotonically_on_steady_input() {
        let mut processor = SpectrumProcessor::new(&Profile::REV_A);
        let raw = [600; BANDS];
        let target: [f32; BANDS] = core::array::from_fn(|band| processor.correct(band, 600) as f32);

        let mut previous = [0.0f32; BANDS];
        for _ in 0..500 {
            let frame = processor.update(&raw, 1.0);
            for band in 0..BANDS {
                assert!(frame.smoothed[band] >= previous[band] - 1e-3);
                assert!(frame.smoothed[band] <= target[band] + 1e-3);
            }
            previous = frame.smoothed;
        }
        for band in 0..BANDS {
            assert!((previous[band] - target[band]).abs() < 0.01);
        }
    }

    #[test]
    fn test_steady_peak_sits_on_smoothed() {
        let mut processor = SpectrumProcessor::new(&Profile::REV_A);
        let mut frame = processor.update(&[700; BANDS], 1.0);
        for _ in 0..2_000 {
            frame = processor.update(&[700; BANDS], 1.0);
        }
        for band in 0..BANDS {
            assert_eq!(frame.peak[band], frame.smoothed[band]);
        }
    }

    #[test]
    fn test_peak_decays_after_input_stops() {
        let mut processor = SpectrumProcessor::new(&Profile::REV_A);
        for _ in 0..200 {
            processor.update(&[900; BANDS], 1.0);
        }
        let held = processor.peaks()[3];

        let mut last = held;
        for _ in 0..50 {
            let frame = processor.update(&[0; BANDS], 1.0);
            assert!(frame.peak[3] < last);
            assert!(frame.peak[3] >= frame.smoothed[3]);
            last = frame.peak[3];
        }
        assert!(last < held);
    }

    proptest! {
        #[test]
        fn prop_peak_never_below_smoothed(
            frames in proptest::collection::vec((proptest::array::uniform7(0u16..=1023), 0.1f32..=15.0), 1..200)
        ) {
            for profile in [Profile::REV_A, Profile::REV_B] {
                let mut processor = SpectrumProcessor::new(&profile);
                for (raw, gain) in &frames {
                    let frame = processor.update(raw, *gain);
                    for band in 0..BANDS {
                        prop_assert!(frame.peak[band] >= frame.smoothed[band]);
                        prop_assert!(frame.smoothed[band] >= 0.0);
                        prop_assert!(frame.smoothed[band].is_finite());
                    }
                }
            }
        }
    }
}
