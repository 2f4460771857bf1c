//! Per-hardware-batch tuning constants.
//!
//! The analysis code is identical across boards; only these numbers change.
//! Firmware picks [`Profile::DEFAULT`], which follows the `profile-rev-b`
//! Cargo feature.

use embassy_time::Duration;

use crate::BANDS;

/// Tuning constants for the audio pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Profile {
    /// Raw readings below this are treated as silence.
    pub noise_floor: u16,
    /// Per-band correction in tenths (`10` leaves a band unchanged).
    pub correction: [u8; BANDS],
    /// Smoothing coefficient of the displayed band levels.
    pub spectrum_smooth: f32,
    /// Fraction of the peak lost every cycle.
    pub peak_decay: f32,
    /// Smoothing coefficient of the AGC running average and the beat average.
    pub agc_smooth: f32,
    /// Average corrected level the AGC steers towards.
    pub target_level: f32,
    pub gain_min: f32,
    pub gain_max: f32,
    /// How far the bass combo must rise above its average to count as a beat.
    pub beat_level: f32,
    /// How far the bass combo must fall below the last peak to re-arm.
    pub beat_deadzone: f32,
    /// Minimum time between two beats.
    pub beat_delay: Duration,
}

impl Profile {
    /// First hardware batch.
    pub const REV_A: Profile = Profile {
        noise_floor: 65,
        correction: [9, 11, 13, 13, 12, 12, 13],
        spectrum_smooth: 0.08,
        peak_decay: 0.01,
        agc_smooth: 0.004,
        target_level: 270.0,
        gain_min: 0.1,
        gain_max: 15.0,
        beat_level: 20.0,
        beat_deadzone: 30.0,
        beat_delay: Duration::from_millis(50),
    };

    /// Second hardware batch: noisier front end, faster visuals.
    pub const REV_B: Profile = Profile {
        noise_floor: 75,
        correction: [9, 11, 13, 13, 12, 12, 13],
        spectrum_smooth: 0.1,
        peak_decay: 0.05,
        agc_smooth: 0.003,
        target_level: 300.0,
        gain_min: 0.1,
        gain_max: 15.0,
        beat_level: 20.0,
        beat_deadzone: 30.0,
        beat_delay: Duration::from_millis(50),
    };

    #[cfg(not(feature = "profile-rev-b"))]
    pub const DEFAULT: Profile = Profile::REV_A;

    #[cfg(feature = "profile-rev-b")]
    pub const DEFAULT: Profile = Profile::REV_B;
}

impl Default for Profile {
    fn default() -> Self {
        Profile::DEFAULT
    }
}
