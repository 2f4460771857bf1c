//! Audio analysis and button handling for an MSGEQ7-driven LED lamp.
//!
//! The crate is `no_std` and hardware agnostic: the spectrum chip is driven
//! through `embedded-hal` pins and delays plus the [`AnalogInput`] trait, and
//! the buttons are plain `embedded-hal` input pins. Everything is polled from a
//! single loop that samples the clock once per tick and hands the resulting
//! [`Instant`](embassy_time::Instant) to each component.
//!
//! Enable the `defmt` feature to get log output and `defmt::Format` on the
//! public state types.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod agc;
pub mod analyzer;
pub mod beat;
pub mod button;
pub mod controls;
pub mod feedback;
pub mod processor;
pub mod profile;
pub mod spectrum;

pub use agc::AgcController;
pub use analyzer::{AudioAnalyzer, AudioFrame};
pub use beat::BeatDetector;
pub use button::{ButtonId, ButtonPanel, ButtonPhase, ButtonTiming};
pub use controls::{ControlConfig, Controls, Settings};
pub use feedback::{Blink, BlinkTiming, ConfirmBlink};
pub use processor::{SpectrumFrame, SpectrumProcessor};
pub use profile::Profile;
pub use spectrum::{AnalogInput, ReaderTiming, SpectrumReader};

/// Number of frequency bands reported by the MSGEQ7.
pub const BANDS: usize = 7;
