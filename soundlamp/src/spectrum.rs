//! # MSGEQ7 spectrum reader
//!
//! The chip multiplexes its seven band envelopes onto a single analog output.
//! A reset pulse selects the first band; every strobe pulse then latches the
//! current band onto the output and advances to the next one.
//!
//! - Strobe and reset are `embedded-hal` output pins
//! - Settle times use an `embedded-hal` [`DelayNs`]
//! - The ADC is anything implementing [`AnalogInput`]
//!
//! A full read blocks for roughly `7 * (settle + post_strobe)` microseconds.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::BANDS;

/// A single-channel ADC that can be sampled on demand.
///
/// Implementations saturate at their hardware limits instead of failing.
pub trait AnalogInput {
    fn read(&mut self) -> u16;
}

impl<T: AnalogInput + ?Sized> AnalogInput for &mut T {
    fn read(&mut self) -> u16 {
        (**self).read()
    }
}

/// Protocol timing of a spectrum read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReaderTiming {
    /// Reset pulse width in µs.
    pub reset_hold_us: u32,
    /// Wait between strobe falling edge and sampling, in µs (25 to 50).
    pub settle_us: u32,
    /// Extra wait after the strobe is released, in µs.
    pub post_strobe_us: u32,
    /// ADC samples averaged per band. Zero behaves like one.
    pub samples: u8,
}

impl Default for ReaderTiming {
    fn default() -> Self {
        Self {
            reset_hold_us: 5,
            settle_us: 50,
            post_strobe_us: 0,
            samples: 1,
        }
    }
}

/// Driver for an MSGEQ7 seven band graphic equalizer chip.
pub struct SpectrumReader<STROBE, RESET, ADC, DELAY> {
    strobe: STROBE,
    reset: RESET,
    adc: ADC,
    delay: DELAY,
    timing: ReaderTiming,
}

impl<STROBE, RESET, ADC, DELAY> SpectrumReader<STROBE, RESET, ADC, DELAY>
where
    STROBE: OutputPin,
    RESET: OutputPin,
    ADC: AnalogInput,
    DELAY: DelayNs,
{
    /// Idle levels are strobe high and reset low.
    pub fn new(
        mut strobe: STROBE,
        mut reset: RESET,
        adc: ADC,
        delay: DELAY,
        timing: ReaderTiming,
    ) -> Self {
        strobe.set_high().ok();
        reset.set_low().ok();
        Self {
            strobe,
            reset,
            adc,
            delay,
            timing,
        }
    }

    pub fn timing(&self) -> ReaderTiming {
        self.timing
    }

    /// Read all seven bands, lowest frequency first.
    pub fn read_bands(&mut self) -> [u16; BANDS] {
        self.reset.set_high().ok();
        self.delay.delay_us(self.timing.reset_hold_us);
        self.reset.set_low().ok();

        let mut raw = [0u16; BANDS];
        for value in raw.iter_mut() {
            self.strobe.set_low().ok();
            self.delay.delay_us(self.timing.settle_us);
            *value = self.sample();
            self.strobe.set_high().ok();
            if self.timing.post_strobe_us > 0 {
                self.delay.delay_us(self.timing.post_strobe_us);
            }
        }

        trace!("raw bands: {}", raw);
        raw
    }

    fn sample(&mut self) -> u16 {
        let count = self.timing.samples.max(1) as u32;
        let sum: u32 = (0..count).map(|_| self.adc.read() as u32).sum();
        (sum / count) as u16
    }
}
