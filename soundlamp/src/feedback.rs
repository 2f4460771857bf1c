//! Confirmation blinks shown when a control changes a setting.
//!
//! Works with any `smart-leds` writer; the whole strip flashes the requested
//! color at the current output brightness.

use core::iter::repeat_n;

use embedded_hal::delay::DelayNs;
use smart_leds::{RGB8, SmartLedsWrite, brightness};

/// A blink request: flash `color` `times` times.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blink {
    pub color: RGB8,
    pub times: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlinkTiming {
    pub on_ms: u32,
    pub off_ms: u32,
}

impl Default for BlinkTiming {
    fn default() -> Self {
        Self {
            on_ms: 200,
            off_ms: 200,
        }
    }
}

pub struct ConfirmBlink {
    pixels: usize,
    timing: BlinkTiming,
}

impl ConfirmBlink {
    pub fn new(pixels: usize, timing: BlinkTiming) -> Self {
        Self { pixels, timing }
    }

    /// Blocks for `times * (on + off)`.
    pub fn show<W, D>(&self, writer: &mut W, delay: &mut D, blink: Blink, level: u8)
    where
        W: SmartLedsWrite<Color = RGB8>,
        D: DelayNs,
    {
        for _ in 0..blink.times {
            if writer
                .write(brightness(repeat_n(blink.color, self.pixels), level))
                .is_err()
            {
                warn!("blink: write failed");
            }
            delay.delay_ms(self.timing.on_ms);
            if writer
                .write(repeat_n(RGB8::default(), self.pixels))
                .is_err()
            {
                warn!("blink: write failed");
            }
            delay.delay_ms(self.timing.off_ms);
        }
    }
}
