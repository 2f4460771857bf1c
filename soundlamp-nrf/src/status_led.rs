//! # Use the board's status LED as a one pixel strip
//!
//! - For usage with `smart-leds`
//! - Implements the `SmartLedsWrite` trait
//!
//! Any pixel that is not black turns the LED on. Only the first pixel of a
//! frame is looked at.

use embedded_hal::digital::OutputPin;
use smart_leds::{RGB8, SmartLedsWrite};

pub struct StatusLed<PIN> {
    pin: PIN,
    active_low: bool,
}

impl<PIN> StatusLed<PIN>
where
    PIN: OutputPin,
{
    pub fn new(mut pin: PIN, active_low: bool) -> StatusLed<PIN> {
        if active_low {
            pin.set_high().ok();
        } else {
            pin.set_low().ok();
        }
        Self { pin, active_low }
    }

    fn set(&mut self, lit: bool) {
        if lit != self.active_low {
            self.pin.set_high().ok();
        } else {
            self.pin.set_low().ok();
        }
    }
}

impl<PIN> SmartLedsWrite for StatusLed<PIN>
where
    PIN: OutputPin,
{
    type Error = ();
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let lit = iterator
            .into_iter()
            .next()
            .map(Into::into)
            .is_some_and(|color: RGB8| color != RGB8::default());
        self.set(lit);
        Ok(())
    }
}
