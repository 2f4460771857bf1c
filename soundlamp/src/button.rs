//! # Debounced buttons
//!
//! Each button runs a small state machine fed with its (active-low) pin level
//! and the tick timestamp:
//!
//! ```text
//! Idle -> Debouncing -> Pressed -> Released            (short press)
//!                               -> LongPress -> LongPressConsumed -> Idle
//! ```
//!
//! `Released` and `LongPress` are events: they stay put until the consumer
//! reads them through [`ButtonPanel::status`], which clears `Released` back to
//! `Idle` and moves `LongPress` on to `LongPressConsumed`, so one gesture
//! yields exactly one event no matter how long the button is held.
//!
//! Pressing both buttons together is a combo. [`ButtonPanel::take_combo`]
//! parks both buttons in `GuardWait` until both are released, so the release
//! that ends the combo does not also count as a single press.
//!
//! A bounce back to high during the debounce window does not cancel the
//! debounce: the button stays in `Debouncing` and re-samples the pin every tick
//! once the window has elapsed.

use embassy_time::{Duration, Instant};
use embedded_hal::digital::InputPin;

/// Number of buttons on the panel.
pub const BUTTONS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonPhase {
    Idle,
    Debouncing,
    Pressed,
    Released,
    LongPress,
    LongPressConsumed,
    GuardWait,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    /// Cycles effects, long press toggles auto cycling.
    Mode = 0,
    /// Steps brightness, long press resets it.
    Brightness = 1,
}

impl ButtonId {
    pub const ALL: [ButtonId; BUTTONS] = [ButtonId::Mode, ButtonId::Brightness];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonTiming {
    /// A press must still be held after this long to count.
    pub debounce: Duration,
    /// Holding longer than this turns a press into a long press.
    pub long_press: Duration,
}

impl Default for ButtonTiming {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(30),
            long_press: Duration::from_millis(1500),
        }
    }
}

/// Pin levels relevant to one button on one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Levels {
    /// This button's pin reads low.
    pub pressed: bool,
    /// Every pin on the panel reads high.
    pub all_released: bool,
}

impl ButtonPhase {
    /// Transition for one tick. `held` is the time since the button entered
    /// `Debouncing`.
    pub fn next(self, levels: Levels, held: Duration, timing: &ButtonTiming) -> ButtonPhase {
        use ButtonPhase::*;

        match self {
            Idle if levels.pressed => Debouncing,
            Debouncing if held > timing.debounce && levels.pressed => Pressed,
            Pressed if !levels.pressed => Released,
            Pressed if held > timing.long_press => LongPress,
            LongPressConsumed if !levels.pressed => Idle,
            GuardWait if levels.all_released => Idle,
            phase => phase,
        }
    }
}

/// State of a single button.
#[derive(Clone, Copy, Debug)]
pub struct ButtonDebouncer {
    phase: ButtonPhase,
    since: Instant,
}

impl Default for ButtonDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonDebouncer {
    pub const fn new() -> Self {
        Self {
            phase: ButtonPhase::Idle,
            since: Instant::MIN,
        }
    }

    pub fn step(&mut self, levels: Levels, now: Instant, timing: &ButtonTiming) -> ButtonPhase {
        let held = now.saturating_duration_since(self.since);
        let next = self.phase.next(levels, held, timing);
        if self.phase == ButtonPhase::Idle && next == ButtonPhase::Debouncing {
            self.since = now;
        }
        self.phase = next;
        next
    }

    pub fn phase(&self) -> ButtonPhase {
        self.phase
    }

    /// Read-and-clear accessor: consumes `Released` and `LongPress` events.
    pub fn take(&mut self) -> ButtonPhase {
        let phase = self.phase;
        match phase {
            ButtonPhase::Released => self.phase = ButtonPhase::Idle,
            ButtonPhase::LongPress => self.phase = ButtonPhase::LongPressConsumed,
            _ => {}
        }
        phase
    }

    /// Hold the button until every button on the panel is released.
    pub fn guard(&mut self) {
        self.phase = ButtonPhase::GuardWait;
    }
}

/// The two active-low buttons of the lamp.
pub struct ButtonPanel<P> {
    pins: [P; BUTTONS],
    buttons: [ButtonDebouncer; BUTTONS],
    timing: ButtonTiming,
}

impl<P: InputPin> ButtonPanel<P> {
    pub fn new(mode: P, brightness: P, timing: ButtonTiming) -> Self {
        Self {
            pins: [mode, brightness],
            buttons: [ButtonDebouncer::new(); BUTTONS],
            timing,
        }
    }

    /// Sample both pins once and advance both state machines.
    pub fn update(&mut self, now: Instant) {
        // A pin that cannot be read counts as released.
        let pressed: [bool; BUTTONS] =
            core::array::from_fn(|i| self.pins[i].is_low().unwrap_or(false));
        let all_released = pressed.iter().all(|p| !p);

        for (i, button) in self.buttons.iter_mut().enumerate() {
            let before = button.phase();
            let levels = Levels {
                pressed: pressed[i],
                all_released,
            };
            let after = button.step(levels, now, &self.timing);
            if before != after {
                trace!("button {}: {} -> {}", i, before, after);
            }
        }
    }

    /// Current phase without consuming events.
    pub fn phase(&self, id: ButtonId) -> ButtonPhase {
        self.buttons[id.index()].phase()
    }

    /// Current phase, consuming `Released` and `LongPress` events.
    pub fn status(&mut self, id: ButtonId) -> ButtonPhase {
        self.buttons[id.index()].take()
    }

    /// If both buttons are pressed, park both in `GuardWait` and report the
    /// combo.
    pub fn take_combo(&mut self) -> bool {
        let combo = self
            .buttons
            .iter()
            .all(|button| button.phase() == ButtonPhase::Pressed);
        if combo {
            for button in self.buttons.iter_mut() {
                button.guard();
            }
            debug!("button combo");
        }
        combo
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::cell::Cell;
    use std::rc::Rc;

    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};

    /// An active-low button whose level the test controls.
    #[derive(Clone, Default)]
    pub struct FakeButton(Rc<Cell<bool>>);

    impl FakeButton {
        pub fn press(&self) {
            self.0.set(true);
        }

        pub fn release(&self) {
            self.0.set(false);
        }
    }

    impl ErrorType for FakeButton {
        type Error = Infallible;
    }

    impl InputPin for FakeButton {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0.get())
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0.get())
        }
    }

    /// A button whose pin reads can be made to fail.
    #[derive(Clone, Default)]
    pub struct FlakyButton {
        pressed: Rc<Cell<bool>>,
        failing: Rc<Cell<bool>>,
    }

    impl FlakyButton {
        pub fn press(&self) {
            self.pressed.set(true);
        }

        pub fn release(&self) {
            self.pressed.set(false);
        }

        pub fn fail(&self) {
            self.failing.set(true);
        }
    }

    impl ErrorType for FlakyButton {
        type Error = ErrorKind;
    }

    impl InputPin for FlakyButton {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            self.is_low().map(|low| !low)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            if self.failing.get() {
                return Err(ErrorKind::Other);
            }
            Ok(self.pressed.get())
        }
    }
}
