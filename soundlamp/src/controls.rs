//! What the two buttons do.
//!
//! - both together: toggle audio mode (three dark green blinks)
//! - mode, short: next effect
//! - mode, long: toggle auto cycling (one blue blink on, two red blinks off)
//! - brightness, short: step brightness up, wrapping to the lowest level
//! - brightness, long: back to the start brightness
//!
//! Any change to a persisted value marks the settings outdated; the store is
//! only written once they have been stable for the configured hold-off, which
//! coalesces a burst of button presses into one write.

use embassy_time::{Duration, Instant};
use embedded_hal::digital::InputPin;
use smart_leds::colors;

use crate::button::{ButtonId, ButtonPanel, ButtonPhase};
use crate::feedback::Blink;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlConfig {
    /// Number of effects available with audio enabled.
    pub effects_audio: u8,
    /// Number of effects available with audio disabled.
    pub effects_no_audio: u8,
    pub start_brightness: u8,
    /// Output brightness at full `current_brightness`.
    pub max_brightness: u8,
    pub brightness_step: u8,
    /// How long settings must stay unchanged before they are saved.
    pub save_holdoff: Duration,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            effects_audio: 4,
            effects_no_audio: 8,
            start_brightness: 102,
            max_brightness: 128,
            brightness_step: 51,
            save_holdoff: Duration::from_secs(3),
        }
    }
}

/// The persisted part of the control state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub effect: u8,
    pub brightness: u8,
    pub audio_enabled: bool,
    pub auto_cycle: bool,
}

pub struct Controls {
    config: ControlConfig,
    effect: u8,
    num_effects: u8,
    audio_enabled: bool,
    auto_cycle: bool,
    brightness: u8,
    effect_init: bool,
    cycle_start: Instant,
    outdated_since: Option<Instant>,
}

impl Controls {
    /// Fresh state: audio on, first effect, start brightness.
    pub fn new(config: ControlConfig) -> Self {
        let settings = Settings {
            effect: 0,
            brightness: config.start_brightness,
            audio_enabled: true,
            auto_cycle: false,
        };
        Self::with_settings(config, settings)
    }

    /// Resume from saved settings. An effect index out of range for the
    /// restored mode falls back to the first effect.
    pub fn with_settings(config: ControlConfig, settings: Settings) -> Self {
        let num_effects = if settings.audio_enabled {
            config.effects_audio
        } else {
            config.effects_no_audio
        };
        let effect = if settings.effect < num_effects {
            settings.effect
        } else {
            0
        };

        Self {
            config,
            effect,
            num_effects,
            audio_enabled: settings.audio_enabled,
            auto_cycle: settings.auto_cycle,
            brightness: settings.brightness,
            effect_init: false,
            cycle_start: Instant::MIN,
            outdated_since: None,
        }
    }

    /// Consume this tick's button events. Returns the confirmation to show,
    /// if any.
    pub fn poll<P: InputPin>(&mut self, panel: &mut ButtonPanel<P>, now: Instant) -> Option<Blink> {
        if panel.take_combo() {
            self.toggle_audio();
            return Some(Blink {
                color: colors::DARK_GREEN,
                times: 3,
            });
        }

        let mut blink = None;

        match panel.status(ButtonId::Mode) {
            ButtonPhase::Released => {
                self.cycle_start = now;
                self.next_effect();
                self.mark_outdated(now);
            }
            ButtonPhase::LongPress => {
                self.auto_cycle = !self.auto_cycle;
                info!("auto cycle: {}", self.auto_cycle);
                blink = Some(if self.auto_cycle {
                    Blink {
                        color: colors::BLUE,
                        times: 1,
                    }
                } else {
                    Blink {
                        color: colors::RED,
                        times: 2,
                    }
                });
                self.mark_outdated(now);
            }
            _ => {}
        }

        match panel.status(ButtonId::Brightness) {
            ButtonPhase::Released => {
                self.brightness = self.brightness.wrapping_add(self.config.brightness_step);
                debug!("brightness: {}", self.brightness);
                self.mark_outdated(now);
            }
            ButtonPhase::LongPress => {
                self.brightness = self.config.start_brightness;
                debug!("brightness reset: {}", self.brightness);
                self.mark_outdated(now);
            }
            _ => {}
        }

        blink
    }

    fn toggle_audio(&mut self) {
        self.audio_enabled = !self.audio_enabled;
        self.num_effects = if self.audio_enabled {
            self.config.effects_audio
        } else {
            self.config.effects_no_audio
        };
        self.effect = 0;
        self.effect_init = true;
        info!(
            "audio: {}, {} effects",
            self.audio_enabled, self.num_effects
        );
    }

    fn next_effect(&mut self) {
        self.effect += 1;
        if self.effect >= self.num_effects {
            self.effect = 0;
        }
        self.effect_init = true;
        debug!("effect: {}", self.effect);
    }

    fn mark_outdated(&mut self, now: Instant) {
        self.outdated_since = Some(now);
    }

    pub fn current_effect(&self) -> u8 {
        self.effect
    }

    pub fn num_effects(&self) -> u8 {
        self.num_effects
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    pub fn auto_cycle(&self) -> bool {
        self.auto_cycle
    }

    /// Brightness setting, `0..=255`.
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Brightness to hand to the LED driver: the setting scaled into
    /// `0..=max_brightness`.
    pub fn output_brightness(&self) -> u8 {
        scale8(self.brightness, self.config.max_brightness)
    }

    /// When the effect was last changed by hand.
    pub fn cycle_start(&self) -> Instant {
        self.cycle_start
    }

    /// True once after the effect changed, so the renderer can reset it.
    pub fn take_effect_init(&mut self) -> bool {
        core::mem::take(&mut self.effect_init)
    }

    pub fn settings(&self) -> Settings {
        Settings {
            effect: self.effect,
            brightness: self.brightness,
            audio_enabled: self.audio_enabled,
            auto_cycle: self.auto_cycle,
        }
    }

    /// Settings changed and have been stable for the hold-off.
    pub fn settings_due(&self, now: Instant) -> bool {
        self.outdated_since
            .is_some_and(|since| now.saturating_duration_since(since) > self.config.save_holdoff)
    }

    pub fn mark_saved(&mut self) {
        self.outdated_since = None;
    }
}

/// `value * scale / 256`, with 255 mapping to `scale`.
fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * (scale as u16 + 1)) >> 8) as u8
}
