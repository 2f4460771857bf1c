#![no_std]
#![no_main]

mod saadc_input;
mod status_led;

use embassy_executor::Spawner;
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::saadc::{self, ChannelConfig, Saadc};
use embassy_nrf::bind_interrupts;
use embassy_time::{Delay, Duration, Instant, Timer};
use soundlamp::{
    AudioAnalyzer, BlinkTiming, ButtonPanel, ButtonTiming, ConfirmBlink, ControlConfig, Controls,
    Profile, ReaderTiming, SpectrumReader,
};
use {defmt_rtt as _, panic_probe as _};

use crate::saadc_input::SaadcInput;
use crate::status_led::StatusLed;

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
});

/// Time between two spectrum reads.
const AUDIO_PERIOD: Duration = Duration::from_millis(10);
/// Button polling period.
const TICK: Duration = Duration::from_millis(1);

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());

    let mut config = saadc::Config::default();
    config.resolution = saadc::Resolution::_10BIT;
    let channel = ChannelConfig::single_ended(p.P0_03);
    let mut saadc = Saadc::new(p.SAADC, Irqs, config, [channel]);
    saadc.calibrate().await;

    let strobe = Output::new(p.P1_08, Level::High, OutputDrive::Standard);
    let reset = Output::new(p.P1_07, Level::Low, OutputDrive::Standard);
    let mut reader = SpectrumReader::new(
        strobe,
        reset,
        SaadcInput::new(saadc),
        Delay,
        ReaderTiming::default(),
    );

    // buttons pull to ground when pressed
    let mode = Input::new(p.P0_11, Pull::Up);
    let brightness = Input::new(p.P0_12, Pull::Up);
    let mut panel = ButtonPanel::new(mode, brightness, ButtonTiming::default());

    // green LED, active low
    let mut led = StatusLed::new(
        Output::new(p.P1_11, Level::High, OutputDrive::Standard),
        true,
    );
    let blinker = ConfirmBlink::new(1, BlinkTiming::default());

    let profile = Profile::DEFAULT;
    let mut analyzer = AudioAnalyzer::new(&profile);
    let mut controls = Controls::new(ControlConfig::default());

    defmt::info!("Running with noise floor {}", profile.noise_floor);

    let mut last_audio = Instant::MIN;
    loop {
        let now = Instant::now();

        panel.update(now);
        if let Some(blink) = controls.poll(&mut panel, now) {
            blinker.show(&mut led, &mut Delay, blink, controls.output_brightness());
        }

        if controls.take_effect_init() {
            defmt::info!(
                "effect {}/{} brightness {}",
                controls.current_effect(),
                controls.num_effects(),
                controls.brightness()
            );
        }

        if controls.audio_enabled() && now.saturating_duration_since(last_audio) >= AUDIO_PERIOD {
            last_audio = now;
            let raw = reader.read_bands();
            let frame = analyzer.process(&raw, now);
            if frame.beat {
                defmt::debug!("beat: bass {} gain {}", frame.smoothed[0], frame.gain);
            }
        }

        // settings are not persisted on this board, only reported
        if controls.settings_due(now) {
            defmt::info!("settings: {}", controls.settings());
            controls.mark_saved();
        }

        Timer::after(TICK).await;
    }
}
