//! MSGEQ7 output sampled through a single SAADC channel.

use embassy_nrf::saadc::Saadc;
use soundlamp::AnalogInput;

pub struct SaadcInput<'d> {
    saadc: Saadc<'d, 1>,
}

impl<'d> SaadcInput<'d> {
    /// Expects a calibrated converter.
    pub fn new(saadc: Saadc<'d, 1>) -> Self {
        Self { saadc }
    }
}

impl AnalogInput for SaadcInput<'_> {
    fn read(&mut self) -> u16 {
        let mut buf = [0i16; 1];
        self.saadc.blocking_sample(&mut buf);
        // single ended readings dip slightly below zero near ground
        buf[0].max(0) as u16
    }
}
