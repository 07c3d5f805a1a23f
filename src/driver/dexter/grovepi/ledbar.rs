use std::ops::{Deref, DerefMut};

use embedded_hal::blocking::delay::DelayUs;
use tracing::debug;

use super::{
    bus::Bus,
    collapse,
    command::{Command, Orientation},
    decode, Fault, GrovePi, Unavailable,
};

/// A Grove LED bar on one digital port. `pin` carries the clock line and the
/// firmware takes the data line from the pin next to it.
pub struct LedBar<'a, B, D> {
    grovepi: &'a mut GrovePi<B, D>,
    pin: u8,
}

impl<'a, B, D> Deref for LedBar<'a, B, D> {
    type Target = GrovePi<B, D>;

    fn deref(&self) -> &Self::Target {
        self.grovepi
    }
}

impl<'a, B, D> DerefMut for LedBar<'a, B, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.grovepi
    }
}

impl<'a, B, D> LedBar<'a, B, D>
where
    B: Bus,
    D: DelayUs<u32>,
{
    pub fn new(grovepi: &'a mut GrovePi<B, D>, pin: u8) -> Self {
        Self { grovepi, pin }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn init(&mut self, orientation: Orientation) -> Result<(), Unavailable> {
        let pin = u32::from(self.pin);
        self.grovepi
            .write(Command::LedBarInit, &[pin, orientation as u32])
    }

    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), Unavailable> {
        let pin = u32::from(self.pin);
        self.grovepi
            .write(Command::LedBarOrientation, &[pin, orientation as u32])
    }

    /// Lights the first `level` LEDs, counted from the orientation's start.
    pub fn set_level(&mut self, level: u8) -> Result<(), Unavailable> {
        let pin = u32::from(self.pin);
        self.grovepi
            .write(Command::LedBarLevel, &[pin, u32::from(level)])
    }

    pub fn set_led(&mut self, led: u8, on: bool) -> Result<(), Unavailable> {
        let pin = u32::from(self.pin);
        self.grovepi
            .write(Command::LedBarSetOne, &[pin, u32::from(led), u32::from(on)])
    }

    pub fn toggle_led(&mut self, led: u8) -> Result<(), Unavailable> {
        let pin = u32::from(self.pin);
        self.grovepi
            .write(Command::LedBarToggleOne, &[pin, u32::from(led)])
    }

    /// Sets every LED at once, bit `n` driving LED `n`. The mask goes out low
    /// byte first.
    pub fn set_bits(&mut self, bits: u16) -> Result<(), Unavailable> {
        let pin = u32::from(self.pin);
        let [low, high] = bits.to_le_bytes();
        self.grovepi
            .write(Command::LedBarSetAll, &[pin, u32::from(low), u32::from(high)])
    }

    pub fn bits(&mut self) -> Result<u16, Unavailable> {
        let command = Command::LedBarGetAll;
        let pin = self.pin;
        let wait = self.grovepi.timing.led_bar_get;

        let result = self
            .grovepi
            .query(command, &[u32::from(pin)], wait)
            .and_then(|reply| decode::led_bits(&reply).map_err(Fault::from));

        let bits = collapse(command, result)?;
        debug!(pin, "led bar bits {bits:#06x}");
        Ok(bits)
    }
}
