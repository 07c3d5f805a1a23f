//! Driver for the Dexter Industries GrovePi.
//!
//! Every operation writes one 4-byte command block. Reads then wait a fixed
//! settle time, consume the synchronization byte the firmware always sends
//! first, and read the reply block.

use std::{fmt, time::Duration};

use bytes::Bytes;
use embedded_hal::blocking::delay::DelayUs;
use thiserror::Error;
use tracing::{debug, trace, warn};

pub mod bus;
pub mod command;
pub mod decode;
pub mod ledbar;
pub mod request;
pub mod timing;
pub mod worker;

#[cfg(test)]
mod testing;

use bus::{Bus, BusError};
use command::{Command, DhtModule, PinMode};
use decode::{Acceleration, Climate, DecodeError};
use ledbar::LedBar;
use timing::Timing;

/// The GrovePi firmware always answers on this address.
pub const ADDRESS: u8 = 0x04;

/// Where in the write, wait, read sequence a call was when it failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    Sent,
    AwaitingDiscardByte,
    AwaitingBlock,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Sent => "sending command",
            Stage::AwaitingDiscardByte => "reading sync byte",
            Stage::AwaitingBlock => "reading reply",
        };
        f.write_str(s)
    }
}

/// Detailed cause of a failed call. Only logged; callers see [`Unavailable`].
#[derive(Debug, Error)]
pub enum Fault {
    #[error("transport fault while {stage}: {source}")]
    Bus {
        stage: Stage,
        #[source]
        source: BusError,
    },
    #[error("decode fault: {0}")]
    Decode(#[from] DecodeError),
}

impl Fault {
    fn at(stage: Stage) -> impl FnOnce(BusError) -> Fault {
        move |source| Fault::Bus { stage, source }
    }
}

/// The only failure callers get to see. A missing device and a malformed
/// reply look the same; each call can simply be issued again.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("no valid reading available")]
pub struct Unavailable;

fn collapse<T>(command: Command, result: Result<T, Fault>) -> Result<T, Unavailable> {
    result.map_err(|fault| {
        warn!(?command, "{fault}");
        Unavailable
    })
}

pub struct GrovePi<B, D> {
    pub bus: B,
    pub delay: D,
    pub timing: Timing,
}

impl<B, D> GrovePi<B, D>
where
    B: Bus,
    D: DelayUs<u32>,
{
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            bus,
            delay,
            timing: Timing::default(),
        }
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    fn send(&mut self, command: Command, params: &[u32]) -> Result<(), Fault> {
        let block = command::encode(command, params);
        trace!(?command, "sending {block:02x?}");

        self.bus
            .write_block(ADDRESS, &block)
            .map_err(Fault::at(Stage::Sent))
    }

    fn settle(&mut self, wait: Duration) {
        self.delay.delay_us(timing::as_delay_us(wait));
    }

    fn query(&mut self, command: Command, params: &[u32], wait: Duration) -> Result<Bytes, Fault> {
        self.send(command, params)?;
        self.settle(wait);

        let sync = self
            .bus
            .read_byte(ADDRESS)
            .map_err(Fault::at(Stage::AwaitingDiscardByte))?;
        trace!(?command, "discarded sync byte {sync:#04x}");

        self.bus
            .read_block(ADDRESS)
            .map_err(Fault::at(Stage::AwaitingBlock))
    }

    fn write(&mut self, command: Command, params: &[u32]) -> Result<(), Unavailable> {
        let result = self.send(command, params);
        collapse(command, result)
    }

    /// Reads the level (0 or 1) of a digital pin.
    pub fn digital_read(&mut self, pin: u8) -> Result<u8, Unavailable> {
        let command = Command::DigitalRead;
        let wait = self.timing.digital_read;

        // the firmware answers a digital read with the level itself
        let result = self.send(command, &[u32::from(pin)]).and_then(|_| {
            self.settle(wait);
            self.bus
                .read_byte(ADDRESS)
                .map_err(Fault::at(Stage::AwaitingBlock))
        });

        let level = collapse(command, result)?;
        debug!(pin, level, "digital read");
        Ok(level)
    }

    pub fn digital_write(&mut self, pin: u8, value: u8) -> Result<(), Unavailable> {
        self.write(Command::DigitalWrite, &[u32::from(pin), u32::from(value)])
    }

    pub fn pin_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), Unavailable> {
        self.write(Command::PinMode, &[u32::from(pin), mode as u32])
    }

    /// Reads a 10-bit ADC count (0 to 1023) from an analog pin.
    pub fn analog_read(&mut self, pin: u8) -> Result<u16, Unavailable> {
        let command = Command::AnalogRead;
        let wait = self.timing.analog_read;

        let result = self
            .query(command, &[u32::from(pin)], wait)
            .and_then(|reply| decode::word(&reply).map_err(Fault::from));

        let count = collapse(command, result)?;
        debug!(pin, count, "analog read");
        Ok(count)
    }

    /// Sets the PWM duty cycle of a pin. Only the low byte of `value` is sent.
    pub fn analog_write(&mut self, pin: u8, value: u16) -> Result<(), Unavailable> {
        self.write(Command::AnalogWrite, &[u32::from(pin), u32::from(value)])
    }

    /// Temperature (°C) from a Grove thermistor on an analog pin.
    pub fn temperature(&mut self, pin: u8) -> Result<f64, Unavailable> {
        let count = self.analog_read(pin)?;
        let celsius = collapse(
            Command::AnalogRead,
            decode::thermistor(count).map_err(Fault::from),
        )?;

        debug!(pin, celsius, "thermistor temperature");
        Ok(celsius)
    }

    /// Distance in centimeters from a Grove ultrasonic ranger.
    pub fn ultrasonic_read(&mut self, pin: u8) -> Result<u16, Unavailable> {
        let command = Command::UltrasonicRead;
        let wait = self.timing.ultrasonic;

        let result = self
            .query(command, &[u32::from(pin)], wait)
            .and_then(|reply| decode::word(&reply).map_err(Fault::from));

        let distance = collapse(command, result)?;
        debug!(pin, distance, "ultrasonic read");
        Ok(distance)
    }

    pub fn acceleration(&mut self) -> Result<Acceleration, Unavailable> {
        let command = Command::AccelerometerRead;
        let wait = self.timing.accelerometer;

        let result = self
            .query(command, &[], wait)
            .and_then(|reply| decode::acceleration(&reply).map_err(Fault::from));

        let value = collapse(command, result)?;
        debug!(?value, "accelerometer read");
        Ok(value)
    }

    /// Raw bytes from the Grove RTC, status byte removed.
    pub fn clock(&mut self) -> Result<Bytes, Unavailable> {
        let command = Command::ClockRead;
        let wait = self.timing.clock;

        let result = self
            .query(command, &[], wait)
            .and_then(|reply| decode::clock(&reply).map_err(Fault::from));

        collapse(command, result)
    }

    pub fn dht(&mut self, pin: u8, module: DhtModule) -> Result<Climate, Unavailable> {
        let command = Command::DhtRead;
        let wait = self.timing.dht;

        let result = self
            .query(command, &[u32::from(pin), module as u32], wait)
            .and_then(|reply| decode::climate(&reply).map_err(Fault::from));

        let value = collapse(command, result)?;
        debug!(pin, ?module, ?value, "dht read");
        Ok(value)
    }

    /// LED bar whose clock line is on `pin`.
    pub fn led_bar(&mut self, pin: u8) -> LedBar<'_, B, D> {
        LedBar::new(self, pin)
    }
}
