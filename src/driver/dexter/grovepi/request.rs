use std::{fmt, str::FromStr};

use bytes::Bytes;
use embedded_hal::blocking::delay::DelayUs;
use num_traits::FromPrimitive;
use thiserror::Error;

use super::{
    bus::Bus,
    command::{DhtModule, Orientation, PinMode},
    decode::{Acceleration, Climate},
    GrovePi, Unavailable,
};

/// One GrovePi operation as a value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Request {
    DigitalRead { pin: u8 },
    DigitalWrite { pin: u8, value: u8 },
    PinMode { pin: u8, mode: PinMode },
    AnalogRead { pin: u8 },
    AnalogWrite { pin: u8, value: u16 },
    Temperature { pin: u8 },
    Ultrasonic { pin: u8 },
    Acceleration,
    Clock,
    Dht { pin: u8, module: DhtModule },
    LedBarInit { pin: u8, orientation: Orientation },
    LedBarOrientation { pin: u8, orientation: Orientation },
    LedBarLevel { pin: u8, level: u8 },
    LedBarSetLed { pin: u8, led: u8, on: bool },
    LedBarToggleLed { pin: u8, led: u8 },
    LedBarSetBits { pin: u8, bits: u16 },
    LedBarBits { pin: u8 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// A write went through.
    Done,
    Level(u8),
    AnalogCount(u16),
    /// °C
    Temperature(f64),
    Climate(Climate),
    Acceleration(Acceleration),
    /// cm
    Distance(u16),
    Clock(Bytes),
    LedBits(u16),
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Done => write!(f, "ok"),
            Reading::Level(level) => write!(f, "level {level}"),
            Reading::AnalogCount(count) => write!(f, "count {count}"),
            Reading::Temperature(t) => write!(f, "{t:.2} °C"),
            Reading::Climate(c) => write!(f, "{:.2} °C, {:.2} %", c.temperature, c.humidity),
            Reading::Acceleration(a) => write!(f, "x {} y {} z {}", a.x, a.y, a.z),
            Reading::Distance(cm) => write!(f, "{cm} cm"),
            Reading::Clock(bytes) => write!(f, "{:02x?}", &bytes[..]),
            Reading::LedBits(bits) => write!(f, "{bits:#018b}"),
        }
    }
}

impl<B, D> GrovePi<B, D>
where
    B: Bus,
    D: DelayUs<u32>,
{
    pub fn execute(&mut self, request: Request) -> Result<Reading, Unavailable> {
        let reading = match request {
            Request::DigitalRead { pin } => Reading::Level(self.digital_read(pin)?),
            Request::DigitalWrite { pin, value } => {
                self.digital_write(pin, value)?;
                Reading::Done
            }
            Request::PinMode { pin, mode } => {
                self.pin_mode(pin, mode)?;
                Reading::Done
            }
            Request::AnalogRead { pin } => Reading::AnalogCount(self.analog_read(pin)?),
            Request::AnalogWrite { pin, value } => {
                self.analog_write(pin, value)?;
                Reading::Done
            }
            Request::Temperature { pin } => Reading::Temperature(self.temperature(pin)?),
            Request::Ultrasonic { pin } => Reading::Distance(self.ultrasonic_read(pin)?),
            Request::Acceleration => Reading::Acceleration(self.acceleration()?),
            Request::Clock => Reading::Clock(self.clock()?),
            Request::Dht { pin, module } => Reading::Climate(self.dht(pin, module)?),
            Request::LedBarInit { pin, orientation } => {
                self.led_bar(pin).init(orientation)?;
                Reading::Done
            }
            Request::LedBarOrientation { pin, orientation } => {
                self.led_bar(pin).set_orientation(orientation)?;
                Reading::Done
            }
            Request::LedBarLevel { pin, level } => {
                self.led_bar(pin).set_level(level)?;
                Reading::Done
            }
            Request::LedBarSetLed { pin, led, on } => {
                self.led_bar(pin).set_led(led, on)?;
                Reading::Done
            }
            Request::LedBarToggleLed { pin, led } => {
                self.led_bar(pin).toggle_led(led)?;
                Reading::Done
            }
            Request::LedBarSetBits { pin, bits } => {
                self.led_bar(pin).set_bits(bits)?;
                Reading::Done
            }
            Request::LedBarBits { pin } => Reading::LedBits(self.led_bar(pin).bits()?),
        };

        Ok(reading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseRequestError {
    #[error("unknown sensor {0:?}")]
    UnknownSensor(String),
    #[error("{0:?} needs a pin")]
    MissingPin(String),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("unknown dht module {0}")]
    UnknownModule(u8),
    #[error("too many arguments in {0:?}")]
    TooManyArguments(String),
}

/// Parses the read requests used by the monitor: `digital:<pin>`,
/// `analog:<pin>`, `temp:<pin>`, `ultrasonic:<pin>`, `acc`, `rtc`,
/// `dht:<pin>[:<module>]` and `ledbar:<pin>`.
impl FromStr for Request {
    type Err = ParseRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let name = parts.next().unwrap_or_default();

        let number = |part: &str| {
            part.trim()
                .parse::<u8>()
                .map_err(|_| ParseRequestError::InvalidNumber(part.to_owned()))
        };
        let mut pin = || match parts.next() {
            Some(part) => number(part),
            None => Err(ParseRequestError::MissingPin(name.to_owned())),
        };

        let request = match name {
            "digital" => Request::DigitalRead { pin: pin()? },
            "analog" => Request::AnalogRead { pin: pin()? },
            "temp" => Request::Temperature { pin: pin()? },
            "ultrasonic" => Request::Ultrasonic { pin: pin()? },
            "acc" => Request::Acceleration,
            "rtc" => Request::Clock,
            "ledbar" => Request::LedBarBits { pin: pin()? },
            "dht" => {
                let pin = pin()?;
                let module = match parts.next() {
                    Some(part) => {
                        let id = number(part)?;
                        DhtModule::from_u8(id).ok_or(ParseRequestError::UnknownModule(id))?
                    }
                    None => DhtModule::Blue,
                };
                Request::Dht { pin, module }
            }
            other => return Err(ParseRequestError::UnknownSensor(other.to_owned())),
        };

        if parts.next().is_some() {
            return Err(ParseRequestError::TooManyArguments(s.to_owned()));
        }

        Ok(request)
    }
}
