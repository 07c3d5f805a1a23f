//! Monitor configuration, read from `GROVEPI_*` environment variables.

use std::time::Duration;

use thiserror::Error;

use crate::driver::dexter::grovepi::{
    request::{ParseRequestError, Request},
    timing::Timing,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}: {value:?} is not a valid number")]
    InvalidNumber { key: String, value: String },
    #[error("GROVEPI_WATCH: {0}")]
    InvalidWatch(#[from] ParseRequestError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// I2C bus index, detected from the board when unset.
    pub bus: Option<u8>,
    pub poll_interval: Duration,
    pub watch: Vec<Request>,
    pub timing: Timing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus: None,
            poll_interval: Duration::from_millis(1000),
            watch: Vec::new(),
            timing: Timing::default(),
        }
    }
}

fn number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(value) = lookup("GROVEPI_I2C_BUS") {
            config.bus = Some(number("GROVEPI_I2C_BUS", &value)?);
        }

        if let Some(value) = lookup("GROVEPI_POLL_MS") {
            config.poll_interval = Duration::from_millis(number("GROVEPI_POLL_MS", &value)?);
        }

        if let Some(value) = lookup("GROVEPI_WATCH") {
            config.watch = value
                .split(',')
                .filter(|item| !item.trim().is_empty())
                .map(str::parse::<Request>)
                .collect::<Result<Vec<_>, _>>()?;
        }

        let timing = &mut config.timing;
        let delays = [
            ("GROVEPI_DELAY_DIGITAL_READ_MS", &mut timing.digital_read),
            ("GROVEPI_DELAY_ANALOG_READ_MS", &mut timing.analog_read),
            ("GROVEPI_DELAY_ULTRASONIC_MS", &mut timing.ultrasonic),
            ("GROVEPI_DELAY_ACCELEROMETER_MS", &mut timing.accelerometer),
            ("GROVEPI_DELAY_CLOCK_MS", &mut timing.clock),
            ("GROVEPI_DELAY_DHT_MS", &mut timing.dht),
            ("GROVEPI_DELAY_LEDBAR_GET_MS", &mut timing.led_bar_get),
        ];
        for (key, delay) in delays {
            if let Some(value) = lookup(key) {
                *delay = Duration::from_millis(number(key, &value)?);
            }
        }

        Ok(config)
    }
}
