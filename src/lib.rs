//! Host-side driver for the GrovePi board: a microcontroller on I2C address
//! `0x04` that drives Grove sensors and actuators on behalf of a Raspberry Pi.

pub mod config;
pub mod driver;
