//! Transport between the host and the GrovePi.
//!
//! The firmware speaks SMBus-style block transfers on register 1: a block
//! write is `[1, payload..]` and a block read writes the register byte and
//! then clocks in [`BLOCK_READ_LEN`] bytes.

use std::fmt::Debug;

use bytes::{Bytes, BytesMut};
use embedded_hal::blocking::i2c::{Read, Write, WriteRead};
use rppal::{
    i2c::I2c,
    system::{DeviceInfo, Model},
};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// SMBus register used for every block transfer.
pub const REGISTER: u8 = 1;

/// Length of an SMBus block read.
pub const BLOCK_READ_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("i2c write to {address:#04x} failed: {detail}")]
    Write { address: u8, detail: String },
    #[error("i2c read from {address:#04x} failed: {detail}")]
    Read { address: u8, detail: String },
}

/// The three primitives the protocol needs. Every call may fail on its own.
pub trait Bus {
    fn write_block(&mut self, address: u8, payload: &[u8]) -> Result<(), BusError>;

    fn read_byte(&mut self, address: u8) -> Result<u8, BusError>;

    fn read_block(&mut self, address: u8) -> Result<Bytes, BusError>;
}

/// [`Bus`] over any blocking `embedded_hal` I2C master.
pub struct I2cBus<I2C> {
    pub i2c: I2C,
}

impl<I2C> I2cBus<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn into_inner(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> Bus for I2cBus<I2C>
where
    I2C: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    E: Debug,
{
    fn write_block(&mut self, address: u8, payload: &[u8]) -> Result<(), BusError> {
        let mut tx_buf = Vec::with_capacity(payload.len() + 1);
        tx_buf.push(REGISTER);
        tx_buf.extend_from_slice(payload);

        trace!("write {tx_buf:02x?} to {address:#04x}");

        self.i2c.write(address, &tx_buf).map_err(|e| BusError::Write {
            address,
            detail: format!("{e:?}"),
        })
    }

    fn read_byte(&mut self, address: u8) -> Result<u8, BusError> {
        let mut buf = [0u8; 1];
        self.i2c.read(address, &mut buf).map_err(|e| BusError::Read {
            address,
            detail: format!("{e:?}"),
        })?;

        trace!("read byte {:#04x} from {address:#04x}", buf[0]);
        Ok(buf[0])
    }

    fn read_block(&mut self, address: u8) -> Result<Bytes, BusError> {
        let mut buf = BytesMut::zeroed(BLOCK_READ_LEN);
        self.i2c
            .write_read(address, &[REGISTER], &mut buf[..])
            .map_err(|e| BusError::Read {
                address,
                detail: format!("{e:?}"),
            })?;

        trace!("read block {:02x?} from {address:#04x}", &buf[..]);
        Ok(buf.freeze())
    }
}

/// Picks the I2C bus the GrovePi header is wired to. Only the first revision
/// of the model B routes it to bus 0.
pub fn default_bus_index() -> u8 {
    match DeviceInfo::new() {
        Ok(info) => match info.model() {
            Model::RaspberryPiBRev1 => 0,
            _ => 1,
        },
        Err(e) => {
            warn!("could not identify board ({e}), assuming i2c bus 1");
            1
        }
    }
}

/// Opens the Linux I2C bus `index`, or the board's default bus when `None`.
pub fn open(index: Option<u8>) -> Result<I2cBus<I2c>, rppal::i2c::Error> {
    let index = index.unwrap_or_else(default_bus_index);
    let i2c = I2c::with_bus(index)?;
    debug!("opened i2c bus {index}");

    Ok(I2cBus::new(i2c))
}
