//! Scripted bus and recording delay for driver tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use bytes::Bytes;
use embedded_hal::blocking::delay::DelayUs;

use super::{
    bus::{Bus, BusError, BLOCK_READ_LEN},
    GrovePi, ADDRESS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Write(Vec<u8>),
    Wait(u32),
    ReadByte,
    ReadBlock,
}

/// Successful bus calls and waits, in the order they happened.
#[derive(Debug, Clone, Default)]
pub struct Log(Arc<Mutex<Vec<BusEvent>>>);

impl Log {
    fn push(&self, event: BusEvent) {
        self.0.lock().unwrap().push(event);
    }

    pub fn take(&self) -> Vec<BusEvent> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

/// Answers reads from queues. An empty byte queue yields `0`, an empty block
/// queue yields a read error.
pub struct FakeBus {
    log: Log,
    pub bytes: VecDeque<Result<u8, BusError>>,
    pub blocks: VecDeque<Result<Bytes, BusError>>,
    pub fail_writes: bool,
}

fn read_error() -> BusError {
    BusError::Read {
        address: ADDRESS,
        detail: "scripted".into(),
    }
}

impl FakeBus {
    /// Queues a block reply, padded like a real SMBus block read.
    pub fn push_block(&mut self, block: &[u8]) {
        let mut block = block.to_vec();
        block.resize(BLOCK_READ_LEN, 0);
        self.blocks.push_back(Ok(Bytes::from(block)));
    }

    pub fn fail_next_byte(&mut self) {
        self.bytes.push_back(Err(read_error()));
    }
}

impl Bus for FakeBus {
    fn write_block(&mut self, address: u8, payload: &[u8]) -> Result<(), BusError> {
        assert_eq!(address, ADDRESS);
        if self.fail_writes {
            return Err(BusError::Write {
                address,
                detail: "scripted".into(),
            });
        }

        self.log.push(BusEvent::Write(payload.to_vec()));
        Ok(())
    }

    fn read_byte(&mut self, address: u8) -> Result<u8, BusError> {
        assert_eq!(address, ADDRESS);
        let byte = self.bytes.pop_front().unwrap_or(Ok(0))?;
        self.log.push(BusEvent::ReadByte);
        Ok(byte)
    }

    fn read_block(&mut self, address: u8) -> Result<Bytes, BusError> {
        assert_eq!(address, ADDRESS);
        let block = self.blocks.pop_front().unwrap_or_else(|| Err(read_error()))?;
        self.log.push(BusEvent::ReadBlock);
        Ok(block)
    }
}

pub struct FakeDelay {
    log: Log,
}

impl DelayUs<u32> for FakeDelay {
    fn delay_us(&mut self, us: u32) {
        self.log.push(BusEvent::Wait(us));
    }
}

pub fn rig() -> (GrovePi<FakeBus, FakeDelay>, Log) {
    let log = Log::default();
    let bus = FakeBus {
        log: log.clone(),
        bytes: VecDeque::new(),
        blocks: VecDeque::new(),
        fail_writes: false,
    };
    let delay = FakeDelay { log: log.clone() };

    (GrovePi::new(bus, delay), log)
}
