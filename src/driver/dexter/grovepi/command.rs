use num_derive::{FromPrimitive, ToPrimitive};

/// Every command block on the wire is exactly this long.
pub const BLOCK_LEN: usize = 4;

/// Command identifiers understood by the GrovePi firmware.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum Command {
    DigitalRead = 1,
    DigitalWrite = 2,
    AnalogRead = 3,
    AnalogWrite = 4,
    PinMode = 5,
    UltrasonicRead = 7,
    AccelerometerRead = 20,
    ClockRead = 30,
    DhtRead = 40,
    LedBarInit = 50,
    LedBarOrientation = 51,
    LedBarLevel = 52,
    LedBarSetOne = 53,
    LedBarToggleOne = 54,
    LedBarSetAll = 55,
    LedBarGetAll = 56,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum PinMode {
    Input = 0,
    Output = 1,
}

/// Direction in which an LED bar fills up.
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum Orientation {
    RedToGreen = 0,
    GreenToRed = 1,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum DhtModule {
    /// DHT11
    Blue = 0,
    /// DHT22 / AM2302
    White = 1,
}

/// Builds the block `[command, p0, p1, p2]`.
///
/// Only the first three parameters are used and missing ones are sent as
/// zero. Each parameter is truncated to its low byte, so out-of-range values
/// wrap instead of being rejected: the firmware reads fixed-width bytes and
/// never sees anything wider.
pub fn encode(command: Command, params: &[u32]) -> [u8; BLOCK_LEN] {
    let mut block = [0u8; BLOCK_LEN];
    block[0] = command as u8;

    for (slot, param) in block[1..].iter_mut().zip(params) {
        *slot = *param as u8;
    }

    block
}
