//! Decoders for GrovePi block replies.
//!
//! Byte 0 of every block is a status/echo byte and is never part of a value;
//! each decoder skips it before reading its payload.

use bytes::{Buf, Bytes};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("reply too short: needed {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },
    #[error("reply value out of range")]
    OutOfRange,
}

/// 3-axis reading from the Grove accelerometer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Acceleration {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

fn payload(reply: &Bytes, len: usize) -> Result<Bytes, DecodeError> {
    let needed = len + 1;
    if reply.len() < needed {
        return Err(DecodeError::Truncated {
            needed,
            got: reply.len(),
        });
    }

    let mut buf = reply.clone();
    buf.advance(1);
    Ok(buf)
}

/// Big-endian 16-bit count in bytes 1..=2. Used by analog and ultrasonic reads.
pub fn word(reply: &Bytes) -> Result<u16, DecodeError> {
    Ok(payload(reply, 2)?.get_u16())
}

/// Axis convention of the accelerometer firmware: anything above 32 maps to
/// `-(raw - 224)`. This is not two's complement and must not be replaced by
/// an `i8` cast.
pub const fn axis(raw: u8) -> i16 {
    if raw > 32 {
        -(raw as i16 - 224)
    } else {
        raw as i16
    }
}

pub fn acceleration(reply: &Bytes) -> Result<Acceleration, DecodeError> {
    let mut buf = payload(reply, 3)?;

    Ok(Acceleration {
        x: axis(buf.get_u8()),
        y: axis(buf.get_u8()),
        z: axis(buf.get_u8()),
    })
}

/// Clock bytes are passed through untouched, minus the status byte.
pub fn clock(reply: &Bytes) -> Result<Bytes, DecodeError> {
    payload(reply, 0)
}

/// Reassembles one float sent by the firmware.
///
/// The four bytes of the IEEE-754 value arrive least significant first. Each
/// byte stands for a pair of hex digits of the big-endian representation, so
/// the value is rebuilt by walking the bytes in reverse and appending both
/// nibbles of each one. A byte below `0x10` contributes a leading `0` digit.
fn wire_float(bytes: [u8; 4]) -> f32 {
    let bits = bytes.iter().rev().fold(0u32, |acc, byte| {
        let high = u32::from(byte >> 4);
        let low = u32::from(byte & 0x0f);
        (acc << 8) | (high << 4) | low
    });

    f32::from_bits(bits)
}

/// Output of the DHT temperature and humidity sensors.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Climate {
    /// °C
    pub temperature: f64,
    /// % relative humidity
    pub humidity: f64,
}

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: f32) -> f64 {
    (f64::from(value) * 100.0).round() / 100.0
}

/// Temperature (°C) in bytes 1..=4 and relative humidity (%) in bytes 5..=8.
pub fn climate(reply: &Bytes) -> Result<Climate, DecodeError> {
    let mut buf = payload(reply, 8)?;

    let mut temperature = [0u8; 4];
    buf.copy_to_slice(&mut temperature);
    let mut humidity = [0u8; 4];
    buf.copy_to_slice(&mut humidity);

    Ok(Climate {
        temperature: round2(wire_float(temperature)),
        humidity: round2(wire_float(humidity)),
    })
}

/// LED bar state in bytes 1 (low) and 2 (high).
///
/// The firmware pairs these with XOR where every other 16-bit reply is added
/// up. The two bytes never overlap once shifted, so both give the same value,
/// but the XOR form is kept as the firmware's own definition.
pub fn led_bits(reply: &Bytes) -> Result<u16, DecodeError> {
    let mut buf = payload(reply, 2)?;
    let low = u16::from(buf.get_u8());
    let high = u16::from(buf.get_u8());

    Ok(low ^ (high << 8))
}

/// Grove thermistor temperature (°C) for a 10-bit analog count.
pub fn thermistor(count: u16) -> Result<f64, DecodeError> {
    const B: f64 = 3975.0;

    if count == 0 || count >= 1023 {
        return Err(DecodeError::OutOfRange);
    }

    let count = f64::from(count);
    let resistance = (1023.0 - count) * 10000.0 / count;

    Ok(1.0 / ((resistance / 10000.0).ln() / B + 1.0 / 298.15) - 273.15)
}

#[cfg(test)]
mod test {
    use bytes::Bytes;

    use super::*;

    fn reply(payload: &[u8]) -> Bytes {
        let mut block = vec![0xaa];
        block.extend_from_slice(payload);
        block.resize(32, 0);
        Bytes::from(block)
    }

    /// Wire form of `value`, produced the long way round: big-endian bytes,
    /// each rendered as a zero-padded hex pair, then sent in reverse.
    fn wire_form(value: f32) -> [u8; 4] {
        let hex: String = value
            .to_be_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        assert_eq!(hex.len(), 8);

        let mut bytes = [0u8; 4];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).unwrap();
        }
        bytes.reverse();
        bytes
    }

    #[test]
    fn word_is_big_endian() {
        for hi in 0..=255u8 {
            for lo in 0..=255u8 {
                let expected = u16::from(hi) * 256 + u16::from(lo);
                assert_eq!(word(&reply(&[hi, lo])).unwrap(), expected);
            }
        }
    }

    #[test]
    fn word_ignores_status_byte() {
        let block = Bytes::from_static(&[0xff, 0x03, 0xff]);
        assert_eq!(word(&block).unwrap(), 1023);
    }

    #[test]
    fn axis_boundary() {
        assert_eq!(axis(0), 0);
        assert_eq!(axis(32), 32);
        assert_eq!(axis(33), 191);
        assert_eq!(axis(224), 0);
        assert_eq!(axis(225), -1);
        assert_eq!(axis(255), -31);
    }

    #[test]
    fn axis_is_not_twos_complement() {
        assert_ne!(axis(0xff), i16::from(0xffu8 as i8));
    }

    #[test]
    fn acceleration_axes() {
        let value = acceleration(&reply(&[5, 33, 250])).unwrap();
        assert_eq!(value, Acceleration { x: 5, y: 191, z: -26 });
    }

    #[test]
    fn float_round_trip() {
        let mut payload = wire_form(23.45).to_vec();
        payload.extend_from_slice(&wire_form(61.2));

        let value = climate(&reply(&payload)).unwrap();
        assert_eq!(value.temperature, 23.45);
        assert_eq!(value.humidity, 61.2);
    }

    #[test]
    fn float_with_single_digit_bytes() {
        // 0x04 and 0x00 each need a leading zero digit
        let value = f32::from_bits(0x4104_0004);
        let wire = wire_form(value);
        assert_eq!(wire, [0x04, 0x00, 0x04, 0x41]);

        assert_eq!(wire_float(wire), value);
        assert_eq!(wire_float(wire), f32::from_le_bytes(wire));
    }

    #[test]
    fn negative_and_zero_floats() {
        let mut payload = wire_form(-12.345).to_vec();
        payload.extend_from_slice(&wire_form(0.0));

        let value = climate(&reply(&payload)).unwrap();
        assert_eq!(value.temperature, -12.35);
        assert_eq!(value.humidity, 0.0);
    }

    #[test]
    fn led_bits_round_trip() {
        let mask: u16 = 0xbeef;
        let (low, high) = ((mask & 0xff) as u8, (mask >> 8) as u8);
        assert_eq!((low, high), (0xef, 0xbe));
        assert_eq!(led_bits(&reply(&[low, high])).unwrap(), mask);
    }

    #[test]
    fn led_bits_xor_matches_sum_for_disjoint_bytes() {
        let (low, high) = (0x01u16, 0x01u16);
        let xor = led_bits(&reply(&[0x01, 0x01])).unwrap();
        assert_eq!(xor, 0x0101);
        assert_eq!(xor, low + (high << 8));
    }

    #[test]
    fn truncated_replies() {
        let short = Bytes::from_static(&[0xaa, 0x01]);
        assert_eq!(
            word(&short),
            Err(DecodeError::Truncated { needed: 3, got: 2 })
        );
        assert_eq!(
            led_bits(&short),
            Err(DecodeError::Truncated { needed: 3, got: 2 })
        );
        assert_eq!(
            acceleration(&short),
            Err(DecodeError::Truncated { needed: 4, got: 2 })
        );
        assert_eq!(
            climate(&short),
            Err(DecodeError::Truncated { needed: 9, got: 2 })
        );
        assert_eq!(
            clock(&Bytes::new()),
            Err(DecodeError::Truncated { needed: 1, got: 0 })
        );
    }

    #[test]
    fn clock_drops_status_byte() {
        let block = Bytes::from_static(&[0xaa, 1, 2, 3]);
        assert_eq!(&clock(&block).unwrap()[..], &[1, 2, 3]);
    }

    #[test]
    fn thermistor_curve() {
        let t = thermistor(512).unwrap();
        assert!((t - 25.04).abs() < 0.05, "{t}");
        assert!(thermistor(700).unwrap() > t);

        assert_eq!(thermistor(0), Err(DecodeError::OutOfRange));
        assert_eq!(thermistor(1023), Err(DecodeError::OutOfRange));
    }
}
