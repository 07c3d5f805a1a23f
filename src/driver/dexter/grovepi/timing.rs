use std::time::Duration;

/// How long to wait between writing a command and reading its reply.
///
/// The firmware does blocking work (ADC sampling, sensor polling) before it
/// can answer and has no ready signal, so a read that comes too early gets a
/// stale or garbage reply. Writes are not followed by a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub digital_read: Duration,
    pub analog_read: Duration,
    pub ultrasonic: Duration,
    pub accelerometer: Duration,
    pub clock: Duration,
    /// The DHT sensor itself needs several hundred milliseconds per conversion.
    pub dht: Duration,
    pub led_bar_get: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            digital_read: Duration::from_millis(100),
            analog_read: Duration::ZERO,
            ultrasonic: Duration::from_millis(200),
            accelerometer: Duration::from_millis(100),
            clock: Duration::from_millis(100),
            dht: Duration::from_millis(600),
            led_bar_get: Duration::from_millis(200),
        }
    }
}

/// Converts a settle time to whole microseconds for `DelayUs<u32>`,
/// saturating at `u32::MAX` (a little over an hour).
pub fn as_delay_us(duration: Duration) -> u32 {
    u32::try_from(duration.as_micros()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{as_delay_us, Timing};

    #[test]
    fn defaults() {
        let timing = Timing::default();
        assert_eq!(timing.digital_read, Duration::from_millis(100));
        assert_eq!(timing.analog_read, Duration::ZERO);
        assert_eq!(timing.dht, Duration::from_millis(600));
    }

    #[test]
    fn delay_conversion_saturates() {
        assert_eq!(as_delay_us(Duration::from_millis(600)), 600_000);
        assert_eq!(as_delay_us(Duration::from_secs(1 << 40)), u32::MAX);
    }
}
