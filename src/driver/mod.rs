use std::time::Duration;

pub mod dexter;

/// Blocking delay backed by `std::thread::sleep`.
pub struct ThreadDelay;

impl embedded_hal::blocking::delay::DelayUs<u32> for ThreadDelay {
    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64))
    }
}
