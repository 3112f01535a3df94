//! ESP32 time adapter.
//!
//! Implements [`TimerPort`] — monotonic time plus cooperative delay.
//!
//! - **`target_os = "espidf"`** — `now_ms` wraps `esp_timer_get_time()`
//!   (microsecond-precision monotonic timer); `sleep_ms` goes through
//!   `std::thread::sleep`, which the ESP-IDF std port maps onto a FreeRTOS
//!   task delay, yielding the main task.
//! - **all other targets** — `std::time::Instant` for host-side tests and
//!   simulation.

use crate::app::ports::TimerPort;

/// Time adapter for the ESP32-S3 platform.
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl TimerPort for Esp32TimeAdapter {
    #[cfg(target_os = "espidf")]
    fn now_ms(&self) -> u64 {
        // SAFETY: esp_timer_get_time is a monotonic counter read with no
        // preconditions.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1000
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn sleep_ms(&self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_monotonic() {
        let t = Esp32TimeAdapter::new();
        let a = t.now_ms();
        t.sleep_ms(2);
        let b = t.now_ms();
        assert!(b >= a);
    }
}
