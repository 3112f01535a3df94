//! ISR-debounced unregister button driver.
//!
//! Active-low momentary switch with pull-up.  The GPIO ISR fires on the
//! falling edge and records the raw timestamp into an atomic — nothing
//! else happens in interrupt context.  The `tick()` method (called from
//! the main loop each iteration) runs the debounce window and emits a
//! single [`ButtonEvent::Pressed`] per physical press; the loop maps that
//! to an unregister request.

use core::sync::atomic::{AtomicU32, Ordering};

const DEBOUNCE_MS: u32 = 50;

/// Raw ISR timestamp (milliseconds since boot, truncated to u32).
/// Written by the ISR, read by the main loop.
static BUTTON_ISR_TIMESTAMP: AtomicU32 = AtomicU32::new(0);

/// Events emitted after debouncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Idle,
    Settling { since_ms: u32 },
}

pub struct ButtonDriver {
    gpio: i32,
    state: DebounceState,
    last_isr_ms: u32,
}

impl ButtonDriver {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            state: DebounceState::Idle,
            last_isr_ms: 0,
        }
    }

    /// GPIO pin this button is attached to.
    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// Call from the main loop each iteration with the current monotonic
    /// time.  Returns `Some(Pressed)` once per debounced press.
    pub fn tick(&mut self, now_ms: u32) -> Option<ButtonEvent> {
        let isr_ms = BUTTON_ISR_TIMESTAMP.load(Ordering::Acquire);
        let new_edge = isr_ms != self.last_isr_ms && isr_ms != 0;

        match self.state {
            DebounceState::Idle => {
                if new_edge {
                    self.last_isr_ms = isr_ms;
                    self.state = DebounceState::Settling { since_ms: now_ms };
                }
                None
            }

            DebounceState::Settling { since_ms } => {
                // Re-triggering edges inside the window are contact bounce;
                // swallow them without restarting the window.
                if new_edge {
                    self.last_isr_ms = isr_ms;
                }
                if now_ms.wrapping_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = DebounceState::Idle;
                    return Some(ButtonEvent::Pressed);
                }
                None
            }
        }
    }
}

/// ISR handler — registered on the button GPIO falling edge.
/// Safe to call from interrupt context (lock-free atomic store).
pub fn button_isr_handler(now_ms: u32) {
    BUTTON_ISR_TIMESTAMP.store(now_ms.max(1), Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;

    // The ISR timestamp is a process-wide static; serialize the tests that
    // touch it so the parallel runner cannot interleave them.
    static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn reset_isr() {
        BUTTON_ISR_TIMESTAMP.store(0, Ordering::SeqCst);
    }

    #[test]
    fn no_events_without_press() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset_isr();
        let mut btn = ButtonDriver::new(0);
        assert_eq!(btn.tick(100), None);
        assert_eq!(btn.tick(200), None);
    }

    #[test]
    fn press_emitted_after_debounce_window() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset_isr();
        let mut btn = ButtonDriver::new(0);
        button_isr_handler(1000);
        assert_eq!(btn.tick(1000), None); // settling
        assert_eq!(btn.tick(1030), None); // still inside 50ms
        assert_eq!(btn.tick(1060), Some(ButtonEvent::Pressed));
    }

    #[test]
    fn contact_bounce_yields_single_event() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset_isr();
        let mut btn = ButtonDriver::new(0);
        button_isr_handler(2000);
        btn.tick(2000);
        // Bounce edges during the window.
        button_isr_handler(2010);
        btn.tick(2010);
        button_isr_handler(2020);
        btn.tick(2020);
        assert_eq!(btn.tick(2055), Some(ButtonEvent::Pressed));
        // Quiet afterwards.
        assert_eq!(btn.tick(2100), None);
    }
}
