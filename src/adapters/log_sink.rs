//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A telemetry uplink adapter would implement the same trait.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Registered { endpoint } => {
                info!("REG   | registered as '{}'", endpoint);
            }
            AppEvent::RegistrationUpdated => {
                info!("REG   | keep-alive update sent");
            }
            AppEvent::Unregistered => {
                info!("REG   | unregistered");
            }
            AppEvent::DecodeForwarded { len } => {
                info!("SCAN  | decode forwarded ({} bytes)", len);
            }
            AppEvent::ValueWritten { path, len } => {
                info!("VALUE | {} <- {} bytes", path, len);
            }
            AppEvent::BlinkRun { color, steps } => {
                info!("BLINK | color={:?} steps={}", color, steps);
            }
            AppEvent::TransferComplete { path, len } => {
                info!("XFER  | {} complete ({} bytes)", path, len);
            }
            AppEvent::TransferFailed { path, reason } => {
                info!("XFER  | {} discarded: {}", path, reason);
            }
            AppEvent::NotifySent { path } => {
                info!("NOTIF | {} changed", path);
            }
        }
    }
}
