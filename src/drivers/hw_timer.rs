//! Status ticker using ESP-IDF's esp_timer API.
//!
//! A periodic timer pushes [`Event::StatusTick`] into the lock-free SPSC
//! queue; the main loop consumes it and toggles the status LED.  Timer
//! callbacks execute in the ESP timer task context (not ISR), so they can
//! safely call `push_event()`.
//!
//! On simulation targets the ticker is a no-op — host tests push status
//! ticks directly.

#[cfg(target_os = "espidf")]
use crate::events::{push_event, Event};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
static mut STATUS_TIMER: esp_timer_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe extern "C" fn status_tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::StatusTick);
}

/// Start the status indicator ticker at `period_ms`.
#[cfg(target_os = "espidf")]
pub fn start_status_ticker(period_ms: u32) {
    // SAFETY: STATUS_TIMER is written here once at boot from the single
    // main-task context before any timer callbacks fire.  The callback
    // only calls push_event(), which is ISR-safe.
    unsafe {
        let args = esp_timer_create_args_t {
            callback: Some(status_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"status\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&args, &raw mut STATUS_TIMER);
        if ret != ESP_OK {
            log::error!(
                "hw_timer: status timer create failed (rc={}) — continuing without indicator",
                ret
            );
            return;
        }
        let ret = esp_timer_start_periodic(STATUS_TIMER, u64::from(period_ms) * 1000);
        if ret != ESP_OK {
            log::error!("hw_timer: status timer start failed (rc={})", ret);
            return;
        }
    }
    log::info!("hw_timer: status ticker started ({} ms)", period_ms);
}

#[cfg(not(target_os = "espidf"))]
pub fn start_status_ticker(period_ms: u32) {
    log::info!("hw_timer(sim): status ticker not started ({} ms)", period_ms);
}

/// Detach the status ticker (shutdown path).
#[cfg(target_os = "espidf")]
pub fn stop_status_ticker() {
    // SAFETY: STATUS_TIMER is a valid handle if start succeeded; the
    // null-check prevents stopping a timer that never started.
    unsafe {
        let t = STATUS_TIMER;
        if !t.is_null() {
            esp_timer_stop(t);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_status_ticker() {}
