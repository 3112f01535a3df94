//! One-shot hardware peripheral initialization.
//!
//! Configures GPIO directions, the unregister-button interrupt, and the
//! task watchdog using raw ESP-IDF sys calls.  Called once from `main()`
//! before the control loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    WatchdogInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::WatchdogInitFailed(rc) => write!(f, "TWDT subscribe failed (rc={})", rc),
        }
    }
}

// ── Peripheral setup ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    let output_pins = [
        pins::LED_A_GPIO,
        pins::LED_B_GPIO,
        pins::LED_C_GPIO,
        pins::STATUS_LED_GPIO,
    ];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: single-threaded init path, config struct is local.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    // Unregister button: input, pull-up, falling-edge interrupt.
    let btn_cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::BUTTON_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
    };
    // SAFETY: as above.
    let ret = unsafe { gpio_config(&btn_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }

    log::info!("hw_init: GPIO configured (3 blink channels, status LED, button)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── Button ISR wiring ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn button_isr_trampoline(_arg: *mut core::ffi::c_void) {
    // SAFETY: esp_timer_get_time is ISR-safe (counter read).  The handler
    // only stores an atomic timestamp — no resource state is touched here.
    let now_ms = (unsafe { esp_timer_get_time() }) as u64 / 1000;
    crate::drivers::button::button_isr_handler(now_ms as u32);
}

#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: called once from the main task; handler registration happens
    // before the control loop starts consuming button events.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        let ret = gpio_isr_handler_add(
            pins::BUTTON_GPIO,
            Some(button_isr_trampoline),
            core::ptr::null_mut(),
        );
        if ret != ESP_OK {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
    }
    log::info!("hw_init: unregister button ISR armed (falling edge)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

// ── GPIO access ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_set_level(pin: i32, high: bool) {
    // SAFETY: pin was configured as output in init_peripherals().
    unsafe {
        esp_idf_svc::sys::gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_set_level(_pin: i32, _high: bool) {}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only level query.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true // button line idles high (pull-up)
}

// ── Task watchdog ─────────────────────────────────────────────

/// Subscribe the main task to the TWDT (8 s timeout, panic on trigger).
/// The control loop must call [`watchdog_feed`] every iteration.
#[cfg(target_os = "espidf")]
pub fn watchdog_init() -> Result<(), HwInitError> {
    // SAFETY: reconfigure + subscribe from the main task before the loop.
    unsafe {
        let cfg = esp_task_wdt_config_t {
            timeout_ms: 8_000,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        let ret = esp_task_wdt_reconfigure(&cfg);
        if ret != ESP_OK {
            log::warn!("TWDT reconfigure returned {} (may already be configured)", ret);
        }
        let ret = esp_task_wdt_add(core::ptr::null_mut());
        if ret != ESP_OK {
            return Err(HwInitError::WatchdogInitFailed(ret));
        }
    }
    log::info!("hw_init: TWDT subscribed (8s timeout)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn watchdog_init() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): watchdog skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn watchdog_feed() {
    // SAFETY: no-op unless the calling task subscribed via watchdog_init().
    unsafe {
        esp_task_wdt_reset();
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn watchdog_feed() {}
