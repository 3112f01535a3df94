//! ScanLink Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter  LogEventSink  NvsAdapter   Esp32TimeAdapter  │
//! │  (LedPort)        (EventSink)   (ConfigPort) (TimerPort)       │
//! │  WifiAdapter      RecognizerAdapter   LoopbackRegistrar        │
//! │  (Connectivity)   (DecoderPort)       (RegistrarPort)          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  DeviceService (registry · blocks · blink)             │    │
//! │  │  LifecycleController (register · keep-alive · teardown)│    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Button ISR ──▶ event queue ──▶ loop   Status ticker ──▶ loop  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::{info, warn};

use scanlink::adapters::hardware::HardwareAdapter;
use scanlink::adapters::log_sink::LogEventSink;
use scanlink::adapters::nvs::NvsAdapter;
use scanlink::adapters::recognizer::RecognizerAdapter;
use scanlink::adapters::registrar::LoopbackRegistrar;
use scanlink::adapters::time::Esp32TimeAdapter;
use scanlink::adapters::wifi::{ConnectivityPort, WifiAdapter};
use scanlink::adapters::{device_id, entropy};
use scanlink::app::ports::{ConfigPort, DecoderPort, Endpoint};
use scanlink::app::service::DeviceService;
use scanlink::config::DeviceConfig;
use scanlink::diagnostics;
use scanlink::drivers::button::ButtonDriver;
use scanlink::drivers::{hw_init, hw_timer};
use scanlink::lifecycle::{self, LifecycleController};
use scanlink::registry::objects;
use scanlink::{error, pins};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }

    info!("ScanLink v{} starting", env!("CARGO_PKG_VERSION"));
    diagnostics::install_panic_handler();

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // No GPIO means no device — fatal.
        anyhow::bail!("peripheral init failed: {e}");
    }
    if let Err(e) = hw_init::init_isr_service() {
        warn!("ISR service init failed: {} — unregister button disabled", e);
    }
    if let Err(e) = hw_init::watchdog_init() {
        warn!("watchdog init failed: {}", e);
    }

    // ── 3. Config from NVS (or defaults) ──────────────────────
    let config = match NvsAdapter::new() {
        Ok(nvs) => match nvs.load() {
            Ok(cfg) => {
                info!("Config loaded from NVS");
                cfg
            }
            Err(e) => {
                warn!("NVS config load failed ({}), using defaults", e);
                DeviceConfig::default()
            }
        },
        Err(e) => {
            warn!("NVS init failed ({}), using defaults and no persistence", e);
            DeviceConfig::default()
        }
    };

    // ── 4. Entropy (fatal if absent) ──────────────────────────
    // The registration transport randomizes its source port from this
    // seed; without entropy the endpoint must not register.
    let seed = entropy::seed().context("no entropy source — refusing to register")?;
    info!("Entropy seed acquired (0x{seed:08x})");

    // ── 5. Status indicator ───────────────────────────────────
    hw_timer::start_status_ticker(config.status_tick_ms);

    // ── 6. Network bring-up (fatal on failure, no retry) ──────
    let mut wifi = WifiAdapter::new();
    wifi.set_credentials(config.wifi_ssid.as_str(), config.wifi_password.as_str())
        .map_err(error::Error::from)
        .context("invalid network credentials")?;
    wifi.connect()
        .map_err(error::Error::from)
        .context("network connect failed — exiting")?;
    match wifi.ip_address() {
        Some(ip) => info!("IP address {}", ip),
        None => info!("No IP address"),
    }

    // ── 7. Identity + resource surface ────────────────────────
    let mac = device_id::read_mac();
    let endpoint = Endpoint {
        name: device_id::endpoint_name(&mac),
        manufacturer: "ScanLink Systems",
        device_type: "barcode-scanner",
        model: "SL-300",
        serial: device_id::serial(&mac),
    };
    info!("Endpoint '{}' (serial {})", endpoint.name, endpoint.serial);

    let registry = objects::build_registry(&config)?;
    let mut service = DeviceService::new(&config, registry);

    // ── 8. Collaborators ──────────────────────────────────────
    let mut registrar = LoopbackRegistrar::new();
    let mut decoder = RecognizerAdapter::new();
    decoder.init().context("recognition engine init failed")?;

    let mut hw = HardwareAdapter::new();
    let mut button = ButtonDriver::new(pins::BUTTON_GPIO);
    let timer = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();

    // ── 9. Register (fatal on failure, no retry) ──────────────
    let mut ctrl = LifecycleController::new(&config);
    lifecycle::register(
        &mut ctrl,
        &service,
        &mut registrar,
        &endpoint,
        &timer,
        &mut sink,
    )
    .context("registration handshake failed")?;

    // ── 10. Control loop until unregistered ───────────────────
    info!("System ready. Entering control loop.");
    let stats = lifecycle::run(
        &mut ctrl,
        &mut service,
        &mut registrar,
        &mut decoder,
        &mut button,
        &mut hw,
        &timer,
        &mut sink,
        &config,
    )?;

    // ── 11. Teardown ──────────────────────────────────────────
    hw_timer::stop_status_ticker();
    hw.all_off();
    info!(
        "ScanLink exiting: {} iterations, {} decodes, {} keep-alives",
        stats.iterations, stats.decodes, stats.keepalives
    );
    Ok(())
}
