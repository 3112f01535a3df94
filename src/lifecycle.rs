//! Registration lifecycle controller.
//!
//! Owns the device's registration state as an explicit state machine,
//! mutated only through transition methods — never through ad hoc flags:
//!
//! ```text
//! UNREGISTERED ──register──▶ REGISTERING ──handshake ok──▶ REGISTERED
//!                                 │                            │
//!                            handshake err                unregister
//!                            (fatal, exit)                 requested
//!                                                              ▼
//! UNREGISTERED ◀──final unregister sent── UNREGISTERING ◀──────┘
//! ```
//!
//! While `REGISTERED`, [`run`] drives the cooperative main loop: poll the
//! recognition engine (a fresh decode resets the keep-alive timer), send an
//! update-registration when the timer exceeds the threshold, service server
//! requests, flush observer notifications, then sleep the fixed loop delay.
//! The hardware unregister trigger arrives as an [`Event`] pushed from ISR
//! context; the loop observes it at each iteration and tears down cleanly.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{DecoderPort, Endpoint, EventSink, LedPort, RegistrarPort, TimerPort};
use crate::app::service::DeviceService;
use crate::config::DeviceConfig;
use crate::drivers::button::{ButtonDriver, ButtonEvent};
use crate::error::{Error, NetError, Result};
use crate::events::{self, Event};

// ───────────────────────────────────────────────────────────────
// State machine
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unregistered,
    Registering,
    Registered,
    Unregistering,
}

/// Keep-alive cadence: tracks elapsed time since the last decode or
/// update-registration and fires when the threshold is exceeded.
#[derive(Debug, Clone, Copy)]
pub struct KeepAlive {
    last_reset_ms: u64,
    threshold_ms: u64,
}

impl KeepAlive {
    pub fn new(threshold_secs: u32, now_ms: u64) -> Self {
        Self {
            last_reset_ms: now_ms,
            threshold_ms: u64::from(threshold_secs) * 1000,
        }
    }

    pub fn reset(&mut self, now_ms: u64) {
        self.last_reset_ms = now_ms;
    }

    pub fn due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_reset_ms) >= self.threshold_ms
    }
}

/// The lifecycle controller.
///
/// The unregister trigger is recorded as a pending request (set from the
/// event drain, which itself is fed by the button ISR) and consumed by the
/// control loop — interrupt context never touches the state machine.
pub struct LifecycleController {
    state: LifecycleState,
    keepalive: KeepAlive,
    unregister_requested: bool,
}

impl LifecycleController {
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            state: LifecycleState::Unregistered,
            keepalive: KeepAlive::new(config.keepalive_secs, 0),
            unregister_requested: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_registered(&self) -> bool {
        self.state == LifecycleState::Registered
    }

    /// `UNREGISTERED → REGISTERING`.
    pub fn begin_registration(&mut self) {
        if self.state != LifecycleState::Unregistered {
            warn!("begin_registration in {:?} — ignored", self.state);
            return;
        }
        info!("lifecycle: UNREGISTERED -> REGISTERING");
        self.state = LifecycleState::Registering;
    }

    /// `REGISTERING → REGISTERED`; arms the keep-alive timer.
    pub fn registration_succeeded(&mut self, now_ms: u64) {
        if self.state != LifecycleState::Registering {
            warn!("registration_succeeded in {:?} — ignored", self.state);
            return;
        }
        info!("lifecycle: REGISTERING -> REGISTERED");
        self.state = LifecycleState::Registered;
        self.keepalive.reset(now_ms);
    }

    /// Record the external unregister trigger.  Idempotent; callable from
    /// the event drain on the loop thread.
    pub fn request_unregister(&mut self) {
        if !self.unregister_requested {
            info!("lifecycle: unregister requested");
        }
        self.unregister_requested = true;
    }

    pub fn unregister_pending(&self) -> bool {
        self.unregister_requested
    }

    /// A fresh decode keeps the registration warm.
    pub fn on_decode(&mut self, now_ms: u64) {
        self.keepalive.reset(now_ms);
    }

    /// Whether an update-registration is due.  Never fires outside
    /// `REGISTERED`.
    pub fn keepalive_due(&self, now_ms: u64) -> bool {
        self.state == LifecycleState::Registered && self.keepalive.due(now_ms)
    }

    pub fn on_update_sent(&mut self, now_ms: u64) {
        self.keepalive.reset(now_ms);
    }

    /// `REGISTERED → UNREGISTERING`.
    pub fn begin_unregister(&mut self) {
        if self.state != LifecycleState::Registered {
            warn!("begin_unregister in {:?} — ignored", self.state);
            return;
        }
        info!("lifecycle: REGISTERED -> UNREGISTERING");
        self.state = LifecycleState::Unregistering;
    }

    /// `UNREGISTERING → UNREGISTERED` (terminal for this process).
    pub fn finish_unregister(&mut self) {
        if self.state != LifecycleState::Unregistering {
            warn!("finish_unregister in {:?} — ignored", self.state);
            return;
        }
        info!("lifecycle: UNREGISTERING -> UNREGISTERED");
        self.state = LifecycleState::Unregistered;
        self.unregister_requested = false;
    }
}

// ───────────────────────────────────────────────────────────────
// Registration + main loop
// ───────────────────────────────────────────────────────────────

/// Counters reported when the loop exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoopStats {
    pub iterations: u64,
    pub decodes: u64,
    pub keepalives: u64,
}

/// Perform the registration handshake.
///
/// Failure is fatal by design — the caller reports and exits; there is no
/// retry loop.
pub fn register(
    ctrl: &mut LifecycleController,
    service: &DeviceService,
    registrar: &mut impl RegistrarPort,
    endpoint: &Endpoint,
    timer: &impl TimerPort,
    sink: &mut impl EventSink,
) -> Result<()> {
    ctrl.begin_registration();
    registrar.register(endpoint, service.registry())?;
    ctrl.registration_succeeded(timer.now_ms());
    sink.emit(&AppEvent::Registered {
        endpoint: endpoint.name.clone(),
    });
    Ok(())
}

/// Drive the registered device until an unregister is requested, then send
/// the final unregister.
///
/// Must be entered in `REGISTERED`; returns the loop counters on clean
/// teardown.
pub fn run(
    ctrl: &mut LifecycleController,
    service: &mut DeviceService,
    registrar: &mut impl RegistrarPort,
    decoder: &mut impl DecoderPort,
    button: &mut ButtonDriver,
    led: &mut impl LedPort,
    timer: &impl TimerPort,
    sink: &mut impl EventSink,
    config: &DeviceConfig,
) -> Result<LoopStats> {
    if !ctrl.is_registered() {
        return Err(Error::Net(NetError::NotRegistered));
    }

    let mut stats = LoopStats::default();

    loop {
        // Debounce the unregister button; a confirmed press becomes an
        // event like any other interrupt-origin trigger.
        if let Some(ButtonEvent::Pressed) = button.tick(timer.now_ms() as u32) {
            events::push_event(Event::UnregisterRequested);
        }

        // Interrupt-origin events: flags only, consumed here on the loop
        // thread.
        events::drain_events(|event| match event {
            Event::UnregisterRequested => ctrl.request_unregister(),
            Event::StatusTick => led.toggle_status(),
        });

        if ctrl.unregister_pending() {
            break;
        }

        // A fresh decode keeps the lease warm; otherwise fall back to the
        // keep-alive cadence.
        if let Some(decoded) = decoder.poll() {
            service.forward_decode(&decoded, sink);
            ctrl.on_decode(timer.now_ms());
            stats.decodes += 1;
        } else if ctrl.keepalive_due(timer.now_ms()) {
            match registrar.update() {
                Ok(()) => {
                    sink.emit(&AppEvent::RegistrationUpdated);
                    stats.keepalives += 1;
                }
                // Recurs at the next threshold crossing; nothing else
                // retries automatically.
                Err(e) => warn!("update-registration failed: {e}"),
            }
            ctrl.on_update_sent(timer.now_ms());
        }

        // Server requests (read/write/execute/block).
        while let Some(request) = registrar.take_request() {
            let reply = service.handle_request(request, led, timer, sink);
            registrar.respond(reply);
        }

        // Change notifications for observed resources.
        for (path, value) in service.take_notifications() {
            match registrar.notify(path, &value) {
                Ok(()) => sink.emit(&AppEvent::NotifySent { path }),
                Err(e) => warn!("notify {path} failed: {e}"),
            }
        }

        stats.iterations += 1;
        crate::drivers::hw_init::watchdog_feed();
        timer.sleep_ms(config.loop_delay_ms);
    }

    // Tear down: final unregister, then terminal state.
    ctrl.begin_unregister();
    match registrar.unregister() {
        Ok(()) => sink.emit(&AppEvent::Unregistered),
        // The process is exiting either way; report and carry on.
        Err(e) => warn!("final unregister failed: {e}"),
    }
    ctrl.finish_unregister();

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> LifecycleController {
        LifecycleController::new(&DeviceConfig::default())
    }

    #[test]
    fn full_lifecycle_walk() {
        let mut ctrl = controller();
        assert_eq!(ctrl.state(), LifecycleState::Unregistered);

        ctrl.begin_registration();
        assert_eq!(ctrl.state(), LifecycleState::Registering);

        ctrl.registration_succeeded(0);
        assert!(ctrl.is_registered());

        ctrl.begin_unregister();
        assert_eq!(ctrl.state(), LifecycleState::Unregistering);

        ctrl.finish_unregister();
        assert_eq!(ctrl.state(), LifecycleState::Unregistered);
    }

    #[test]
    fn illegal_transitions_are_ignored() {
        let mut ctrl = controller();

        // Can't succeed a handshake that never started.
        ctrl.registration_succeeded(0);
        assert_eq!(ctrl.state(), LifecycleState::Unregistered);

        // Can't unregister while unregistered.
        ctrl.begin_unregister();
        assert_eq!(ctrl.state(), LifecycleState::Unregistered);
    }

    #[test]
    fn keepalive_fires_only_when_registered() {
        let mut ctrl = controller();
        // 25s default threshold.
        assert!(!ctrl.keepalive_due(30_000));

        ctrl.begin_registration();
        ctrl.registration_succeeded(0);
        assert!(!ctrl.keepalive_due(24_999));
        assert!(ctrl.keepalive_due(25_000));
    }

    #[test]
    fn decode_resets_keepalive() {
        let mut ctrl = controller();
        ctrl.begin_registration();
        ctrl.registration_succeeded(0);

        // Decodes every 20s — the timer never reaches the 25s threshold.
        for t in [20_000, 40_000, 60_000] {
            assert!(!ctrl.keepalive_due(t));
            ctrl.on_decode(t);
        }
        assert!(!ctrl.keepalive_due(84_999));
        assert!(ctrl.keepalive_due(85_000));
    }

    #[test]
    fn unregister_request_is_idempotent() {
        let mut ctrl = controller();
        assert!(!ctrl.unregister_pending());
        ctrl.request_unregister();
        ctrl.request_unregister();
        assert!(ctrl.unregister_pending());
    }
}
