//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DeviceService / control loop (domain)
//! ```
//!
//! Driven adapters (registrar, recognition engine, LED bank, clock,
//! storage) implement these traits.  The domain consumes them via
//! generics, so the core never touches hardware or the network directly —
//! and the whole thing runs against mocks on the host.

use crate::blink::ChannelMask;
use crate::config::DeviceConfig;
use crate::error::NetError;
use crate::registry::{ResourcePath, ResourceRegistry};

use super::events::AppEvent;
use super::requests::{ServerReply, ServerRequest};

// ───────────────────────────────────────────────────────────────
// Registrar port (driven adapter: domain ↔ management server)
// ───────────────────────────────────────────────────────────────

/// Device identity presented at registration time.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Endpoint name the server addresses this device by.
    pub name: heapless::String<24>,
    pub manufacturer: &'static str,
    pub device_type: &'static str,
    pub model: &'static str,
    /// Serial number derived from the factory MAC.
    pub serial: heapless::String<16>,
}

/// The external object-registration engine.  The wire protocol, transport
/// and security stack are the collaborator's concern; the core only drives
/// this narrow contract.
pub trait RegistrarPort {
    /// Perform the registration handshake, presenting the endpoint identity
    /// and the device's resource surface.
    fn register(&mut self, endpoint: &Endpoint, objects: &ResourceRegistry)
        -> Result<(), NetError>;

    /// Refresh the registration lease (keep-alive).
    fn update(&mut self) -> Result<(), NetError>;

    /// Tear the registration down.
    fn unregister(&mut self) -> Result<(), NetError>;

    /// Push a change notification for an observed resource.
    fn notify(&mut self, path: ResourcePath, value: &[u8]) -> Result<(), NetError>;

    /// Next pending server request, if any.  Drained by the control loop
    /// each iteration.
    fn take_request(&mut self) -> Option<ServerRequest>;

    /// Hand the reply for the most recent request back to the engine.
    fn respond(&mut self, reply: ServerReply);
}

// ───────────────────────────────────────────────────────────────
// Recognition engine port (driven adapter: camera decoder → domain)
// ───────────────────────────────────────────────────────────────

/// The external barcode recognition engine.
///
/// The engine runs its own capture/decode pipeline; the domain only polls.
/// `poll` returns `Some(bytes)` exactly once per fresh decode event and
/// `None` otherwise, mirroring the engine's zero/non-zero poll contract.
pub trait DecoderPort {
    /// Initialise the engine and install its decode sink.
    fn init(&mut self) -> Result<(), crate::error::Error>;

    /// Run one decode cycle and take the fresh result, if any.
    fn poll(&mut self) -> Option<Vec<u8>>;
}

// ───────────────────────────────────────────────────────────────
// LED port (driven adapter: domain → blink channels + status LED)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the LED bank.
pub trait LedPort {
    /// Toggle every channel in `mask`.  An empty mask is a pure no-op.
    fn toggle(&mut self, mask: ChannelMask);

    /// Toggle the registration status indicator.
    fn toggle_status(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Timer port (monotonic time + cooperative delay)
// ───────────────────────────────────────────────────────────────

/// Monotonic clock and cooperative suspension.
///
/// `sleep_ms` yields the calling context; on the device it blocks the main
/// task (FreeRTOS delay), in tests the mock advances virtual time instead.
pub trait TimerPort {
    /// Milliseconds since boot (monotonic).
    fn now_ms(&self) -> u64;

    /// Suspend the calling context for `ms` milliseconds.
    fn sleep_ms(&self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.  Adapters
/// decide where they go (serial log today; a telemetry uplink would
/// implement the same trait).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists device configuration.
///
/// Implementations MUST validate config values before persisting.  Invalid
/// ranges are rejected with [`ConfigError::ValidationFailed`], not silently
/// clamped — a compromised provisioning channel must not be able to inject
/// degenerate loop timings.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`DeviceConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<DeviceConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DeviceConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for config blobs and crash logs.
///
/// Keys are namespaced to prevent collisions between subsystems; writes
/// MUST be atomic (the ESP-IDF NVS API guarantees this natively, the
/// in-memory simulation trivially).
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
