//! Outbound application events.
//!
//! The [`DeviceService`](super::service::DeviceService) and the lifecycle
//! controller emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them — log to
//! serial today, push to a telemetry uplink tomorrow.

use crate::blink::BlinkColor;
use crate::error::TransferError;
use crate::registry::ResourcePath;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Registration handshake succeeded.
    Registered { endpoint: heapless::String<24> },

    /// A keep-alive update-registration was sent.
    RegistrationUpdated,

    /// The final unregister completed; the device is leaving.
    Unregistered,

    /// The decode bridge forwarded a fresh barcode into the registry.
    DecodeForwarded { len: usize },

    /// The server wrote a new value into a resource.
    ValueWritten { path: ResourcePath, len: usize },

    /// A blink sequence is about to run.
    BlinkRun { color: BlinkColor, steps: usize },

    /// An inbound block transfer completed and replaced the resource value.
    TransferComplete { path: ResourcePath, len: usize },

    /// An inbound block transfer was discarded.
    TransferFailed { path: ResourcePath, reason: TransferError },

    /// A change notification was pushed for an observed resource.
    NotifySent { path: ResourcePath },
}
