//! Unified error types for the ScanLink firmware.
//!
//! Follows embedded best practice: a single `Error` enum that every subsystem
//! can convert into, keeping the top-level control loop's error handling
//! uniform.  All variants are `Copy` so they can be cheaply passed through
//! the lifecycle controller without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A resource registry operation was rejected.
    Registry(RegistryError),
    /// A block transfer was aborted or failed integrity checks.
    Transfer(TransferError),
    /// A network or registration operation failed.
    Net(NetError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Transfer(e) => write!(f, "transfer: {e}"),
            Self::Net(e) => write!(f, "net: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// No resource exists at the requested path.
    UnknownPath,
    /// The resource exists but its access mask forbids the operation.
    MethodNotAllowed,
    /// A resource was inserted twice at the same path.
    DuplicatePath,
    /// Execute was requested on a resource with no execute hook.
    NoExecuteHook,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPath => write!(f, "unknown resource path"),
            Self::MethodNotAllowed => write!(f, "method not allowed"),
            Self::DuplicatePath => write!(f, "duplicate resource path"),
            Self::NoExecuteHook => write!(f, "no execute hook installed"),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Block transfer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    /// The peer flagged the transfer with an error code (e.g. entity too
    /// large).  All accumulated state is discarded.
    PeerError,
    /// A block arrived out of sequence.
    OutOfOrder { expected: u32, got: u32 },
    /// A non-initial block arrived with no transfer in progress.
    NoTransferActive,
    /// Reassembled length differs from the declared total message size.
    SizeMismatch { declared: usize, actual: usize },
    /// An outbound block was requested out of sequence.
    BadChunkRequest,
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerError => write!(f, "peer reported block error"),
            Self::OutOfOrder { expected, got } => {
                write!(f, "block out of order (expected {expected}, got {got})")
            }
            Self::NoTransferActive => write!(f, "block received with no transfer active"),
            Self::SizeMismatch { declared, actual } => {
                write!(f, "size mismatch (declared {declared}, got {actual})")
            }
            Self::BadChunkRequest => write!(f, "outbound chunk requested out of sequence"),
        }
    }
}

impl From<TransferError> for Error {
    fn from(e: TransferError) -> Self {
        Self::Transfer(e)
    }
}

// ---------------------------------------------------------------------------
// Network / registration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectFailed,
    RegistrationFailed,
    UpdateFailed,
    UnregisterFailed,
    NotRegistered,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no network credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectFailed => write!(f, "network connect failed"),
            Self::RegistrationFailed => write!(f, "registration handshake failed"),
            Self::UpdateFailed => write!(f, "update-registration failed"),
            Self::UnregisterFailed => write!(f, "unregister failed"),
            Self::NotRegistered => write!(f, "not registered"),
        }
    }
}

impl From<NetError> for Error {
    fn from(e: NetError) -> Self {
        Self::Net(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
