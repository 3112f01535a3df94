//! Resource — a typed, addressable unit of device state.
//!
//! Every resource carries a three-part path (`object/instance/resource`,
//! all fixed string codes from the object model), a semantic type, an
//! access-control bitmask, an observability flag, and its current value.
//! The value buffer is always present: an empty value is an empty byte
//! vector, never an absent option.

use core::fmt;

// ---------------------------------------------------------------------------
// Path
// ---------------------------------------------------------------------------

/// Fully qualified resource address: object type code, instance index,
/// resource code.  The codes are the string identifiers the management
/// server addresses (e.g. `3201/0/5850`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourcePath {
    pub object: &'static str,
    pub instance: u16,
    pub resource: &'static str,
}

impl ResourcePath {
    pub const fn new(object: &'static str, instance: u16, resource: &'static str) -> Self {
        Self {
            object,
            instance,
            resource,
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.object, self.instance, self.resource)
    }
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

/// A single server-side operation on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Execute,
}

/// Access-control bitmask: which operations the server may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operations(u8);

impl Operations {
    pub const NONE: Self = Self(0);
    pub const GET: Self = Self(0b001);
    pub const PUT: Self = Self(0b010);
    pub const POST: Self = Self(0b100);
    pub const GET_PUT: Self = Self(0b011);

    /// Whether the mask permits `op`.
    pub const fn allows(self, op: Operation) -> bool {
        let bit = match op {
            Operation::Read => Self::GET.0,
            Operation::Write => Self::PUT.0,
            Operation::Execute => Self::POST.0,
        };
        self.0 & bit != 0
    }
}

// ---------------------------------------------------------------------------
// Typing and dispatch hooks
// ---------------------------------------------------------------------------

/// Semantic type of a resource value as presented to the server.
/// The stored representation is always raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    Str,
    Integer,
    Opaque,
}

/// Typed execute dispatch token.  The service interprets the token when the
/// server POSTs to the resource; the resource itself stays a passive record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteHook {
    /// Read the sibling pattern/color resources and run a blink sequence.
    BlinkLed,
}

/// Typed block-transfer dispatch token.  Marks the resource as accepting
/// segmented writes and serving segmented reads of its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockHook {
    /// Reassembled payloads replace the resource value; outbound reads
    /// slice the stored value into chunks.
    PayloadStore,
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// One addressable unit of device state.
///
/// Created once at startup by the object builders, mutated in place by
/// hardware callbacks and server writes, never destroyed until teardown.
#[derive(Debug, Clone)]
pub struct Resource {
    pub path: ResourcePath,
    /// Human-readable name reported at registration time.
    pub name: &'static str,
    pub semantic: SemanticType,
    pub ops: Operations,
    /// Whether the server may subscribe to value changes.
    pub observable: bool,
    value: Vec<u8>,
    execute: Option<ExecuteHook>,
    block: Option<BlockHook>,
}

impl Resource {
    pub fn new(
        path: ResourcePath,
        name: &'static str,
        semantic: SemanticType,
        ops: Operations,
        observable: bool,
    ) -> Self {
        Self {
            path,
            name,
            semantic,
            ops,
            observable,
            value: Vec::new(),
            execute: None,
            block: None,
        }
    }

    /// Set the initial value at construction time (builder style).
    pub fn with_value(mut self, value: &[u8]) -> Self {
        self.value = value.to_vec();
        self
    }

    /// Attach an execute dispatch token (builder style).
    pub fn with_execute_hook(mut self, hook: ExecuteHook) -> Self {
        self.execute = Some(hook);
        self
    }

    /// Attach a block-transfer dispatch token (builder style).
    pub fn with_block_hook(mut self, hook: BlockHook) -> Self {
        self.block = Some(hook);
        self
    }

    /// Last-set value bytes.  Side-effect free.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Overwrite the stored value in place.  Never fails; observers are
    /// notified by the registry layer, not here.
    pub fn set_value(&mut self, value: &[u8]) {
        self.value.clear();
        self.value.extend_from_slice(value);
    }

    pub fn execute_hook(&self) -> Option<ExecuteHook> {
        self.execute
    }

    pub fn block_hook(&self) -> Option<BlockHook> {
        self.block
    }
}
