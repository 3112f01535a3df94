//! Inbound server requests and their replies.
//!
//! The registration engine surfaces server operations as [`ServerRequest`]
//! values; the [`DeviceService`](super::service::DeviceService) interprets
//! them against the resource registry and answers with a [`ServerReply`].
//! Wire encoding on both sides is the engine's concern.

use crate::registry::ResourcePath;
use crate::transfer::BlockMessage;

/// One operation requested by the management server.
#[derive(Debug, Clone)]
pub enum ServerRequest {
    /// GET a resource value.
    Read { path: ResourcePath },

    /// PUT a new resource value.
    Write { path: ResourcePath, value: Vec<u8> },

    /// POST to an executable resource.
    Execute { path: ResourcePath, args: Vec<u8> },

    /// One block of a segmented PUT.
    BlockWrite {
        path: ResourcePath,
        message: BlockMessage,
        payload: Vec<u8>,
    },

    /// One block of a segmented GET.
    BlockRead { path: ResourcePath, number: u32 },
}

impl ServerRequest {
    /// The resource the request addresses.
    pub fn path(&self) -> ResourcePath {
        match self {
            Self::Read { path }
            | Self::Write { path, .. }
            | Self::Execute { path, .. }
            | Self::BlockWrite { path, .. }
            | Self::BlockRead { path, .. } => *path,
        }
    }
}

/// The device's answer to a [`ServerRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerReply {
    /// Read result.
    Value { path: ResourcePath, value: Vec<u8> },

    /// One outbound chunk of a segmented read.  `more` is false on the
    /// final chunk.  The data is always populated — a zero-length chunk
    /// stands in for "nothing to send".
    Chunk {
        path: ResourcePath,
        number: u32,
        data: Vec<u8>,
        more: bool,
    },

    /// Write/execute/block-progress acknowledgement.
    Changed { path: ResourcePath },

    /// The request was rejected.
    Error { path: ResourcePath, code: ReplyCode },
}

/// Rejection category mapped onto the engine's response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCode {
    /// No resource at the requested path.
    NotFound,
    /// The resource's access mask forbids the operation.
    MethodNotAllowed,
    /// Malformed or out-of-sequence request (bad block, failed transfer).
    BadRequest,
}
