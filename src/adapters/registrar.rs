//! Registrar adapter — loopback stand-in for the managed connector.
//!
//! The production connector component (CoAP wire client + DTLS transport)
//! is linked in the same way as the recognition engine and replaces this
//! adapter behind the same [`RegistrarPort`] trait.  Until then the
//! loopback logs all registration traffic, accepts every handshake, and
//! lets the simulator inject server requests — which is also exactly what
//! the integration tests need.

use std::collections::VecDeque;

use log::info;

use crate::app::ports::{Endpoint, RegistrarPort};
use crate::app::requests::{ServerReply, ServerRequest};
use crate::error::NetError;
use crate::registry::{ResourcePath, ResourceRegistry};

pub struct LoopbackRegistrar {
    registered: bool,
    requests: VecDeque<ServerRequest>,
    replies: Vec<ServerReply>,
    update_count: u32,
    notify_count: u32,
}

impl LoopbackRegistrar {
    pub fn new() -> Self {
        Self {
            registered: false,
            requests: VecDeque::new(),
            replies: Vec::new(),
            update_count: 0,
            notify_count: 0,
        }
    }

    /// Inject a server request, as the connector would on an inbound
    /// message.
    pub fn inject_request(&mut self, request: ServerRequest) {
        self.requests.push_back(request);
    }

    /// Replies handed back so far (simulation/testing).
    pub fn replies(&self) -> &[ServerReply] {
        &self.replies
    }

    pub fn update_count(&self) -> u32 {
        self.update_count
    }

    pub fn notify_count(&self) -> u32 {
        self.notify_count
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }
}

impl Default for LoopbackRegistrar {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrarPort for LoopbackRegistrar {
    fn register(
        &mut self,
        endpoint: &Endpoint,
        objects: &ResourceRegistry,
    ) -> Result<(), NetError> {
        info!(
            "registrar(loopback): register '{}' ({} {} {}, serial {}) with {} resources",
            endpoint.name,
            endpoint.manufacturer,
            endpoint.device_type,
            endpoint.model,
            endpoint.serial,
            objects.len(),
        );
        for resource in objects.iter() {
            info!("registrar(loopback):   {} ({})", resource.path, resource.name);
        }
        self.registered = true;
        Ok(())
    }

    fn update(&mut self) -> Result<(), NetError> {
        if !self.registered {
            return Err(NetError::NotRegistered);
        }
        self.update_count += 1;
        info!("registrar(loopback): update-registration #{}", self.update_count);
        Ok(())
    }

    fn unregister(&mut self) -> Result<(), NetError> {
        if !self.registered {
            return Err(NetError::NotRegistered);
        }
        self.registered = false;
        info!("registrar(loopback): unregistered");
        Ok(())
    }

    fn notify(&mut self, path: ResourcePath, value: &[u8]) -> Result<(), NetError> {
        self.notify_count += 1;
        info!(
            "registrar(loopback): notify {} ({} bytes)",
            path,
            value.len()
        );
        Ok(())
    }

    fn take_request(&mut self) -> Option<ServerRequest> {
        self.requests.pop_front()
    }

    fn respond(&mut self, reply: ServerReply) {
        self.replies.push(reply);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_requires_registration() {
        let mut reg = LoopbackRegistrar::new();
        assert_eq!(reg.update(), Err(NetError::NotRegistered));
        assert_eq!(reg.unregister(), Err(NetError::NotRegistered));
    }

    #[test]
    fn injected_requests_drain_in_order() {
        let mut reg = LoopbackRegistrar::new();
        let path = crate::registry::objects::SCANCODE;
        reg.inject_request(ServerRequest::Read { path });
        assert!(matches!(
            reg.take_request(),
            Some(ServerRequest::Read { .. })
        ));
        assert!(reg.take_request().is_none());
    }
}
