//! Device service — the hexagonal core.
//!
//! [`DeviceService`] owns the resource registry, the block-transfer
//! assembler, and the outbound slicer.  It interprets server requests
//! against the registry, runs blink sequences, and bridges decode events
//! into the scancode resource.  All I/O flows through port traits injected
//! at call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  RegistrarPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!  DecoderPort  ──▶  │        DeviceService        │
//!       LedPort ◀──  │  Registry · Blocks · Blink  │
//!                    └────────────────────────────┘
//! ```
//!
//! Everything here runs on the single control-loop thread.  A blink
//! sequence executes synchronously, so a long pattern delays keep-alive
//! processing for its full duration — a documented latency tradeoff of the
//! cooperative design.  The same synchrony serializes overlapping execute
//! requests: a second blink starts only after the first has finished.

use log::{info, warn};

use crate::blink::BlinkSequence;
use crate::config::DeviceConfig;
use crate::error::RegistryError;
use crate::registry::objects::{LED_COLOR, LED_PATTERN};
use crate::registry::{Operation, ResourcePath, ResourceRegistry};
use crate::transfer::{BlockAssembler, FeedOutcome, OutboundSlicer};

use super::events::AppEvent;
use super::ports::{EventSink, LedPort, TimerPort};
use super::requests::{ReplyCode, ServerReply, ServerRequest};

/// The application service orchestrating the device's resource surface.
pub struct DeviceService {
    registry: ResourceRegistry,
    assembler: BlockAssembler,
    /// In-flight outbound slice stream, keyed by the resource it serves.
    outbound: Option<(ResourcePath, OutboundSlicer)>,
    chunk_bytes: usize,
}

impl DeviceService {
    pub fn new(config: &DeviceConfig, registry: ResourceRegistry) -> Self {
        Self {
            registry,
            assembler: BlockAssembler::new(),
            outbound: None,
            chunk_bytes: config.block_chunk_bytes as usize,
        }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    // ── Decode bridge ─────────────────────────────────────────

    /// Forward a decoded barcode into the scancode resource.
    ///
    /// One decode event, one value update, one (implicit) change
    /// notification — no buffering, no deduplication.
    pub fn forward_decode(&mut self, decoded: &[u8], sink: &mut impl EventSink) {
        let path = crate::registry::objects::SCANCODE;
        if let Err(e) = self.registry.set_value(path, decoded) {
            // Only possible if the scancode resource was never built.
            warn!("decode bridge: {e}");
            return;
        }
        sink.emit(&AppEvent::DecodeForwarded {
            len: decoded.len(),
        });
    }

    /// Drain pending change notifications for observed resources.
    pub fn take_notifications(&mut self) -> Vec<(ResourcePath, Vec<u8>)> {
        self.registry.take_dirty()
    }

    // ── Server request dispatch ───────────────────────────────

    /// Interpret one server request.  Always produces a reply; failures are
    /// mapped to error replies, never panics.
    pub fn handle_request(
        &mut self,
        request: ServerRequest,
        led: &mut impl LedPort,
        timer: &impl TimerPort,
        sink: &mut impl EventSink,
    ) -> ServerReply {
        match request {
            ServerRequest::Read { path } => self.handle_read(path),
            ServerRequest::Write { path, value } => self.handle_write(path, &value, sink),
            ServerRequest::Execute { path, .. } => self.handle_execute(path, led, timer, sink),
            ServerRequest::BlockWrite {
                path,
                message,
                payload,
            } => self.handle_block_write(path, &message, &payload, sink),
            ServerRequest::BlockRead { path, number } => self.handle_block_read(path, number),
        }
    }

    fn handle_read(&mut self, path: ResourcePath) -> ServerReply {
        match self.checked(path, Operation::Read) {
            Ok(()) => ServerReply::Value {
                path,
                value: self.registry.value(path).unwrap_or(b"").to_vec(),
            },
            Err(code) => ServerReply::Error { path, code },
        }
    }

    fn handle_write(
        &mut self,
        path: ResourcePath,
        value: &[u8],
        sink: &mut impl EventSink,
    ) -> ServerReply {
        if let Err(code) = self.checked(path, Operation::Write) {
            return ServerReply::Error { path, code };
        }
        // Known path after the check above; set_value cannot fail.
        let _ = self.registry.set_value(path, value);
        sink.emit(&AppEvent::ValueWritten {
            path,
            len: value.len(),
        });
        ServerReply::Changed { path }
    }

    fn handle_execute(
        &mut self,
        path: ResourcePath,
        led: &mut impl LedPort,
        timer: &impl TimerPort,
        sink: &mut impl EventSink,
    ) -> ServerReply {
        if let Err(code) = self.checked(path, Operation::Execute) {
            return ServerReply::Error { path, code };
        }
        let hook = self.registry.get(path).and_then(|r| r.execute_hook());
        match hook {
            Some(crate::registry::ExecuteHook::BlinkLed) => {
                self.run_blink(led, timer, sink);
                ServerReply::Changed { path }
            }
            None => ServerReply::Error {
                path,
                code: ReplyCode::MethodNotAllowed,
            },
        }
    }

    fn handle_block_write(
        &mut self,
        path: ResourcePath,
        message: &crate::transfer::BlockMessage,
        payload: &[u8],
        sink: &mut impl EventSink,
    ) -> ServerReply {
        if let Err(code) = self.checked(path, Operation::Write) {
            return ServerReply::Error { path, code };
        }
        if self
            .registry
            .get(path)
            .and_then(|r| r.block_hook())
            .is_none()
        {
            return ServerReply::Error {
                path,
                code: ReplyCode::BadRequest,
            };
        }

        match self.assembler.feed(message, payload) {
            FeedOutcome::Pending => ServerReply::Changed { path },
            FeedOutcome::Complete(data) => {
                info!("block transfer complete: {} bytes → {path}", data.len());
                // Known block-capable path; set_value cannot fail.
                let _ = self.registry.set_value(path, &data);
                sink.emit(&AppEvent::TransferComplete {
                    path,
                    len: data.len(),
                });
                ServerReply::Changed { path }
            }
            FeedOutcome::Failed(reason) => {
                warn!("block transfer failed on {path}: {reason}");
                sink.emit(&AppEvent::TransferFailed { path, reason });
                ServerReply::Error {
                    path,
                    code: ReplyCode::BadRequest,
                }
            }
        }
    }

    fn handle_block_read(&mut self, path: ResourcePath, number: u32) -> ServerReply {
        if let Err(code) = self.checked(path, Operation::Read) {
            return ServerReply::Error { path, code };
        }
        if self
            .registry
            .get(path)
            .and_then(|r| r.block_hook())
            .is_none()
        {
            return ServerReply::Error {
                path,
                code: ReplyCode::BadRequest,
            };
        }

        // Block 0 snapshots the stored value and opens a new slice stream.
        if number == 0 {
            let value = self.registry.value(path).unwrap_or(b"").to_vec();
            self.outbound = Some((path, OutboundSlicer::new(value, self.chunk_bytes)));
        }

        let slicer = match &mut self.outbound {
            Some((p, slicer)) if *p == path => slicer,
            _ => {
                return ServerReply::Error {
                    path,
                    code: ReplyCode::BadRequest,
                };
            }
        };

        match slicer.chunk(number) {
            Ok((data, more)) => {
                if !more {
                    self.outbound = None;
                }
                ServerReply::Chunk {
                    path,
                    number,
                    data,
                    more,
                }
            }
            Err(e) => {
                warn!("outbound block read on {path}: {e}");
                self.outbound = None;
                ServerReply::Error {
                    path,
                    code: ReplyCode::BadRequest,
                }
            }
        }
    }

    // ── Blink execution ───────────────────────────────────────

    /// Read the pattern/color resources and run the sequence to completion.
    ///
    /// Runs synchronously on the calling thread; the sequence object owns
    /// its buffer and is dropped when the cursor reaches the end.
    fn run_blink(&mut self, led: &mut impl LedPort, timer: &impl TimerPort, sink: &mut impl EventSink) {
        let pattern = self.registry.value(LED_PATTERN).unwrap_or(b"").to_vec();
        let color = self.registry.value(LED_COLOR).unwrap_or(b"").to_vec();

        let mut sequence = BlinkSequence::from_values(&pattern, &color);
        info!(
            "blink: color={:?} steps={}",
            sequence.color(),
            sequence.len()
        );
        sink.emit(&AppEvent::BlinkRun {
            color: sequence.color(),
            steps: sequence.len(),
        });

        while let Some(step) = sequence.step() {
            led.toggle(step.mask);
            timer.sleep_ms(step.delay_ms);
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Path + access-mask check shared by every dispatch arm.
    fn checked(&self, path: ResourcePath, op: Operation) -> Result<(), ReplyCode> {
        match self.registry.get(path) {
            None => Err(ReplyCode::NotFound),
            Some(resource) if !resource.ops.allows(op) => Err(ReplyCode::MethodNotAllowed),
            Some(_) => Ok(()),
        }
    }
}

impl From<RegistryError> for ReplyCode {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::UnknownPath => Self::NotFound,
            RegistryError::MethodNotAllowed | RegistryError::NoExecuteHook => {
                Self::MethodNotAllowed
            }
            RegistryError::DuplicatePath => Self::BadRequest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blink::ChannelMask;
    use crate::registry::objects::{self, SCANCODE};
    use std::cell::Cell;

    struct NullLed;
    impl LedPort for NullLed {
        fn toggle(&mut self, _mask: ChannelMask) {}
        fn toggle_status(&mut self) {}
    }

    struct NullTimer {
        now: Cell<u64>,
    }
    impl TimerPort for NullTimer {
        fn now_ms(&self) -> u64 {
            self.now.get()
        }
        fn sleep_ms(&self, ms: u32) {
            self.now.set(self.now.get() + u64::from(ms));
        }
    }

    struct VecSink(Vec<AppEvent>);
    impl EventSink for VecSink {
        fn emit(&mut self, event: &AppEvent) {
            self.0.push(event.clone());
        }
    }

    fn service() -> DeviceService {
        let config = DeviceConfig::default();
        let registry = objects::build_registry(&config).unwrap();
        DeviceService::new(&config, registry)
    }

    #[test]
    fn decode_bridge_updates_scancode_and_notifies() {
        let mut svc = service();
        let mut sink = VecSink(Vec::new());

        svc.forward_decode(b"4006381333931", &mut sink);

        assert_eq!(svc.registry().value(SCANCODE).unwrap(), b"4006381333931");
        assert!(matches!(
            sink.0.as_slice(),
            [AppEvent::DecodeForwarded { len: 13 }]
        ));

        let notifications = svc.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].0, SCANCODE);
    }

    #[test]
    fn write_to_read_only_resource_is_rejected() {
        let mut svc = service();
        let mut led = NullLed;
        let timer = NullTimer { now: Cell::new(0) };
        let mut sink = VecSink(Vec::new());

        let reply = svc.handle_request(
            ServerRequest::Write {
                path: SCANCODE,
                value: b"spoof".to_vec(),
            },
            &mut led,
            &timer,
            &mut sink,
        );

        assert_eq!(
            reply,
            ServerReply::Error {
                path: SCANCODE,
                code: ReplyCode::MethodNotAllowed,
            }
        );
        // Value untouched.
        assert_eq!(svc.registry().value(SCANCODE).unwrap(), b"0");
    }

    #[test]
    fn execute_on_non_executable_resource_is_rejected() {
        let mut svc = service();
        let mut led = NullLed;
        let timer = NullTimer { now: Cell::new(0) };
        let mut sink = VecSink(Vec::new());

        let reply = svc.handle_request(
            ServerRequest::Execute {
                path: objects::LED_COLOR,
                args: Vec::new(),
            },
            &mut led,
            &timer,
            &mut sink,
        );

        assert_eq!(
            reply,
            ServerReply::Error {
                path: objects::LED_COLOR,
                code: ReplyCode::MethodNotAllowed,
            }
        );
    }

    #[test]
    fn unknown_path_answers_not_found() {
        let mut svc = service();
        let mut led = NullLed;
        let timer = NullTimer { now: Cell::new(0) };
        let mut sink = VecSink(Vec::new());

        let ghost = ResourcePath::new("9999", 0, "0");
        let reply = svc.handle_request(
            ServerRequest::Read { path: ghost },
            &mut led,
            &timer,
            &mut sink,
        );
        assert_eq!(
            reply,
            ServerReply::Error {
                path: ghost,
                code: ReplyCode::NotFound,
            }
        );
    }
}
