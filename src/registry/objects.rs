//! Object builders — the fixed resource surface of a ScanLink device.
//!
//! | Object | Resource | Name     | Ops     | Notes                         |
//! |--------|----------|----------|---------|-------------------------------|
//! | `3201` | `5855`   | Color    | GET+PUT | blink color token             |
//! | `3201` | `5853`   | Pattern  | GET+PUT | colon-delimited durations     |
//! | `3201` | `5850`   | Blink    | POST    | execute → run blink sequence  |
//! | `3202` | `5700`   | Scancode | GET     | observable, decode bridge     |
//! | `1000` | `1`      | BigData  | GET+PUT | observable, block transfer    |
//!
//! Object `3201` is the LWM2M "digital output" metadata tag, `3202` the
//! "send string" tag; `1000` is a private object for oversized payloads.

use crate::config::DeviceConfig;
use crate::error::Result;

use super::resource::{
    BlockHook, ExecuteHook, Operations, Resource, ResourcePath, SemanticType,
};
use super::ResourceRegistry;

// ── Well-known paths ──────────────────────────────────────────

pub const LED_COLOR: ResourcePath = ResourcePath::new("3201", 0, "5855");
pub const LED_PATTERN: ResourcePath = ResourcePath::new("3201", 0, "5853");
pub const LED_BLINK: ResourcePath = ResourcePath::new("3201", 0, "5850");
pub const SCANCODE: ResourcePath = ResourcePath::new("3202", 0, "5700");
pub const BIG_PAYLOAD: ResourcePath = ResourcePath::new("1000", 0, "1");

/// Build the full resource registry for one device.
///
/// Called once at startup; initial values come from [`DeviceConfig`] so a
/// provisioned device can boot with its last-configured color/pattern.
pub fn build_registry(config: &DeviceConfig) -> Result<ResourceRegistry> {
    let mut registry = ResourceRegistry::new();

    // LED object: color + pattern properties and the blink action.
    registry.insert(
        Resource::new(LED_COLOR, "Color", SemanticType::Str, Operations::GET_PUT, false)
            .with_value(config.initial_color.as_bytes()),
    )?;
    registry.insert(
        Resource::new(LED_PATTERN, "Pattern", SemanticType::Str, Operations::GET_PUT, false)
            .with_value(config.initial_pattern.as_bytes()),
    )?;
    registry.insert(
        Resource::new(LED_BLINK, "Blink", SemanticType::Opaque, Operations::POST, false)
            .with_execute_hook(ExecuteHook::BlinkLed),
    )?;

    // Scancode object: the decode bridge writes here, the server observes.
    registry.insert(
        Resource::new(SCANCODE, "Scancode", SemanticType::Str, Operations::GET, true)
            .with_value(b"0"),
    )?;

    // Big payload object: oversized values move as block transfers.
    registry.insert(
        Resource::new(BIG_PAYLOAD, "BigData", SemanticType::Str, Operations::GET_PUT, true)
            .with_value(b"0")
            .with_block_hook(BlockHook::PayloadStore),
    )?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::resource::Operation;

    #[test]
    fn registry_has_full_surface() {
        let reg = build_registry(&DeviceConfig::default()).unwrap();
        assert_eq!(reg.len(), 5);
        for path in [LED_COLOR, LED_PATTERN, LED_BLINK, SCANCODE, BIG_PAYLOAD] {
            assert!(reg.get(path).is_some(), "missing {path}");
        }
    }

    #[test]
    fn initial_values_come_from_config() {
        let reg = build_registry(&DeviceConfig::default()).unwrap();
        assert_eq!(reg.value(LED_COLOR).unwrap(), b"red");
        assert_eq!(
            reg.value(LED_PATTERN).unwrap(),
            b"500:500:500:500:500:500:500"
        );
        assert_eq!(reg.value(SCANCODE).unwrap(), b"0");
        assert_eq!(reg.value(BIG_PAYLOAD).unwrap(), b"0");
    }

    #[test]
    fn access_masks_match_object_model() {
        let reg = build_registry(&DeviceConfig::default()).unwrap();

        let blink = reg.get(LED_BLINK).unwrap();
        assert!(blink.ops.allows(Operation::Execute));
        assert!(!blink.ops.allows(Operation::Read));
        assert!(blink.execute_hook().is_some());

        let scancode = reg.get(SCANCODE).unwrap();
        assert!(scancode.ops.allows(Operation::Read));
        assert!(!scancode.ops.allows(Operation::Write));
        assert!(scancode.observable);

        let payload = reg.get(BIG_PAYLOAD).unwrap();
        assert!(payload.ops.allows(Operation::Write));
        assert!(payload.block_hook().is_some());
    }
}
