//! System configuration parameters
//!
//! All tunable parameters for the ScanLink client.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

/// Core device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- Device management server ---
    /// Registration server URI (CoAP endpoint of the management service).
    pub server_uri: heapless::String<96>,
    /// Registration lease lifetime requested at handshake (seconds).
    pub lifetime_secs: u32,

    // --- Network ---
    /// WiFi station SSID.
    pub wifi_ssid: heapless::String<32>,
    /// WiFi station password (empty = open network).
    pub wifi_password: heapless::String<64>,

    // --- Control loop timing ---
    /// Keep-alive threshold: an update-registration is sent when no decode
    /// event has arrived for this long (seconds).
    pub keepalive_secs: u32,
    /// Fixed delay between control-loop iterations (milliseconds).
    pub loop_delay_ms: u32,
    /// Status indicator toggle period (milliseconds).
    pub status_tick_ms: u32,

    // --- Block transfer ---
    /// Outbound block transfer chunk size (bytes).
    pub block_chunk_bytes: u16,

    // --- Blink resource defaults ---
    /// Initial value of the LED color resource.
    pub initial_color: heapless::String<16>,
    /// Initial value of the LED pattern resource.
    pub initial_pattern: heapless::String<64>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let mut server_uri = heapless::String::new();
        let _ = server_uri.push_str("coaps://api.connector.scanlink.io:5684");
        let mut initial_color = heapless::String::new();
        let _ = initial_color.push_str("red");
        let mut initial_pattern = heapless::String::new();
        // toggle every 500ms, 7 steps in total
        let _ = initial_pattern.push_str("500:500:500:500:500:500:500");

        Self {
            server_uri,
            lifetime_secs: 3600,

            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),

            keepalive_secs: 25,
            loop_delay_ms: 5,
            status_tick_ms: 250,

            block_chunk_bytes: 1024,

            initial_color,
            initial_pattern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = DeviceConfig::default();
        assert!(!c.server_uri.is_empty());
        assert!(c.keepalive_secs > 0);
        assert!(c.loop_delay_ms > 0);
        assert!(c.status_tick_ms > 0);
        assert!(c.block_chunk_bytes > 0);
        assert!(!c.initial_color.is_empty());
        assert!(!c.initial_pattern.is_empty());
    }

    #[test]
    fn serde_roundtrip() {
        let c = DeviceConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: DeviceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.server_uri, c2.server_uri);
        assert_eq!(c.keepalive_secs, c2.keepalive_secs);
        assert_eq!(c.initial_pattern, c2.initial_pattern);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = DeviceConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: DeviceConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.block_chunk_bytes, c2.block_chunk_bytes);
        assert_eq!(c.initial_color, c2.initial_color);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = DeviceConfig::default();
        assert!(
            c.loop_delay_ms < c.status_tick_ms,
            "loop delay must be finer than the status tick"
        );
        assert!(
            c.status_tick_ms < c.keepalive_secs * 1000,
            "status tick must be finer than the keep-alive threshold"
        );
        assert!(
            c.keepalive_secs < c.lifetime_secs,
            "keep-alive must fire well inside the registration lease"
        );
    }
}
