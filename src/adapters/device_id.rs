//! Device identity derived from the ESP32 factory MAC address.
//!
//! Produces a stable, human-readable serial in the form `SL-XXYYZZ`
//! (last 3 bytes of the 6-byte MAC in uppercase hex).  The lowercase
//! `scanlink-xxyyzz` form is the registration endpoint name the
//! management server addresses this device by.

/// Fixed-size serial string: "SL-XXYYZZ".
pub type SerialString = heapless::String<16>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0x3C, 0x61, 0x05, 0x12, 0xAB, 0x42]
}

/// Derive the serial number from the last 3 MAC bytes.
pub fn serial(mac: &MacAddress) -> SerialString {
    let mut id = SerialString::new();
    use core::fmt::Write;
    let _ = write!(id, "SL-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}

/// Derive the registration endpoint name from the last 3 MAC bytes.
pub fn endpoint_name(mac: &MacAddress) -> heapless::String<24> {
    let mut name = heapless::String::<24>::new();
    use core::fmt::Write;
    let _ = write!(name, "scanlink-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_format() {
        let mac = [0x00, 0x11, 0x22, 0xAA, 0xBB, 0xCC];
        assert_eq!(serial(&mac).as_str(), "SL-AABBCC");
    }

    #[test]
    fn endpoint_name_format() {
        let mac = [0x00, 0x11, 0x22, 0xAA, 0xBB, 0xCC];
        assert_eq!(endpoint_name(&mac).as_str(), "scanlink-aabbcc");
    }

    #[test]
    fn sim_mac_deterministic() {
        assert_eq!(read_mac(), read_mac());
    }
}
