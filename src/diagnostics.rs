//! Crash logging.
//!
//! Stores up to 4 crash entries in an NVS ring buffer under the "crash"
//! namespace.  A custom panic hook writes the entry before the TWDT or
//! panic handler triggers a reset, so field units keep a trace of why they
//! rebooted even without a serial console attached.

use serde::{Deserialize, Serialize};

const CRASH_RING_SLOTS: usize = 4;
const CRASH_NAMESPACE: &str = "crash";
const CRASH_INDEX_KEY: &str = "idx";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrashEntry {
    pub uptime_secs: u64,
    pub reason: heapless::String<96>,
}

impl CrashEntry {
    pub fn new(uptime_secs: u64, reason: &str) -> Self {
        let mut r = heapless::String::new();
        let _ = r.push_str(&reason[..reason.len().min(95)]);
        Self {
            uptime_secs,
            reason: r,
        }
    }
}

/// NVS-backed ring buffer for crash entries.
#[derive(Default)]
pub struct CrashLog {
    write_index: usize,
}

impl CrashLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the write index from NVS, or default to 0.
    pub fn init(&mut self, nvs: &dyn crate::app::ports::StoragePort) {
        let mut buf = [0u8; 4];
        if let Ok(4) = nvs.read(CRASH_NAMESPACE, CRASH_INDEX_KEY, &mut buf) {
            self.write_index = u32::from_le_bytes(buf) as usize % CRASH_RING_SLOTS;
        }
    }

    /// Write a crash entry to the next ring slot and advance the index.
    pub fn write_entry(
        &mut self,
        nvs: &mut dyn crate::app::ports::StoragePort,
        entry: &CrashEntry,
    ) {
        let slot_key = Self::slot_key(self.write_index);
        if let Ok(bytes) = postcard::to_allocvec(entry) {
            let _ = nvs.write(CRASH_NAMESPACE, &slot_key, &bytes);
        }

        self.write_index = (self.write_index + 1) % CRASH_RING_SLOTS;
        let idx_bytes = (self.write_index as u32).to_le_bytes();
        let _ = nvs.write(CRASH_NAMESPACE, CRASH_INDEX_KEY, &idx_bytes);
    }

    /// Read all stored crash entries (up to 4).
    pub fn read_all(
        &self,
        nvs: &dyn crate::app::ports::StoragePort,
    ) -> heapless::Vec<CrashEntry, 4> {
        let mut entries = heapless::Vec::new();
        for i in 0..CRASH_RING_SLOTS {
            let mut buf = [0u8; 160];
            if let Ok(len) = nvs.read(CRASH_NAMESPACE, &Self::slot_key(i), &mut buf) {
                if let Ok(entry) = postcard::from_bytes::<CrashEntry>(&buf[..len]) {
                    let _ = entries.push(entry);
                }
            }
        }
        entries
    }

    /// Erase all crash entries and reset the index.
    pub fn clear(&mut self, nvs: &mut dyn crate::app::ports::StoragePort) {
        for i in 0..CRASH_RING_SLOTS {
            let _ = nvs.delete(CRASH_NAMESPACE, &Self::slot_key(i));
        }
        let _ = nvs.delete(CRASH_NAMESPACE, CRASH_INDEX_KEY);
        self.write_index = 0;
    }

    fn slot_key(index: usize) -> heapless::String<16> {
        let mut s = heapless::String::new();
        let _ = core::fmt::Write::write_fmt(&mut s, format_args!("s{}", index));
        s
    }
}

// ───────────────────────────────────────────────────────────────
// Panic hook — writes a CrashEntry to NVS before reset
// ───────────────────────────────────────────────────────────────

/// Install a panic hook that persists crash info to NVS.
///
/// Must be called once during init, after NVS is ready.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };

        log::error!("PANIC: {}", reason);

        #[cfg(target_os = "espidf")]
        {
            // SAFETY: esp_timer_get_time is safe in panic context (plain
            // counter read, no allocation).
            let uptime = (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000_000;
            let entry = CrashEntry::new(uptime, reason);

            // NVS was initialised in main(); if the panic raced init, the
            // write fails silently and only the serial log remains.
            if let Ok(mut nvs) = crate::adapters::nvs::NvsAdapter::new() {
                let mut crash_log = CrashLog::new();
                crash_log.init(&nvs);
                crash_log.write_entry(&mut nvs, &entry);
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::error!("Crash entry (simulation): {}", reason);
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::{StorageError, StoragePort};
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct MockStorage {
        data: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                data: RefCell::new(HashMap::new()),
            }
        }
    }

    impl StoragePort for MockStorage {
        fn read(&self, ns: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
            let k = format!("{ns}::{key}");
            match self.data.borrow().get(&k) {
                Some(v) => {
                    let len = v.len().min(buf.len());
                    buf[..len].copy_from_slice(&v[..len]);
                    Ok(len)
                }
                None => Err(StorageError::NotFound),
            }
        }

        fn write(&mut self, ns: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
            self.data
                .borrow_mut()
                .insert(format!("{ns}::{key}"), data.to_vec());
            Ok(())
        }

        fn delete(&mut self, ns: &str, key: &str) -> Result<(), StorageError> {
            self.data.borrow_mut().remove(&format!("{ns}::{key}"));
            Ok(())
        }

        fn exists(&self, ns: &str, key: &str) -> bool {
            self.data.borrow().contains_key(&format!("{ns}::{key}"))
        }
    }

    #[test]
    fn write_and_read_single_entry() {
        let mut nvs = MockStorage::new();
        let mut log = CrashLog::new();

        log.write_entry(&mut nvs, &CrashEntry::new(42, "test panic"));
        let entries = log.read_all(&nvs);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].uptime_secs, 42);
        assert_eq!(entries[0].reason.as_str(), "test panic");
    }

    #[test]
    fn ring_buffer_wraps() {
        let mut nvs = MockStorage::new();
        let mut log = CrashLog::new();

        for i in 0..6 {
            log.write_entry(&mut nvs, &CrashEntry::new(i as u64, &format!("crash_{i}")));
        }
        assert_eq!(log.read_all(&nvs).len(), CRASH_RING_SLOTS);
    }

    #[test]
    fn clear_erases_all() {
        let mut nvs = MockStorage::new();
        let mut log = CrashLog::new();

        log.write_entry(&mut nvs, &CrashEntry::new(1, "x"));
        log.write_entry(&mut nvs, &CrashEntry::new(2, "y"));
        log.clear(&mut nvs);

        assert_eq!(log.read_all(&nvs).len(), 0);
    }

    #[test]
    fn long_reason_is_truncated() {
        let long = "b".repeat(300);
        let entry = CrashEntry::new(0, &long);
        assert!(entry.reason.len() <= 95);
    }

    #[test]
    fn index_survives_reload() {
        let mut nvs = MockStorage::new();
        let mut log = CrashLog::new();
        log.write_entry(&mut nvs, &CrashEntry::new(1, "a"));

        let mut reloaded = CrashLog::new();
        reloaded.init(&nvs);
        reloaded.write_entry(&mut nvs, &CrashEntry::new(2, "b"));

        let entries = reloaded.read_all(&nvs);
        assert_eq!(entries.len(), 2);
    }
}
