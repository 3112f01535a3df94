//! Recognition engine adapter.
//!
//! Implements [`DecoderPort`] over the vendor barcode engine, which owns
//! the camera capture + decode pipeline and is linked in as an ESP-IDF
//! extra component exporting a tiny C ABI:
//!
//! ```text
//! void scanlink_decoder_init(void (*sink)(const uint8_t *data, int32_t len));
//! int  scanlink_decoder_poll(void);   // 0 = fresh decode delivered to sink
//! ```
//!
//! `poll` runs one capture/decode cycle synchronously on the calling
//! thread; the sink callback fires inside that call, so the decode slot
//! needs no locking — single-threaded hand-off on the main loop.
//!
//! On host targets the adapter is a scripted queue: tests and the
//! simulator push decode events with [`RecognizerAdapter::push_decode`].

use crate::app::ports::DecoderPort;
use crate::error::Error;

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

// ── Device target ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" {
    fn scanlink_decoder_init(sink: Option<unsafe extern "C" fn(*const u8, i32)>);
    fn scanlink_decoder_poll() -> i32;
}

/// Latest decode delivered by the engine's sink callback.
///
/// SAFETY: written only inside `scanlink_decoder_poll()` (the sink fires
/// synchronously within that call) and read immediately after, both on the
/// main-loop thread.  No concurrent access is possible.
#[cfg(target_os = "espidf")]
static mut DECODE_SLOT: Option<Vec<u8>> = None;

#[cfg(target_os = "espidf")]
unsafe extern "C" fn decode_sink(data: *const u8, len: i32) {
    if data.is_null() || len <= 0 {
        return;
    }
    // SAFETY: the engine guarantees `data[..len]` is valid for the duration
    // of this call; DECODE_SLOT access is single-threaded (see above).
    unsafe {
        let bytes = core::slice::from_raw_parts(data, len as usize);
        let prev = core::ptr::replace(&raw mut DECODE_SLOT, Some(bytes.to_vec()));
        drop(prev);
    }
}

#[cfg(target_os = "espidf")]
pub struct RecognizerAdapter {
    initialized: bool,
}

#[cfg(target_os = "espidf")]
impl RecognizerAdapter {
    pub fn new() -> Self {
        Self { initialized: false }
    }
}

#[cfg(target_os = "espidf")]
impl DecoderPort for RecognizerAdapter {
    fn init(&mut self) -> Result<(), Error> {
        // SAFETY: single init call from the main task before the loop.
        unsafe {
            scanlink_decoder_init(Some(decode_sink));
        }
        self.initialized = true;
        log::info!("recognizer: engine initialised");
        Ok(())
    }

    fn poll(&mut self) -> Option<Vec<u8>> {
        if !self.initialized {
            return None;
        }
        // SAFETY: poll + slot take happen back-to-back on the loop thread;
        // the raw-pointer replace avoids a reference to the mutable static.
        unsafe {
            if scanlink_decoder_poll() == 0 {
                core::ptr::replace(&raw mut DECODE_SLOT, None)
            } else {
                None
            }
        }
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct RecognizerAdapter {
    script: VecDeque<Vec<u8>>,
}

#[cfg(not(target_os = "espidf"))]
impl RecognizerAdapter {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
        }
    }

    /// Queue a simulated decode event.
    pub fn push_decode(&mut self, decoded: &[u8]) {
        self.script.push_back(decoded.to_vec());
    }
}

#[cfg(not(target_os = "espidf"))]
impl DecoderPort for RecognizerAdapter {
    fn init(&mut self) -> Result<(), Error> {
        log::info!("recognizer(sim): scripted decode queue");
        Ok(())
    }

    fn poll(&mut self) -> Option<Vec<u8>> {
        self.script.pop_front()
    }
}

impl Default for RecognizerAdapter {
    fn default() -> Self {
        Self::new()
    }
}
