//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements        | Connects to                     |
//! |--------------|-------------------|---------------------------------|
//! | `hardware`   | LedPort           | ESP32 GPIO (blink + status LED) |
//! | `log_sink`   | EventSink         | Serial log output               |
//! | `nvs`        | ConfigPort        | NVS / in-memory store           |
//! |              | StoragePort       |                                 |
//! | `recognizer` | DecoderPort       | vendor barcode engine (C ABI)   |
//! | `registrar`  | RegistrarPort     | managed connector (loopback)    |
//! | `time`       | TimerPort         | ESP32 system timer              |
//! | `wifi`       | ConnectivityPort  | ESP-IDF WiFi STA                |

pub mod device_id;
pub mod entropy;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod recognizer;
pub mod registrar;
pub mod time;
pub mod wifi;
