//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements      | Connects to                  |
//! |------------|-----------------|------------------------------|
//! | `ble`      | RemoteLinkPort  | Bluedroid GATT server        |
//! | `hardware` | DisplayPort     | all of the below, bundled    |
//! |            | PlatformPort    |                              |
//! |            | RemoteLinkPort  |                              |
//! | `lcd`      | DisplayPort     | HD44780 via PCF8574 over I²C |
//! | `log_sink` | EventSink       | Serial log output            |
//! | `platform` | PlatformPort    | ESP32 light sleep, FreeRTOS  |
//! | `time`     | (none)          | ESP32 system timer           |

pub mod ble;
pub mod hardware;
pub mod lcd;
pub mod log_sink;
pub mod platform;
pub mod time;
