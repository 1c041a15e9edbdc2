//! System configuration parameters
//!
//! All tunable parameters for the Glucologger. Nothing here is persisted:
//! the device boots with [`SystemConfig::default()`] every time.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Number of readings kept in the rolling history.
pub const MAX_DATA: usize = 5;

/// Longest accepted reading, in characters.
pub const MAX_DATA_LEN: usize = 5;

/// Character display geometry (HD44780 16x2).
pub const DISPLAY_COLS: usize = 16;
pub const DISPLAY_ROWS: usize = 2;

/// One simulated day; the software clock wraps here.
pub const SECS_PER_DAY: u32 = 86_400;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Input ---
    /// Minimum spacing between accepted edges of the same button (ms)
    pub debounce_ms: u32,

    // --- Power ---
    /// Inactivity before the screen times out (seconds)
    pub screen_timeout_secs: u32,
    /// When set, the screen timeout runs the full sleep sequence instead
    /// of only blanking the display
    pub sleep_on_timeout: bool,

    // --- UI ---
    /// How long the "Invalid Data" banner stays up (ms)
    pub invalid_banner_ms: u32,
    /// Main loop period (ms)
    pub loop_interval_ms: u32,
    /// Frames in the power-off / power-on animations
    pub animation_frames: u8,
    /// Delay between animation frames (ms)
    pub animation_frame_ms: u32,
    /// Include "Clear Data" in the menu (4 items instead of 3)
    pub menu_clear_data: bool,

    // --- Remote link ---
    /// Advertised BLE device name
    pub device_name: heapless::String<24>,
    /// Initial read value of the reading characteristic
    pub unit_label: heapless::String<32>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Input
            debounce_ms: 200,

            // Power
            screen_timeout_secs: 30,
            sleep_on_timeout: false,

            // UI
            invalid_banner_ms: 2_000,
            loop_interval_ms: 250,
            animation_frames: 3,
            animation_frame_ms: 300,
            menu_clear_data: true,

            // Remote link
            device_name: heapless::String::try_from("Glucometer").unwrap_or_default(),
            unit_label: heapless::String::try_from("Milligrams per deciliter (mg/dL)")
                .unwrap_or_default(),
        }
    }
}

impl SystemConfig {
    /// Reject values that would leave the UI unusable.
    pub fn validate(&self) -> Result<(), Error> {
        if self.debounce_ms == 0 {
            return Err(Error::Config("debounce_ms must be non-zero"));
        }
        if self.loop_interval_ms == 0 {
            return Err(Error::Config("loop_interval_ms must be non-zero"));
        }
        if self.screen_timeout_secs.saturating_mul(1000) < self.loop_interval_ms {
            return Err(Error::Config("screen timeout shorter than one loop tick"));
        }
        if self.device_name.is_empty() {
            return Err(Error::Config("device_name must not be empty"));
        }
        Ok(())
    }

    /// Screen timeout in milliseconds.
    pub fn screen_timeout_ms(&self) -> u64 {
        u64::from(self.screen_timeout_secs) * 1000
    }
}
