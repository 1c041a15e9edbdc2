//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the display, the sleep/timing platform and the BLE link, exposing
//! them through [`DisplayPort`], [`PlatformPort`] and [`RemoteLinkPort`] as
//! one value so the power sequence can drive all three in order.

use crate::adapters::ble::BleAdapter;
use crate::adapters::platform::EspPlatform;
use crate::app::ports::{DisplayPort, PlatformPort, RemoteLinkPort};
use crate::drivers::buttons::EdgePolarity;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<D> {
    display: D,
    platform: EspPlatform,
    link: BleAdapter,
}

impl<D: DisplayPort> HardwareAdapter<D> {
    pub fn new(display: D, platform: EspPlatform, link: BleAdapter) -> Self {
        Self {
            display,
            platform,
            link,
        }
    }

    pub fn platform(&self) -> &EspPlatform {
        &self.platform
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<D: DisplayPort> DisplayPort for HardwareAdapter<D> {
    fn clear(&mut self) {
        self.display.clear();
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.display.set_cursor(col, row);
    }

    fn print(&mut self, text: &str) {
        self.display.print(text);
    }

    fn set_backlight(&mut self, on: bool) {
        self.display.set_backlight(on);
    }
}

// ── PlatformPort implementation ───────────────────────────────

impl<D> PlatformPort for HardwareAdapter<D> {
    fn uptime_ms(&self) -> u64 {
        self.platform.uptime_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.platform.delay_ms(ms);
    }

    fn enable_wake_source(&mut self) {
        self.platform.enable_wake_source();
    }

    fn disable_wake_source(&mut self) {
        self.platform.disable_wake_source();
    }

    fn light_sleep(&mut self) {
        self.platform.light_sleep();
    }

    fn rearm_power_button(&mut self, polarity: EdgePolarity) {
        self.platform.rearm_power_button(polarity);
    }
}

// ── RemoteLinkPort implementation ─────────────────────────────

impl<D> RemoteLinkPort for HardwareAdapter<D> {
    fn restart_advertising(&mut self) {
        self.link.restart_advertising();
    }
}
