//! Screen timeout and the light-sleep power sequence.
//!
//! Two independent paths lead to a darker device:
//!
//! - **Soft timeout**: no accepted button edge or remote write for
//!   `screen_timeout_secs`.  By default this only blanks the display; with
//!   `sleep_on_timeout` it runs the full sleep sequence instead.
//! - **Power button**: always runs the full sequence.
//!
//! ```text
//!  power-off animation ─▶ backlight off ─▶ enable wake GPIO ─▶ light sleep
//!                                                                  │ (blocks)
//!  re-arm power button ◀─ restart advertising ◀─ power-on anim ◀─ disable wake
//!  (inverted edge)
//! ```

use log::info;

use crate::app::ports::{DisplayPort, PlatformPort, RemoteLinkPort};
use crate::config::SystemConfig;
use crate::drivers::buttons::EdgePolarity;
use crate::ui::screen;
use crate::ui::writer::ScreenWriter;

/// What the soft timeout asks the service to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    /// Blank the display, keep running.
    ScreenOff,
    /// Run the full sleep sequence.
    Sleep,
}

/// Decide whether the screen should be lit given the inactivity window.
pub fn screen_should_be_on(idle_ms: u64, timeout_ms: u64) -> bool {
    idle_ms < timeout_ms
}

// ── Inactivity tracking ───────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PowerController {
    timeout_ms: u64,
    sleep_on_timeout: bool,
    last_activity_ms: u64,
    screen_on: bool,
}

impl PowerController {
    pub fn new(config: &SystemConfig, now_ms: u64) -> Self {
        Self {
            timeout_ms: config.screen_timeout_ms(),
            sleep_on_timeout: config.sleep_on_timeout,
            last_activity_ms: now_ms,
            screen_on: true,
        }
    }

    /// Restart the countdown.  Returns `true` if the screen was blanked and
    /// should now be re-lit.
    pub fn activity(&mut self, now_ms: u64) -> bool {
        self.last_activity_ms = now_ms;
        let woke = !self.screen_on;
        self.screen_on = true;
        woke
    }

    /// Check the countdown.  Fires at most once per inactivity period.
    pub fn tick(&mut self, now_ms: u64) -> Option<PowerAction> {
        if !self.screen_on {
            return None;
        }
        let idle = now_ms.saturating_sub(self.last_activity_ms);
        if screen_should_be_on(idle, self.timeout_ms) {
            return None;
        }
        self.screen_on = false;
        Some(if self.sleep_on_timeout {
            PowerAction::Sleep
        } else {
            PowerAction::ScreenOff
        })
    }

    pub fn screen_on(&self) -> bool {
        self.screen_on
    }

    /// Back from light sleep: screen lit, countdown restarted.
    pub fn on_wake(&mut self, now_ms: u64) {
        self.screen_on = true;
        self.last_activity_ms = now_ms;
    }
}

// ── Sleep sequence ────────────────────────────────────────────

/// Run the blocking sleep/wake sequence and return the edge the power
/// button was re-armed on.
///
/// `hw` is display, platform and link in one, mirroring how the firmware
/// bundles its peripherals in a single adapter.
pub fn run_sleep_cycle(
    config: &SystemConfig,
    hw: &mut (impl DisplayPort + PlatformPort + RemoteLinkPort),
    writer: &mut ScreenWriter,
    polarity: EdgePolarity,
) -> EdgePolarity {
    for frame in 0..config.animation_frames {
        writer.apply(hw, &screen::power_off_frame(frame), frame == 0);
        hw.delay_ms(config.animation_frame_ms);
    }
    hw.clear();
    hw.set_backlight(false);
    writer.invalidate();

    info!("power: entering light sleep");
    hw.enable_wake_source();
    hw.light_sleep();
    hw.disable_wake_source();
    info!("power: woke from light sleep");

    hw.set_backlight(true);
    for frame in 0..config.animation_frames {
        writer.apply(
            hw,
            &screen::power_on_frame(frame, &config.device_name),
            frame == 0,
        );
        hw.delay_ms(config.animation_frame_ms);
    }
    writer.invalidate();

    hw.restart_advertising();

    let next = polarity.flipped();
    hw.rearm_power_button(next);
    info!("power: power button re-armed on {next:?} edge");
    next
}
