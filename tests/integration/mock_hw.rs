//! Mock hardware for integration tests.
//!
//! `MockHw` emulates the 16x2 character grid (so tests can assert on what
//! is actually on the glass) and records every platform and link call.

use glucologger::app::events::AppEvent;
use glucologger::app::ports::{DisplayPort, EventSink, PlatformPort, RemoteLinkPort};
use glucologger::config::{DISPLAY_COLS, DISPLAY_ROWS};
use glucologger::drivers::buttons::EdgePolarity;

// ── Platform call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformCall {
    WakeEnabled,
    Slept,
    WakeDisabled,
    Rearmed(EdgePolarity),
    AdvertisingRestarted,
}

// ── MockHw ────────────────────────────────────────────────────

pub struct MockHw {
    grid: [[u8; DISPLAY_COLS]; DISPLAY_ROWS],
    cursor: (usize, usize),
    pub backlight: bool,
    pub clears: usize,
    pub chars_written: usize,
    pub now_ms: u64,
    /// How long a light sleep lasts before the wake GPIO fires.
    pub sleep_ms: u64,
    pub calls: Vec<PlatformCall>,
}

#[allow(dead_code)]
impl MockHw {
    pub fn new() -> Self {
        Self {
            grid: [[b' '; DISPLAY_COLS]; DISPLAY_ROWS],
            cursor: (0, 0),
            backlight: false,
            clears: 0,
            chars_written: 0,
            now_ms: 0,
            sleep_ms: 60_000,
            calls: Vec::new(),
        }
    }

    /// One row of the grid, trailing spaces trimmed.
    pub fn line(&self, row: usize) -> String {
        String::from_utf8_lossy(&self.grid[row]).trim_end().to_string()
    }

    pub fn sleeps(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == PlatformCall::Slept)
            .count()
    }

    pub fn last_rearm(&self) -> Option<EdgePolarity> {
        self.calls.iter().rev().find_map(|c| match c {
            PlatformCall::Rearmed(p) => Some(*p),
            _ => None,
        })
    }
}

impl Default for MockHw {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for MockHw {
    fn clear(&mut self) {
        self.grid = [[b' '; DISPLAY_COLS]; DISPLAY_ROWS];
        self.cursor = (0, 0);
        self.clears += 1;
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.cursor = (
            usize::from(col).min(DISPLAY_COLS - 1),
            usize::from(row).min(DISPLAY_ROWS - 1),
        );
    }

    fn print(&mut self, text: &str) {
        for b in text.bytes() {
            let (col, row) = self.cursor;
            if col < DISPLAY_COLS {
                self.grid[row][col] = b;
                self.cursor.0 += 1;
                self.chars_written += 1;
            }
        }
    }

    fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
    }
}

impl PlatformPort for MockHw {
    fn uptime_ms(&self) -> u64 {
        self.now_ms
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now_ms += u64::from(ms);
    }

    fn enable_wake_source(&mut self) {
        self.calls.push(PlatformCall::WakeEnabled);
    }

    fn disable_wake_source(&mut self) {
        self.calls.push(PlatformCall::WakeDisabled);
    }

    fn light_sleep(&mut self) {
        self.calls.push(PlatformCall::Slept);
        self.now_ms += self.sleep_ms;
    }

    fn rearm_power_button(&mut self, polarity: EdgePolarity) {
        self.calls.push(PlatformCall::Rearmed(polarity));
    }
}

impl RemoteLinkPort for MockHw {
    fn restart_advertising(&mut self) {
        self.calls.push(PlatformCall::AdvertisingRestarted);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
