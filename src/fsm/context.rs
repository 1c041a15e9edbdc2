//! Shared mutable context threaded through every UI state handler.
//!
//! `UiContext` is the blackboard the handlers read from and write to: the
//! reading history, the software clock, the menu layout chosen at boot and
//! the cross-cutting invalid-data flag.  Handlers also leave a single
//! [`Outcome`] here so the application service can report what happened.

use crate::clock::{SoftwareClock, Timestamp};
use crate::config::SystemConfig;
use crate::error::InputError;
use crate::history::{HistoryStore, Reading};

// ---------------------------------------------------------------------------
// Menu layout
// ---------------------------------------------------------------------------

/// Entries of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    ViewData,
    SetTime,
    ClearData,
    Back,
}

impl MenuItem {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ViewData => "View Data",
            Self::SetTime => "Set Time",
            Self::ClearData => "Clear Data",
            Self::Back => "Back",
        }
    }
}

/// Four-item menu.
pub const FULL_MENU: [MenuItem; 4] = [
    MenuItem::ViewData,
    MenuItem::SetTime,
    MenuItem::ClearData,
    MenuItem::Back,
];

/// Three-item menu for builds without "Clear Data".
pub const SHORT_MENU: [MenuItem; 3] = [MenuItem::ViewData, MenuItem::SetTime, MenuItem::Back];

// ---------------------------------------------------------------------------
// Handler outcomes
// ---------------------------------------------------------------------------

/// Side effect of the last handled input, picked up by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Recorded { reading: Reading, stamp: Timestamp },
    Rejected(InputError),
    ClockSet { hours: u8, minutes: u8 },
    Cleared,
}

// ---------------------------------------------------------------------------
// UiContext
// ---------------------------------------------------------------------------

pub struct UiContext {
    pub history: HistoryStore,
    pub clock: SoftwareClock,
    /// Wall time (uptime seconds) of the input being handled.
    pub now_secs: u64,
    pub menu_items: &'static [MenuItem],
    /// A rejected write is waiting to be shown on the Home screen.
    pub invalid_pending: bool,
    pub outcome: Option<Outcome>,
}

impl UiContext {
    pub fn new(config: &SystemConfig, now_secs: u64) -> Self {
        let menu_items: &'static [MenuItem] = if config.menu_clear_data {
            &FULL_MENU
        } else {
            &SHORT_MENU
        };
        Self {
            history: HistoryStore::new(),
            clock: SoftwareClock::new(now_secs),
            now_secs,
            menu_items,
            invalid_pending: false,
            outcome: None,
        }
    }

    /// Store a reading stamped with the current clock time.
    pub fn record_reading(&mut self, payload: &[u8]) {
        self.clock.tick(self.now_secs);
        let stamp = self.clock.reading().timestamp();
        match self.history.record(payload, stamp) {
            Ok(()) => {
                let reading = self
                    .history
                    .most_recent()
                    .map(|e| e.reading.clone())
                    .unwrap_or_default();
                self.outcome = Some(Outcome::Recorded { reading, stamp });
            }
            Err(e) => self.reject(e),
        }
    }

    /// Apply an `HH:MM` write to the clock.
    pub fn set_time(&mut self, payload: &[u8]) {
        match self.clock.set_offset(payload, self.now_secs) {
            Ok(()) => {
                let r = self.clock.reading();
                self.outcome = Some(Outcome::ClockSet {
                    hours: r.hours,
                    minutes: r.minutes,
                });
            }
            Err(e) => self.reject(e),
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.outcome = Some(Outcome::Cleared);
    }

    pub fn take_outcome(&mut self) -> Option<Outcome> {
        self.outcome.take()
    }

    fn reject(&mut self, e: InputError) {
        self.invalid_pending = true;
        self.outcome = Some(Outcome::Rejected(e));
    }
}
