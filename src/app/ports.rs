//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (display, platform sleep, remote link, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every path is testable with mocks.

use crate::drivers::buttons::EdgePolarity;

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → character LCD)
// ───────────────────────────────────────────────────────────────

/// A character grid addressable by (column, row).
pub trait DisplayPort {
    /// Blank every cell and home the cursor.
    fn clear(&mut self);

    /// Move the write position.  Out-of-range positions are clamped by
    /// the adapter.
    fn set_cursor(&mut self, col: u8, row: u8);

    /// Write ASCII text at the cursor, advancing it.
    fn print(&mut self, text: &str);

    fn set_backlight(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Platform port (driven adapter: domain → sleep / timing primitives)
// ───────────────────────────────────────────────────────────────

/// Blocking platform primitives used by the power sequence.
///
/// None of these are expected to fail; adapters log and carry on.
pub trait PlatformPort {
    /// Monotonic milliseconds since boot.
    fn uptime_ms(&self) -> u64;

    /// Block for `ms` milliseconds (animation pacing).
    fn delay_ms(&mut self, ms: u32);

    /// Arm the wake GPIO (high level).
    fn enable_wake_source(&mut self);

    /// Disarm the wake GPIO after waking.
    fn disable_wake_source(&mut self);

    /// Enter light sleep and block until the wake source fires.
    fn light_sleep(&mut self);

    /// Re-enable the power button's interrupt on the given edge.
    fn rearm_power_button(&mut self, polarity: EdgePolarity);
}

// ───────────────────────────────────────────────────────────────
// Remote link port (driven adapter: domain → wireless stack)
// ───────────────────────────────────────────────────────────────

pub trait RemoteLinkPort {
    /// Bring advertising back up after a sleep cycle.
    fn restart_advertising(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
