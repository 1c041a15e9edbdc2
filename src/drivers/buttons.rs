//! ISR-side button debouncer for the five front-panel buttons.
//!
//! ## Hardware
//!
//! Menu, up, down and select are active-low momentary switches on the
//! internal pull-up and fire on the falling edge.  Power sits on the
//! internal pull-down and fires on the rising edge; after every sleep/wake
//! cycle its edge type is inverted so that one physical press sleeps and the
//! next one wakes.
//!
//! ## Debounce
//!
//! Each GPIO ISR calls [`button_isr_handler`] with the current uptime.  An
//! edge is accepted only when at least the debounce window (200 ms by
//! default) has passed since the last *accepted* edge on the same button.
//! Accepted edges are pushed onto the global event queue; rejected edges are
//! dropped silently.
//!
//! | Button | Pull      | Edge                   | After firing     |
//! |--------|-----------|------------------------|------------------|
//! | Menu   | up        | falling                | stays armed      |
//! | Up     | up        | falling                | stays armed      |
//! | Down   | up        | falling                | stays armed      |
//! | Select | up        | falling                | stays armed      |
//! | Power  | down      | rising, then alternates| disarmed (1-shot)|
//!
//! Every field is a single-word atomic so an ISR can preempt the main loop
//! anywhere without observing a torn update.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use crate::events::{EVENTS, Event, EventQueue};

/// Default debounce window; overridden from `SystemConfig` at boot.
pub const DEFAULT_DEBOUNCE_MS: u32 = 200;

const BUTTON_COUNT: usize = 5;

/// Logical front-panel buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Menu,
    Up,
    Down,
    Select,
    Power,
}

impl Button {
    pub const ALL: [Self; BUTTON_COUNT] =
        [Self::Menu, Self::Up, Self::Down, Self::Select, Self::Power];

    pub const fn index(self) -> usize {
        match self {
            Self::Menu => 0,
            Self::Up => 1,
            Self::Down => 2,
            Self::Select => 3,
            Self::Power => 4,
        }
    }

    pub const fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Self::Menu),
            1 => Some(Self::Up),
            2 => Some(Self::Down),
            3 => Some(Self::Select),
            4 => Some(Self::Power),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Up => "up",
            Self::Down => "down",
            Self::Select => "select",
            Self::Power => "power",
        }
    }
}

/// Edge type the power button's interrupt is armed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgePolarity {
    Rising,
    Falling,
}

impl EdgePolarity {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Rising => Self::Falling,
            Self::Falling => Self::Rising,
        }
    }

    const fn to_raw(self) -> u8 {
        match self {
            Self::Rising => 0,
            Self::Falling => 1,
        }
    }

    const fn from_raw(raw: u8) -> Self {
        if raw == 0 { Self::Rising } else { Self::Falling }
    }
}

// ── Debouncer ─────────────────────────────────────────────────

/// Per-button debounce state plus the power button's arm flag.
pub struct Debouncer {
    window_ms: AtomicU32,
    /// Uptime of the last accepted edge, per button.
    last_accepted: [AtomicU32; BUTTON_COUNT],
    /// Bit `i` set once button `i` has accepted any edge.
    seen: AtomicU8,
    power_armed: AtomicBool,
    power_polarity: AtomicU8,
}

/// Debouncer shared by the GPIO ISRs.
pub static DEBOUNCER: Debouncer = Debouncer::new(DEFAULT_DEBOUNCE_MS);

impl Debouncer {
    pub const fn new(window_ms: u32) -> Self {
        Self {
            window_ms: AtomicU32::new(window_ms),
            last_accepted: [const { AtomicU32::new(0) }; BUTTON_COUNT],
            seen: AtomicU8::new(0),
            power_armed: AtomicBool::new(true),
            power_polarity: AtomicU8::new(EdgePolarity::Rising.to_raw()),
        }
    }

    pub fn set_window_ms(&self, window_ms: u32) {
        self.window_ms.store(window_ms, Ordering::Relaxed);
    }

    pub fn window_ms(&self) -> u32 {
        self.window_ms.load(Ordering::Relaxed)
    }

    /// Feed one raw edge.  Returns the button when the edge is accepted.
    ///
    /// Safe to call from interrupt context.
    pub fn on_edge(&self, button: Button, now_ms: u32) -> Option<Button> {
        if button == Button::Power && !self.power_armed.load(Ordering::Acquire) {
            return None;
        }

        let idx = button.index();
        let bit = 1u8 << idx;
        if self.seen.load(Ordering::Acquire) & bit != 0 {
            let last = self.last_accepted[idx].load(Ordering::Relaxed);
            if now_ms.wrapping_sub(last) < self.window_ms() {
                return None;
            }
        }

        self.last_accepted[idx].store(now_ms, Ordering::Relaxed);
        self.seen.fetch_or(bit, Ordering::Release);

        if button == Button::Power {
            // One-shot: the power controller re-arms after wake.
            self.power_armed.store(false, Ordering::Release);
        }
        Some(button)
    }

    pub fn power_armed(&self) -> bool {
        self.power_armed.load(Ordering::Acquire)
    }

    pub fn power_polarity(&self) -> EdgePolarity {
        EdgePolarity::from_raw(self.power_polarity.load(Ordering::Relaxed))
    }

    /// Re-enable the power button with a new edge type.
    pub fn rearm_power(&self, polarity: EdgePolarity) {
        self.power_polarity.store(polarity.to_raw(), Ordering::Relaxed);
        self.power_armed.store(true, Ordering::Release);
    }

    /// Re-arm after wake and open a fresh debounce window at `now_ms`, so
    /// the release of the press that woke the chip is swallowed.
    pub fn rearm_power_at(&self, polarity: EdgePolarity, now_ms: u32) {
        let idx = Button::Power.index();
        self.last_accepted[idx].store(now_ms, Ordering::Relaxed);
        self.seen.fetch_or(1 << idx, Ordering::Release);
        self.rearm_power(polarity);
    }

    /// Forget all history (first boot).
    pub fn reset(&self) {
        self.seen.store(0, Ordering::Release);
        self.rearm_power(EdgePolarity::Rising);
    }
}

/// ISR entry point: debounce and forward accepted presses to the queue.
/// Lock-free; never blocks.
pub fn button_isr_handler(button: Button, now_ms: u32) {
    dispatch_edge(&DEBOUNCER, &EVENTS, button, now_ms);
}

/// Debounce one edge and queue the press.  A press the queue cannot take
/// is dropped; a dropped power press leaves the button armed.
pub fn dispatch_edge(debouncer: &Debouncer, queue: &EventQueue, button: Button, now_ms: u32) {
    let Some(b) = debouncer.on_edge(button, now_ms) else {
        return;
    };
    if !queue.push(Event::Button(b)) && b == Button::Power {
        debouncer.rearm_power(debouncer.power_polarity());
    }
}
