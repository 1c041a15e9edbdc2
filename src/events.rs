//! Interrupt-driven event system.
//!
//! Events are produced by:
//! - GPIO ISRs (debounced button presses)
//! - The BLE GATT write callback (a remote write landed in the mailbox)
//!
//! Events are consumed by the main loop, which drains them once per tick
//! and acts on each in FIFO order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Button ISR  │────▶│  Event Queue │────▶│  Main Loop   │
//! │ GATT write  │────▶│  (lock-free) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicUsize, Ordering};

use heapless::mpmc::Q16;

use crate::drivers::buttons::Button;

/// Maximum number of pending events.
const EVENT_QUEUE_CAP: usize = 16;

/// Events handed from interrupt context to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A debounced, accepted button press.
    Button(Button),
    /// A remote write is waiting in the BLE mailbox.
    RemoteWrite,
}

// ── Lock-free MPMC queue ──────────────────────────────────────
//
// GPIO ISRs, the Bluedroid task and the main loop all produce; only the
// main loop consumes.  Slot claims go through compare-and-swap, so an
// interrupt that preempts another producer mid-push cannot land in the
// same slot.

/// Multi-producer event queue.
pub struct EventQueue {
    queue: Q16<Event>,
    /// Incremented before an enqueue, decremented after a dequeue; never
    /// under-counts.
    pending: AtomicUsize,
}

/// The queue shared by the ISRs, the GATT callback and the main loop.
pub static EVENTS: EventQueue = EventQueue::new();

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            queue: Q16::new(),
            pending: AtomicUsize::new(0),
        }
    }

    /// Push an event into the queue.
    /// Safe to call from ISR context (lock-free, never blocks).
    /// Returns `false` if the queue is full (event dropped).
    pub fn push(&self, event: Event) -> bool {
        self.pending.fetch_add(1, Ordering::AcqRel);
        if self.queue.enqueue(event).is_ok() {
            true
        } else {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            false
        }
    }

    /// Pop the next event.  Called from the main loop.
    pub fn pop(&self) -> Option<Event> {
        let event = self.queue.dequeue()?;
        self.pending.fetch_sub(1, Ordering::AcqRel);
        Some(event)
    }

    /// Drop everything pending.
    pub fn clear(&self) {
        while self.pop().is_some() {}
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of pending events.  May briefly include a push in flight.
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

/// Push onto the global queue.
pub fn push_event(event: Event) -> bool {
    EVENTS.push(event)
}
