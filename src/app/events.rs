//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; on the device they become log lines.

use crate::clock::Timestamp;
use crate::error::InputError;
use crate::fsm::StateId;
use crate::history::Reading;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries the initial state).
    Started(StateId),

    /// The UI moved between states.
    ModeChanged { from: StateId, to: StateId },

    /// A remote write was stored in the history.
    ReadingRecorded {
        reading: Reading,
        stamp: Timestamp,
        /// Filled slots after the insert.
        count: usize,
    },

    /// A remote write failed validation; nothing was stored.
    InputRejected(InputError),

    /// The clock was set from an `HH:MM` write.
    ClockSet { hours: u8, minutes: u8 },

    /// "Clear Data" emptied the history.
    HistoryCleared,

    /// Soft timeout blanked the display.
    ScreenBlanked,

    /// Activity re-lit a blanked display.
    ScreenWoken,

    /// About to enter light sleep.
    Sleeping,

    /// Back from light sleep.
    Woke,
}
