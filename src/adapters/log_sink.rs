//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::ModeChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::ReadingRecorded {
                reading,
                stamp,
                count,
            } => {
                info!("READING | '{}' @ {} | stored={}", reading, stamp, count);
            }
            AppEvent::InputRejected(e) => {
                warn!("INPUT | rejected: {}", e);
            }
            AppEvent::ClockSet { hours, minutes } => {
                info!("CLOCK | set to {:02}:{:02}", hours, minutes);
            }
            AppEvent::HistoryCleared => {
                info!("READING | history cleared");
            }
            AppEvent::ScreenBlanked => {
                info!("POWER | screen timeout, display off");
            }
            AppEvent::ScreenWoken => {
                info!("POWER | display on");
            }
            AppEvent::Sleeping => {
                info!("POWER | entering light sleep");
            }
            AppEvent::Woke => {
                info!("POWER | awake");
            }
        }
    }
}
