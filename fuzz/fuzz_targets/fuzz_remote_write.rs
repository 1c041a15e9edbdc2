//! Fuzz target: remote writes and button presses through `AppService`
//!
//! The first byte of each chunk picks an action (button or write); the
//! rest of the chunk is the write payload.  Whatever arrives, the service
//! must never panic, the history must stay within capacity, and every
//! stored reading must be short printable ASCII.
//!
//! cargo fuzz run fuzz_remote_write

#![no_main]

use glucologger::app::events::AppEvent;
use glucologger::app::ports::{DisplayPort, EventSink, PlatformPort, RemoteLinkPort};
use glucologger::app::service::AppService;
use glucologger::config::{MAX_DATA, MAX_DATA_LEN, SystemConfig};
use glucologger::drivers::buttons::{Button, EdgePolarity};
use libfuzzer_sys::fuzz_target;

struct NullHw {
    now_ms: u64,
}

impl DisplayPort for NullHw {
    fn clear(&mut self) {}
    fn set_cursor(&mut self, _col: u8, _row: u8) {}
    fn print(&mut self, text: &str) {
        assert!(text.len() <= 16, "row overflow");
    }
    fn set_backlight(&mut self, _on: bool) {}
}

impl PlatformPort for NullHw {
    fn uptime_ms(&self) -> u64 {
        self.now_ms
    }
    fn delay_ms(&mut self, ms: u32) {
        self.now_ms += u64::from(ms);
    }
    fn enable_wake_source(&mut self) {}
    fn disable_wake_source(&mut self) {}
    fn light_sleep(&mut self) {
        self.now_ms += 1_000;
    }
    fn rearm_power_button(&mut self, _polarity: EdgePolarity) {}
}

impl RemoteLinkPort for NullHw {
    fn restart_advertising(&mut self) {}
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let mut app = AppService::new(SystemConfig::default(), 0);
    let mut hw = NullHw { now_ms: 0 };
    let mut sink = NullSink;
    app.start(0, &mut hw, &mut sink);

    for chunk in data.chunks(8) {
        let Some((&op, payload)) = chunk.split_first() else {
            continue;
        };
        hw.now_ms += u64::from(op) * 97;
        let now = hw.now_ms;
        match Button::from_index(usize::from(op % 8)) {
            Some(button) => app.handle_button(button, now, &mut hw, &mut sink),
            None => app.handle_remote_write(payload, now, &mut hw, &mut sink),
        }
        app.tick(hw.now_ms, &mut hw, &mut sink);

        assert!(app.history().len() <= MAX_DATA);
        for entry in app.history().iter() {
            assert!(!entry.reading.is_empty() && entry.reading.len() <= MAX_DATA_LEN);
            assert!(entry.reading.bytes().all(|b| (0x20..=0x7E).contains(&b)));
        }
    }
});
