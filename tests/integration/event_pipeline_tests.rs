//! ISR → debouncer → event queue → main loop → service, end to end.
//!
//! The queue, debouncer and mailbox are process-wide statics, so the whole
//! pipeline is exercised from a single test to keep it free of races with
//! other tests in this binary.

use crate::mock_hw::{MockHw, RecordingSink};

use glucologger::adapters::ble::{MAILBOX, on_remote_write};
use glucologger::app::service::AppService;
use glucologger::config::SystemConfig;
use glucologger::drivers::buttons::{Button, DEBOUNCER, EdgePolarity, button_isr_handler};
use glucologger::events::{EVENTS, Event};
use glucologger::fsm::UiMode;

/// One pass of the main loop's drain, as `main.rs` runs it.
fn drain(app: &mut AppService, hw: &mut MockHw, sink: &mut RecordingSink) {
    while let Some(event) = EVENTS.pop() {
        let now_ms = hw.now_ms;
        match event {
            Event::Button(button) => app.handle_button(button, now_ms, hw, sink),
            Event::RemoteWrite => {
                if let Some(write) = MAILBOX.take() {
                    app.handle_remote_write(write.payload(), now_ms, hw, sink);
                }
            }
        }
    }
}

#[test]
fn interrupts_reach_the_service() {
    EVENTS.clear();
    DEBOUNCER.reset();
    DEBOUNCER.set_window_ms(200);
    while MAILBOX.take().is_some() {}

    let mut app = AppService::new(SystemConfig::default(), 0);
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    app.start(0, &mut hw, &mut sink);

    // A bouncing menu press yields a single event.
    button_isr_handler(Button::Menu, 1_000);
    button_isr_handler(Button::Menu, 1_040);
    button_isr_handler(Button::Menu, 1_120);
    assert_eq!(EVENTS.len(), 1);
    hw.now_ms = 1_200;
    drain(&mut app, &mut hw, &mut sink);
    assert_eq!(app.mode(), UiMode::Menu { index: 0 });

    // Exactly one window later a second press is accepted.
    button_isr_handler(Button::Menu, 1_200);
    hw.now_ms = 1_300;
    drain(&mut app, &mut hw, &mut sink);
    assert_eq!(app.mode(), UiMode::Home);

    // Two writes before the loop runs: the later one wins.
    on_remote_write(b"150");
    on_remote_write(b"151");
    hw.now_ms = 2_000;
    drain(&mut app, &mut hw, &mut sink);
    assert_eq!(app.history().len(), 1);
    assert_eq!(
        app.history().most_recent().map(|e| e.reading.as_str()),
        Some("151")
    );

    // An oversized write arrives truncated and is still rejected.
    on_remote_write(&[b'7'; 40]);
    hw.now_ms = 2_500;
    drain(&mut app, &mut hw, &mut sink);
    assert_eq!(app.history().len(), 1);
    assert!(app.banner_active());

    // Power is one-shot until the wake path re-arms it.
    button_isr_handler(Button::Power, 5_000);
    button_isr_handler(Button::Power, 5_600);
    assert_eq!(EVENTS.len(), 1);
    hw.now_ms = 5_000;
    drain(&mut app, &mut hw, &mut sink);
    assert_eq!(hw.sleeps(), 1);
    assert!(!DEBOUNCER.power_armed());

    let woke_at = hw.now_ms as u32;
    DEBOUNCER.rearm_power_at(app.power_polarity(), woke_at);
    assert_eq!(DEBOUNCER.power_polarity(), EdgePolarity::Falling);
    button_isr_handler(Button::Power, woke_at + 50);
    assert!(EVENTS.is_empty(), "release bounce after wake is ignored");
    button_isr_handler(Button::Power, woke_at + 1_000);
    assert_eq!(EVENTS.pop(), Some(Event::Button(Button::Power)));

    // A burst of writes takes one queue slot, so a power press still fits.
    DEBOUNCER.rearm_power(EdgePolarity::Rising);
    for _ in 0..20 {
        on_remote_write(b"140");
    }
    button_isr_handler(Button::Power, woke_at + 5_000);
    assert_eq!(EVENTS.len(), 2);
    assert_eq!(EVENTS.pop(), Some(Event::RemoteWrite));
    assert_eq!(EVENTS.pop(), Some(Event::Button(Button::Power)));
    assert!(MAILBOX.take().is_some());
    assert!(MAILBOX.is_empty());
}
