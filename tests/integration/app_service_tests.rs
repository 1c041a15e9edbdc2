//! Integration tests for the input → AppService → display pipeline.
//!
//! These run on the host and drive the service exactly as the main loop
//! does, asserting on what ends up on the emulated 16x2 grid.

use crate::mock_hw::{MockHw, PlatformCall, RecordingSink};

use glucologger::app::events::AppEvent;
use glucologger::app::service::AppService;
use glucologger::clock::Timestamp;
use glucologger::config::SystemConfig;
use glucologger::drivers::buttons::{Button, EdgePolarity};
use glucologger::error::InputError;
use glucologger::fsm::{StateId, UiMode};

fn make_app_with(config: SystemConfig) -> (AppService, MockHw, RecordingSink) {
    let mut app = AppService::new(config, 0);
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    app.start(0, &mut hw, &mut sink);
    (app, hw, sink)
}

fn make_app() -> (AppService, MockHw, RecordingSink) {
    make_app_with(SystemConfig::default())
}

fn press(app: &mut AppService, hw: &mut MockHw, sink: &mut RecordingSink, b: Button, at_ms: u64) {
    hw.now_ms = at_ms;
    app.handle_button(b, at_ms, hw, sink);
}

fn write(app: &mut AppService, hw: &mut MockHw, sink: &mut RecordingSink, data: &[u8], at_ms: u64) {
    hw.now_ms = at_ms;
    app.handle_remote_write(data, at_ms, hw, sink);
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_shows_home_with_empty_history() {
    let (app, hw, sink) = make_app();
    assert_eq!(app.mode(), UiMode::Home);
    assert!(hw.backlight);
    assert_eq!(hw.line(0), "Glucose    12:00");
    assert_eq!(hw.line(1), "No readings");
    assert_eq!(sink.events, vec![AppEvent::Started(StateId::Home)]);
}

// ── Readings ──────────────────────────────────────────────────

#[test]
fn remote_write_is_stored_and_shown() {
    let (mut app, mut hw, mut sink) = make_app();
    write(&mut app, &mut hw, &mut sink, b"120", 1_000);

    assert!(sink.contains(&AppEvent::ReadingRecorded {
        reading: "120".try_into().unwrap(),
        stamp: Timestamp::new(0, 0),
        count: 1,
    }));
    assert_eq!(hw.line(1), "Last:120   12:00");
    assert_eq!(app.history().len(), 1);
}

#[test]
fn sixth_reading_evicts_the_oldest() {
    let (mut app, mut hw, mut sink) = make_app();
    for (i, r) in ["1", "2", "3", "4", "5", "6"].iter().enumerate() {
        write(&mut app, &mut hw, &mut sink, r.as_bytes(), 1_000 + i as u64 * 1_000);
    }
    assert_eq!(app.history().len(), 5);
    let stored: Vec<&str> = app.history().iter().map(|e| e.reading.as_str()).collect();
    assert_eq!(stored, ["2", "3", "4", "5", "6"]);

    press(&mut app, &mut hw, &mut sink, Button::Menu, 8_000);
    press(&mut app, &mut hw, &mut sink, Button::Select, 8_500);
    assert_eq!(app.mode(), UiMode::ViewSaved { cursor: 0 });
    assert_eq!(hw.line(0), "Saved 1/5");
    assert_eq!(hw.line(1), "2     @ 12:00");

    press(&mut app, &mut hw, &mut sink, Button::Down, 9_000);
    assert_eq!(app.mode(), UiMode::ViewSaved { cursor: 4 });
    assert_eq!(hw.line(0), "Saved 5/5");
    assert_eq!(hw.line(1), "6     @ 12:00");
}

#[test]
fn view_saved_shows_empty_slots() {
    let (mut app, mut hw, mut sink) = make_app();
    write(&mut app, &mut hw, &mut sink, b"99", 1_000);
    press(&mut app, &mut hw, &mut sink, Button::Menu, 2_000);
    press(&mut app, &mut hw, &mut sink, Button::Select, 2_500);
    press(&mut app, &mut hw, &mut sink, Button::Up, 3_000);
    assert_eq!(hw.line(0), "Saved 2/5");
    assert_eq!(hw.line(1), "(empty)");

    press(&mut app, &mut hw, &mut sink, Button::Menu, 3_500);
    assert_eq!(app.mode(), UiMode::Home);
}

#[test]
fn writes_outside_set_time_are_recorded_without_navigation() {
    let (mut app, mut hw, mut sink) = make_app();
    press(&mut app, &mut hw, &mut sink, Button::Menu, 1_000);
    write(&mut app, &mut hw, &mut sink, b"140", 1_500);
    assert_eq!(app.mode(), UiMode::Menu { index: 0 });
    assert_eq!(app.history().len(), 1);
}

// ── Invalid data ──────────────────────────────────────────────

#[test]
fn oversized_reading_shows_banner_then_home() {
    let (mut app, mut hw, mut sink) = make_app();
    write(&mut app, &mut hw, &mut sink, b"123456", 1_000);

    assert!(sink.contains(&AppEvent::InputRejected(InputError::TooLong { len: 6 })));
    assert!(app.history().is_empty());
    assert_eq!(hw.line(0), "Invalid Data");

    app.tick(2_000, &mut hw, &mut sink);
    assert_eq!(hw.line(0), "Invalid Data");

    app.tick(3_000, &mut hw, &mut sink);
    assert!(!app.banner_active());
    assert_eq!(hw.line(1), "No readings");
}

#[test]
fn empty_and_unprintable_writes_are_rejected() {
    let (mut app, mut hw, mut sink) = make_app();
    write(&mut app, &mut hw, &mut sink, b"", 1_000);
    write(&mut app, &mut hw, &mut sink, b"1\x002", 1_200);
    assert!(sink.contains(&AppEvent::InputRejected(InputError::Empty)));
    assert!(sink.contains(&AppEvent::InputRejected(InputError::NotPrintable)));
    assert!(app.history().is_empty());
}

#[test]
fn banner_waits_for_home() {
    let (mut app, mut hw, mut sink) = make_app();
    press(&mut app, &mut hw, &mut sink, Button::Menu, 500);
    write(&mut app, &mut hw, &mut sink, b"", 1_000);
    assert_eq!(hw.line(0), "Menu");
    assert!(!app.banner_active());

    press(&mut app, &mut hw, &mut sink, Button::Menu, 1_500);
    assert_eq!(app.mode(), UiMode::Home);
    assert_eq!(hw.line(0), "Invalid Data");
}

// ── Menu ──────────────────────────────────────────────────────

#[test]
fn menu_down_wraps_backwards() {
    let (mut app, mut hw, mut sink) = make_app();
    press(&mut app, &mut hw, &mut sink, Button::Menu, 1_000);
    assert_eq!(hw.line(1), "> View Data");

    let mut seen = Vec::new();
    for i in 0..3 {
        press(&mut app, &mut hw, &mut sink, Button::Down, 2_000 + i * 500);
        let UiMode::Menu { index } = app.mode() else {
            panic!("left the menu");
        };
        seen.push(index);
    }
    assert_eq!(seen, [3, 2, 1]);
    assert_eq!(hw.line(1), "> Set Time");
}

#[test]
fn menu_back_returns_home() {
    let (mut app, mut hw, mut sink) = make_app();
    press(&mut app, &mut hw, &mut sink, Button::Menu, 1_000);
    press(&mut app, &mut hw, &mut sink, Button::Down, 1_500);
    press(&mut app, &mut hw, &mut sink, Button::Select, 2_000);
    assert_eq!(app.mode(), UiMode::Home);
    assert!(sink.contains(&AppEvent::ModeChanged {
        from: StateId::Menu,
        to: StateId::Home
    }));
}

#[test]
fn short_menu_has_three_items() {
    let config = SystemConfig {
        menu_clear_data: false,
        ..SystemConfig::default()
    };
    let (mut app, mut hw, mut sink) = make_app_with(config);
    press(&mut app, &mut hw, &mut sink, Button::Menu, 1_000);
    press(&mut app, &mut hw, &mut sink, Button::Down, 1_500);
    assert_eq!(app.mode(), UiMode::Menu { index: 2 });
    assert_eq!(hw.line(1), "> Back");
}

#[test]
fn clear_data_empties_history() {
    let (mut app, mut hw, mut sink) = make_app();
    write(&mut app, &mut hw, &mut sink, b"101", 1_000);
    write(&mut app, &mut hw, &mut sink, b"102", 2_000);
    press(&mut app, &mut hw, &mut sink, Button::Menu, 3_000);
    press(&mut app, &mut hw, &mut sink, Button::Up, 3_500);
    press(&mut app, &mut hw, &mut sink, Button::Up, 4_000);
    assert_eq!(hw.line(1), "> Clear Data");
    press(&mut app, &mut hw, &mut sink, Button::Select, 4_500);

    assert!(sink.contains(&AppEvent::HistoryCleared));
    assert!(app.history().is_empty());
    assert_eq!(app.mode(), UiMode::Home);
    assert_eq!(hw.line(1), "No readings");
}

// ── Set time ──────────────────────────────────────────────────

fn enter_set_time(app: &mut AppService, hw: &mut MockHw, sink: &mut RecordingSink, at_ms: u64) {
    press(app, hw, sink, Button::Menu, at_ms);
    press(app, hw, sink, Button::Up, at_ms + 300);
    press(app, hw, sink, Button::Select, at_ms + 600);
    assert_eq!(app.mode(), UiMode::SetTime);
}

#[test]
fn set_time_updates_clock_and_stamps() {
    let (mut app, mut hw, mut sink) = make_app();
    enter_set_time(&mut app, &mut hw, &mut sink, 1_000);
    assert_eq!(hw.line(0), "Set Time");
    assert_eq!(hw.line(1), "Send HH:MM");

    write(&mut app, &mut hw, &mut sink, b"09:30", 10_000);
    assert!(sink.contains(&AppEvent::ClockSet { hours: 9, minutes: 30 }));
    assert_eq!(app.mode(), UiMode::Home);
    assert!(app.history().is_empty(), "time writes are not readings");

    app.tick(20_000, &mut hw, &mut sink);
    assert_eq!(hw.line(0), "Glucose    09:30");

    write(&mut app, &mut hw, &mut sink, b"115", 21_000);
    assert_eq!(
        app.history().most_recent().map(|e| e.stamp),
        Some(Timestamp::new(9, 30))
    );
}

#[test]
fn malformed_time_is_rejected_and_clock_kept() {
    let (mut app, mut hw, mut sink) = make_app();
    enter_set_time(&mut app, &mut hw, &mut sink, 1_000);
    write(&mut app, &mut hw, &mut sink, b"9:30", 2_000);

    assert!(sink.contains(&AppEvent::InputRejected(InputError::BadTimeFormat)));
    assert_eq!(app.clock().offset_secs(), 0);
    assert_eq!(app.mode(), UiMode::Home);
    assert_eq!(hw.line(0), "Invalid Data");
}

#[test]
fn out_of_range_time_is_rejected() {
    let (mut app, mut hw, mut sink) = make_app();
    enter_set_time(&mut app, &mut hw, &mut sink, 1_000);
    write(&mut app, &mut hw, &mut sink, b"13:00", 2_000);
    assert!(sink.contains(&AppEvent::InputRejected(InputError::TimeOutOfRange)));
    assert_eq!(app.clock().offset_secs(), 0);
}

#[test]
fn menu_cancels_set_time() {
    let (mut app, mut hw, mut sink) = make_app();
    enter_set_time(&mut app, &mut hw, &mut sink, 1_000);
    press(&mut app, &mut hw, &mut sink, Button::Menu, 2_000);
    assert_eq!(app.mode(), UiMode::Home);
    write(&mut app, &mut hw, &mut sink, b"10:00", 3_000);
    assert_eq!(app.history().len(), 1, "back on Home a write is a reading again");
}

#[test]
fn clock_rolls_over_after_a_day() {
    let (mut app, mut hw, mut sink) = make_app();
    enter_set_time(&mut app, &mut hw, &mut sink, 1_000);
    write(&mut app, &mut hw, &mut sink, b"11:00", 10_000);
    assert_eq!(app.clock().offset_secs(), 39_600 - 10);

    app.tick(46_809_000, &mut hw, &mut sink);
    assert_eq!(app.clock().elapsed_secs(), 86_399);

    app.tick(46_810_000, &mut hw, &mut sink);
    assert_eq!(app.clock().elapsed_secs(), 0);
    assert_eq!(app.clock().offset_secs(), 0);
}

// ── Screen timeout ────────────────────────────────────────────

#[test]
fn inactivity_blanks_the_screen() {
    let (mut app, mut hw, mut sink) = make_app();
    app.tick(29_999, &mut hw, &mut sink);
    assert!(app.screen_on());

    app.tick(30_000, &mut hw, &mut sink);
    assert!(!app.screen_on());
    assert!(!hw.backlight);
    assert_eq!(hw.line(0), "");
    assert!(sink.contains(&AppEvent::ScreenBlanked));
    assert_eq!(hw.sleeps(), 0, "soft timeout does not sleep by default");
}

#[test]
fn first_press_after_blank_only_wakes() {
    let (mut app, mut hw, mut sink) = make_app();
    app.tick(30_000, &mut hw, &mut sink);

    press(&mut app, &mut hw, &mut sink, Button::Menu, 31_000);
    assert!(app.screen_on());
    assert!(hw.backlight);
    assert_eq!(app.mode(), UiMode::Home);
    assert_eq!(hw.line(1), "No readings");

    press(&mut app, &mut hw, &mut sink, Button::Menu, 31_500);
    assert_eq!(app.mode(), UiMode::Menu { index: 0 });
}

#[test]
fn remote_write_wakes_and_records() {
    let (mut app, mut hw, mut sink) = make_app();
    app.tick(30_000, &mut hw, &mut sink);
    write(&mut app, &mut hw, &mut sink, b"88", 40_000);
    assert!(app.screen_on());
    assert!(sink.contains(&AppEvent::ScreenWoken));
    assert_eq!(app.history().len(), 1);
    assert!(hw.line(1).starts_with("Last:88"));
}

#[test]
fn sleep_on_timeout_runs_the_power_sequence() {
    let config = SystemConfig {
        sleep_on_timeout: true,
        ..SystemConfig::default()
    };
    let (mut app, mut hw, mut sink) = make_app_with(config);
    hw.now_ms = 30_000;
    app.tick(30_000, &mut hw, &mut sink);
    assert_eq!(hw.sleeps(), 1);
    assert_eq!(app.mode(), UiMode::Home);
    assert!(app.screen_on());
}

// ── Power button ──────────────────────────────────────────────

#[test]
fn power_press_runs_sleep_sequence_in_order() {
    let (mut app, mut hw, mut sink) = make_app();
    write(&mut app, &mut hw, &mut sink, b"130", 1_000);
    press(&mut app, &mut hw, &mut sink, Button::Menu, 2_000);
    press(&mut app, &mut hw, &mut sink, Button::Power, 3_000);

    assert_eq!(
        hw.calls,
        vec![
            PlatformCall::WakeEnabled,
            PlatformCall::Slept,
            PlatformCall::WakeDisabled,
            PlatformCall::AdvertisingRestarted,
            PlatformCall::Rearmed(EdgePolarity::Falling),
        ]
    );
    assert!(sink.contains(&AppEvent::ModeChanged {
        from: StateId::Menu,
        to: StateId::Sleeping
    }));
    assert!(sink.contains(&AppEvent::Sleeping));
    assert!(sink.contains(&AppEvent::Woke));
    assert_eq!(app.mode(), UiMode::Home);
    assert!(hw.backlight);
    assert_eq!(app.history().len(), 1, "light sleep keeps RAM");
    assert!(hw.line(1).starts_with("Last:130"));
}

#[test]
fn power_polarity_alternates() {
    let (mut app, mut hw, mut sink) = make_app();
    press(&mut app, &mut hw, &mut sink, Button::Power, 1_000);
    assert_eq!(app.power_polarity(), EdgePolarity::Falling);
    let t = hw.now_ms + 1_000;
    press(&mut app, &mut hw, &mut sink, Button::Power, t);
    assert_eq!(app.power_polarity(), EdgePolarity::Rising);
    assert_eq!(hw.last_rearm(), Some(EdgePolarity::Rising));
    assert_eq!(hw.sleeps(), 2);
}

#[test]
fn clock_keeps_running_through_sleep() {
    let (mut app, mut hw, mut sink) = make_app();
    enter_set_time(&mut app, &mut hw, &mut sink, 1_000);
    write(&mut app, &mut hw, &mut sink, b"09:30", 10_000);
    press(&mut app, &mut hw, &mut sink, Button::Power, 20_000);

    // 10 s awake + animations + 60 s asleep.
    assert_eq!(app.clock().reading().minutes, 31);
}

#[test]
fn power_press_from_blank_screen_still_sleeps() {
    let (mut app, mut hw, mut sink) = make_app();
    app.tick(30_000, &mut hw, &mut sink);
    press(&mut app, &mut hw, &mut sink, Button::Power, 31_000);
    assert_eq!(hw.sleeps(), 1);
    assert!(app.screen_on());
}

// ── Redraw economy ────────────────────────────────────────────

#[test]
fn blinking_colon_rewrites_one_cell() {
    let (mut app, mut hw, mut sink) = make_app();
    app.tick(2_000, &mut hw, &mut sink);
    let before = hw.chars_written;
    let clears = hw.clears;

    app.tick(3_000, &mut hw, &mut sink);
    assert_eq!(hw.chars_written - before, 1);
    assert_eq!(hw.clears, clears);
    assert_eq!(hw.line(0), "Glucose    12 00");
}

#[test]
fn mode_change_redraws_fully() {
    let (mut app, mut hw, mut sink) = make_app();
    let clears = hw.clears;
    press(&mut app, &mut hw, &mut sink, Button::Menu, 1_000);
    assert_eq!(hw.clears, clears + 1);
    assert_eq!(hw.line(0), "Menu");

    press(&mut app, &mut hw, &mut sink, Button::Up, 1_500);
    assert_eq!(hw.clears, clears + 1, "moving within the menu is partial");
    assert_eq!(hw.line(1), "> Set Time");
}
