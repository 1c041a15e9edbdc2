//! Glucologger Firmware: Main Entry Point
//!
//! Hexagonal architecture with an interrupt-fed event loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter              LogEventSink    BleAdapter       │
//! │  (CharLcd + EspPlatform       (EventSink)     (GATT writes     │
//! │   + BleAdapter)                                → MAILBOX)      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  UI FSM · History · Clock · Power · ScreenWriter       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Button ISRs ──▶ Debouncer ──▶ EVENTS ◀── GATT write callback  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info, warn};

use glucologger::adapters::ble::{BleAdapter, BleState, MAILBOX};
use glucologger::adapters::hardware::HardwareAdapter;
use glucologger::adapters::lcd::CharLcd;
use glucologger::adapters::log_sink::LogEventSink;
use glucologger::adapters::platform::EspPlatform;
use glucologger::adapters::time;
use glucologger::app::service::AppService;
use glucologger::config::SystemConfig;
use glucologger::drivers::buttons::DEBOUNCER;
use glucologger::drivers::hw_init::{self, HwInitError};
use glucologger::events::{EVENTS, Event, push_event};
use glucologger::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Glucologger v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    config.validate().map_err(|e| anyhow::anyhow!("{e}"))?;

    // ── 2. Buttons ────────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Without buttons the device is unusable; halt here.
        error!("HAL init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    DEBOUNCER.set_window_ms(config.debounce_ms);
    DEBOUNCER.reset();
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {}, continuing without buttons", e);
    }

    // ── 3. LCD on I²C ─────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let i2c_cfg = I2cConfig::new().baudrate(Hertz(pins::I2C_BAUD_HZ));
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6,
        peripherals.pins.gpio7,
        &i2c_cfg,
    )
    .map_err(|e| {
        error!("I2C: {:?}", e);
        HwInitError::I2cInitFailed
    })?;
    info!(
        "LCD: I2C SDA={} SCL={} addr=0x{:02X}",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::LCD_I2C_ADDR
    );
    let mut lcd = CharLcd::new(i2c, Ets, pins::LCD_I2C_ADDR);
    if let Err(e) = lcd.init() {
        warn!("LCD: init failed ({:?}), continuing headless", e);
    }

    // ── 4. BLE + adapters ─────────────────────────────────────
    let mut ble = BleAdapter::new(config.device_name.clone(), config.unit_label.clone());
    ble.start();
    if ble.state() == BleState::Failed {
        warn!("BLE: '{}' unavailable, remote writes disabled", ble.device_name());
    }

    let mut hw = HardwareAdapter::new(lcd, EspPlatform::new(), ble);
    let mut sink = LogEventSink::new();

    // ── 5. App service ────────────────────────────────────────
    let mut app = AppService::new(config.clone(), time::uptime_ms());
    app.start(time::uptime_ms(), &mut hw, &mut sink);

    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    loop {
        while let Some(event) = EVENTS.pop() {
            let sleeps_before = hw.platform().sleep_count();
            let now_ms = time::uptime_ms();

            match event {
                Event::Button(button) => {
                    app.handle_button(button, now_ms, &mut hw, &mut sink);
                }
                Event::RemoteWrite => {
                    if let Some(write) = MAILBOX.take() {
                        app.handle_remote_write(write.payload(), now_ms, &mut hw, &mut sink);
                    }
                }
            }

            if hw.platform().sleep_count() != sleeps_before {
                discard_stale_input();
            }
        }

        // A write whose event did not fit in the queue.
        if let Some(write) = MAILBOX.take() {
            app.handle_remote_write(write.payload(), time::uptime_ms(), &mut hw, &mut sink);
        }

        let sleeps_before = hw.platform().sleep_count();
        app.tick(time::uptime_ms(), &mut hw, &mut sink);
        if hw.platform().sleep_count() != sleeps_before {
            discard_stale_input();
        }

        FreeRtos::delay_ms(config.loop_interval_ms);
    }
}

/// Presses queued around a sleep cycle are stale.  A remote write that
/// arrived meanwhile is still in the mailbox, so it gets a fresh event.
fn discard_stale_input() {
    EVENTS.clear();
    if !MAILBOX.is_empty() {
        let _ = push_event(Event::RemoteWrite);
    }
}
