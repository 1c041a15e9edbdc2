//! Glucologger firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod fsm;
pub mod history;
pub mod pins;
pub mod power;
pub mod ui;

// The hardware-facing modules compile on every target; their ESP-IDF
// halves are guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
