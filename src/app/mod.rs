//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the glucose logger: UI
//! state machine orchestration, reading history, clock and power
//! management.  All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable without
//! real peripherals.

pub mod events;
pub mod ports;
pub mod service;
