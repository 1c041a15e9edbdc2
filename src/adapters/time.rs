//! Monotonic time source.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()`, which keeps
//!   counting through light sleep.
//! - **other targets**: `std::time::Instant` for host-side simulation.
//!
//! The main loop hands [`uptime_ms`] to the service, and the wake path
//! stamps the power button's fresh debounce window with [`edge_stamp_ms`].

#[cfg(not(target_os = "espidf"))]
use std::sync::OnceLock;

#[cfg(not(target_os = "espidf"))]
static SIM_START: OnceLock<std::time::Instant> = OnceLock::new();

/// Microseconds since boot.
#[cfg(target_os = "espidf")]
pub fn uptime_us() -> u64 {
    // SAFETY: esp_timer is started by the IDF before app_main.
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
}

/// Microseconds since first use (simulation).
#[cfg(not(target_os = "espidf"))]
pub fn uptime_us() -> u64 {
    SIM_START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_micros() as u64
}

pub fn uptime_ms() -> u64 {
    uptime_us() / 1_000
}

/// Milliseconds truncated to 32 bits, as stamped on button edges.
/// Wraps after ~49 days; the debouncer compares with `wrapping_sub`.
pub fn edge_stamp_ms() -> u32 {
    uptime_ms() as u32
}
