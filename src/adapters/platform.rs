//! Sleep, delay and power-button re-arm primitives.
//!
//! Implements [`PlatformPort`].
//!
//! - **`target_os = "espidf"`**: GPIO wakeup + `esp_light_sleep_start()`.
//!   Light sleep keeps RAM, so history and clock survive.
//! - **other targets**: logs and returns immediately.

use crate::adapters::time;
use crate::app::ports::PlatformPort;
use crate::drivers::buttons::{DEBOUNCER, EdgePolarity};
use crate::drivers::hw_init;

#[derive(Default)]
pub struct EspPlatform {
    sleeps: u32,
}

impl EspPlatform {
    pub fn new() -> Self {
        Self { sleeps: 0 }
    }

    /// Completed light-sleep cycles since boot.
    pub fn sleep_count(&self) -> u32 {
        self.sleeps
    }
}

impl PlatformPort for EspPlatform {
    fn uptime_ms(&self) -> u64 {
        time::uptime_ms()
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        log::debug!("platform(sim): delay {} ms", ms);
    }

    #[cfg(target_os = "espidf")]
    fn enable_wake_source(&mut self) {
        use esp_idf_svc::sys::*;
        // SAFETY: pin is a configured input; called from the main task.
        unsafe {
            let ret = gpio_wakeup_enable(
                crate::pins::WAKE_GPIO,
                gpio_int_type_t_GPIO_INTR_HIGH_LEVEL,
            );
            if ret != ESP_OK {
                log::error!("platform: gpio_wakeup_enable failed ({})", ret);
            }
            let ret = esp_sleep_enable_gpio_wakeup();
            if ret != ESP_OK {
                log::error!("platform: esp_sleep_enable_gpio_wakeup failed ({})", ret);
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn enable_wake_source(&mut self) {
        log::debug!("platform(sim): wake source armed");
    }

    #[cfg(target_os = "espidf")]
    fn disable_wake_source(&mut self) {
        // SAFETY: undoes enable_wake_source on the same pin.
        unsafe {
            esp_idf_svc::sys::gpio_wakeup_disable(crate::pins::WAKE_GPIO);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn disable_wake_source(&mut self) {
        log::debug!("platform(sim): wake source disarmed");
    }

    #[cfg(target_os = "espidf")]
    fn light_sleep(&mut self) {
        // SAFETY: blocks the calling task until the GPIO wake fires.
        let ret = unsafe { esp_idf_svc::sys::esp_light_sleep_start() };
        if ret != esp_idf_svc::sys::ESP_OK {
            log::error!("platform: light sleep rejected ({})", ret);
        }
        self.sleeps = self.sleeps.wrapping_add(1);
    }

    #[cfg(not(target_os = "espidf"))]
    fn light_sleep(&mut self) {
        log::info!("platform(sim): light sleep, waking immediately");
        self.sleeps = self.sleeps.wrapping_add(1);
    }

    fn rearm_power_button(&mut self, polarity: EdgePolarity) {
        hw_init::set_power_edge(polarity);
        DEBOUNCER.rearm_power_at(polarity, time::edge_stamp_ms());
    }
}
