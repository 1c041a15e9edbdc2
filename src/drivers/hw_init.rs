//! One-shot hardware peripheral initialization.
//!
//! Configures the five button GPIOs and their interrupts using raw ESP-IDF
//! sys calls.  Called once from `main()` before the event loop starts.
//! The I²C bus for the LCD is brought up separately through `esp-idf-hal`.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::drivers::buttons::{Button, EdgePolarity};
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    I2cInitFailed,
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::I2cInitFailed => write!(f, "I2C bus init failed"),
        }
    }
}

impl std::error::Error for HwInitError {}

/// GPIO number wired to each button.
pub const fn button_gpio(button: Button) -> i32 {
    match button {
        Button::Menu => pins::MENU_BUTTON_GPIO,
        Button::Up => pins::UP_BUTTON_GPIO,
        Button::Down => pins::DOWN_BUTTON_GPIO,
        Button::Select => pins::SELECT_BUTTON_GPIO,
        Button::Power => pins::POWER_BUTTON_GPIO,
    }
}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before event loop; single-threaded.
    unsafe {
        init_button_inputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── Button inputs ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_button_inputs() -> Result<(), HwInitError> {
    for button in Button::ALL {
        // Navigation buttons idle high and press low; the power button is
        // the other way round.
        let (pull_up, pull_down, intr) = if button == Button::Power {
            (
                gpio_pullup_t_GPIO_PULLUP_DISABLE,
                gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
                gpio_int_type_t_GPIO_INTR_POSEDGE,
            )
        } else {
            (
                gpio_pullup_t_GPIO_PULLUP_ENABLE,
                gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
                gpio_int_type_t_GPIO_INTR_NEGEDGE,
            )
        };
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << button_gpio(button),
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: pull_up,
            pull_down_en: pull_down,
            intr_type: intr,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: button GPIOs configured");
    Ok(())
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::drivers::buttons::button_isr_handler;

/// One handler for all buttons; `arg` carries the button index.
#[cfg(target_os = "espidf")]
unsafe extern "C" fn button_gpio_isr(arg: *mut core::ffi::c_void) {
    // SAFETY: esp_timer_get_time is a RTC counter read; safe in ISR context.
    let now_ms = (unsafe { esp_idf_svc::sys::esp_timer_get_time() } / 1_000) as u32;
    if let Some(button) = Button::from_index(arg as usize) {
        button_isr_handler(button, now_ms);
    }
}

/// Install per-pin GPIO ISR service and register the button handlers.
/// Call after init_peripherals() and before the event loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed.  The handler only touches atomics.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        for button in Button::ALL {
            let pin = button_gpio(button);
            gpio_isr_handler_add(
                pin,
                Some(button_gpio_isr),
                button.index() as *mut core::ffi::c_void,
            );
            gpio_intr_enable(pin);
        }

        info!("hw_init: ISR service installed (menu, up, down, select, power)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

/// Switch the power button interrupt to the given edge.
#[cfg(target_os = "espidf")]
pub fn set_power_edge(polarity: EdgePolarity) {
    let intr = match polarity {
        EdgePolarity::Rising => gpio_int_type_t_GPIO_INTR_POSEDGE,
        EdgePolarity::Falling => gpio_int_type_t_GPIO_INTR_NEGEDGE,
    };
    // SAFETY: pin configured in init_button_inputs(); main-loop only.
    unsafe {
        gpio_set_intr_type(pins::POWER_BUTTON_GPIO, intr);
        gpio_intr_enable(pins::POWER_BUTTON_GPIO);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn set_power_edge(polarity: EdgePolarity) {
    log::debug!("hw_init(sim): power edge -> {:?}", polarity);
}
