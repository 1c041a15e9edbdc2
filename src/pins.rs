//! GPIO / peripheral pin assignments for the Glucologger board
//! (Seeed XIAO ESP32-C3).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Buttons
// ---------------------------------------------------------------------------

/// Menu button (D2), active-low with internal pull-up.
pub const MENU_BUTTON_GPIO: i32 = 4;
/// Up button (D3), active-low with internal pull-up.
pub const UP_BUTTON_GPIO: i32 = 5;
/// Down button (D8), active-low with internal pull-up.
pub const DOWN_BUTTON_GPIO: i32 = 8;
/// Select button (D9), active-low with internal pull-up.
pub const SELECT_BUTTON_GPIO: i32 = 9;
/// Power button (D0), active-high with internal pull-down.
/// The pull-down behaves better than the pull-up on this pin.
pub const POWER_BUTTON_GPIO: i32 = 2;

/// GPIO that wakes the chip from light sleep on a high level.
/// Same physical line as the power button.
pub const WAKE_GPIO: i32 = POWER_BUTTON_GPIO;

// ---------------------------------------------------------------------------
// I²C bus (PCF8574 backpack on the 16x2 LCD)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 6;
pub const I2C_SCL_GPIO: i32 = 7;
/// Bus speed for the LCD backpack.
pub const I2C_BAUD_HZ: u32 = 100_000;
/// Default PCF8574 address (A0..A2 pulled high).
pub const LCD_I2C_ADDR: u8 = 0x27;
