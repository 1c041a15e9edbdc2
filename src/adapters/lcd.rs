//! 16x2 HD44780 character LCD behind a PCF8574 I²C backpack.
//!
//! Implements [`DisplayPort`].  Generic over the `embedded-hal` 1.0 I²C and
//! delay traits, so the same driver runs on `esp-idf-hal` and on a mock bus
//! in host tests.
//!
//! The backpack drives the controller in 4-bit mode:
//!
//! | PCF8574 bit | LCD pin   |
//! |-------------|-----------|
//! | P0          | RS        |
//! | P1          | RW (0)    |
//! | P2          | EN        |
//! | P3          | Backlight |
//! | P4..P7      | D4..D7    |

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::DisplayPort;
use crate::config::{DISPLAY_COLS, DISPLAY_ROWS};

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INC: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM start address of each row.
const ROW_OFFSETS: [u8; DISPLAY_ROWS] = [0x00, 0x40];

pub struct CharLcd<I2C, D> {
    i2c: I2C,
    delay: D,
    addr: u8,
    backlight: bool,
}

impl<I2C, E, D> CharLcd<I2C, D>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, addr: u8) -> Self {
        Self {
            i2c,
            delay,
            addr,
            backlight: true,
        }
    }

    /// Power-on initialisation into 4-bit, two-line mode.
    pub fn init(&mut self) -> Result<(), E> {
        self.delay.delay_ms(50);
        // Three 8-bit "function set" nibbles resync the controller no
        // matter which mode it woke up in.
        self.write_nibble(0x03 << 4, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03 << 4, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03 << 4, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x02 << 4, 0)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        self.command(CMD_ENTRY_MODE_INC)?;
        Ok(())
    }

    /// Give the bus back (tests).
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn backlight_bit(&self) -> u8 {
        if self.backlight { BACKLIGHT } else { 0 }
    }

    fn expander_write(&mut self, bits: u8) -> Result<(), E> {
        self.i2c.write(self.addr, &[bits | self.backlight_bit()])
    }

    fn write_nibble(&mut self, high_nibble: u8, mode: u8) -> Result<(), E> {
        let bits = (high_nibble & 0xF0) | mode;
        self.expander_write(bits | EN)?;
        self.delay.delay_us(1);
        self.expander_write(bits)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn send(&mut self, value: u8, mode: u8) -> Result<(), E> {
        self.write_nibble(value & 0xF0, mode)?;
        self.write_nibble(value << 4, mode)
    }

    fn command(&mut self, cmd: u8) -> Result<(), E> {
        self.send(cmd, 0)
    }

    fn data(&mut self, byte: u8) -> Result<(), E> {
        self.send(byte, RS)
    }

    fn report(result: Result<(), E>, op: &str) {
        if let Err(e) = result {
            warn!("LCD: {} failed: {:?}", op, e);
        }
    }
}

impl<I2C, E, D> DisplayPort for CharLcd<I2C, D>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
    D: DelayNs,
{
    fn clear(&mut self) {
        let r = self.command(CMD_CLEAR);
        self.delay.delay_ms(2);
        Self::report(r, "clear");
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        let row = usize::from(row).min(DISPLAY_ROWS - 1);
        let col = col.min(DISPLAY_COLS as u8 - 1);
        let r = self.command(CMD_SET_DDRAM | (ROW_OFFSETS[row] + col));
        Self::report(r, "set_cursor");
    }

    fn print(&mut self, text: &str) {
        for b in text.bytes() {
            let b = if (0x20..=0x7E).contains(&b) { b } else { b'?' };
            if let Err(e) = self.data(b) {
                warn!("LCD: print failed: {:?}", e);
                return;
            }
        }
    }

    fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
        let r = self.expander_write(0);
        Self::report(r, "backlight");
    }
}
