//! Pure screen composition for the 16x2 character display.
//!
//! A [`Screen`] is just the two rows of ASCII cells that *should* be on the
//! glass.  Nothing here touches the display; [`super::writer`] decides how
//! much of it actually needs to be sent.

use core::fmt::{self, Write};

use crate::clock::{ClockReading, display_hours};
use crate::config::{DISPLAY_COLS, DISPLAY_ROWS, MAX_DATA};
use crate::fsm::UiMode;
use crate::fsm::context::MenuItem;
use crate::history::HistoryStore;

const HOME_TITLE: &str = "Glucose";
const DOTS: &str = "................";

/// The full contents of the character grid, space padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    rows: [[u8; DISPLAY_COLS]; DISPLAY_ROWS],
}

impl Default for Screen {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Screen {
    pub const BLANK: Self = Self {
        rows: [[b' '; DISPLAY_COLS]; DISPLAY_ROWS],
    };

    pub fn from_lines(top: &str, bottom: &str) -> Self {
        let mut s = Self::BLANK;
        s.set_row(0, format_args!("{top}"));
        s.set_row(1, format_args!("{bottom}"));
        s
    }

    pub fn row(&self, row: usize) -> &[u8; DISPLAY_COLS] {
        &self.rows[row]
    }

    /// Row as text (always ASCII).
    pub fn row_str(&self, row: usize) -> &str {
        core::str::from_utf8(&self.rows[row]).unwrap_or("")
    }

    fn set_row(&mut self, row: usize, args: fmt::Arguments<'_>) {
        let mut w = RowWriter {
            cells: &mut self.rows[row],
            len: 0,
        };
        // RowWriter never fails; overflow is truncated.
        let _ = w.write_fmt(args);
    }
}

/// Writes into one row, truncating at the display width and replacing
/// anything the HD44780 ROM cannot show.
struct RowWriter<'a> {
    cells: &'a mut [u8; DISPLAY_COLS],
    len: usize,
}

impl Write for RowWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            if self.len == DISPLAY_COLS {
                break;
            }
            self.cells[self.len] = if (0x20..=0x7E).contains(&b) { b } else { b'?' };
            self.len += 1;
        }
        Ok(())
    }
}

// ── Mode layouts ──────────────────────────────────────────────

/// Compose the screen for `mode`.
pub fn compose(
    mode: UiMode,
    history: &HistoryStore,
    clock: ClockReading,
    menu: &[MenuItem],
) -> Screen {
    let mut s = Screen::BLANK;
    match mode {
        UiMode::Home => {
            let sep = if clock.colon_visible() { ':' } else { ' ' };
            s.set_row(
                0,
                format_args!(
                    "{HOME_TITLE:<11}{:02}{sep}{:02}",
                    display_hours(clock.hours),
                    clock.minutes
                ),
            );
            match history.most_recent() {
                Some(e) => s.set_row(1, format_args!("Last:{:<5} {}", e.reading, e.stamp)),
                None => s.set_row(1, format_args!("No readings")),
            }
        }
        UiMode::Menu { index } => {
            s.set_row(0, format_args!("Menu"));
            let label = menu.get(index).map_or("", |item| item.label());
            s.set_row(1, format_args!("> {label}"));
        }
        UiMode::SetTime => {
            s.set_row(0, format_args!("Set Time"));
            s.set_row(1, format_args!("Send HH:MM"));
        }
        UiMode::ViewSaved { cursor } => {
            s.set_row(0, format_args!("Saved {}/{}", cursor + 1, MAX_DATA));
            let entry = history.get(cursor);
            if entry.is_empty() {
                s.set_row(1, format_args!("(empty)"));
            } else {
                s.set_row(1, format_args!("{:<5} @ {}", entry.reading, entry.stamp));
            }
        }
        UiMode::Sleeping => {}
    }
    s
}

/// Transient banner for a rejected remote write.
pub fn invalid_banner() -> Screen {
    Screen::from_lines("Invalid Data", "")
}

/// Frame `frame` (0-based) of the power-off animation.
pub fn power_off_frame(frame: u8) -> Screen {
    Screen::from_lines("Powering off", dots(frame))
}

/// Frame `frame` (0-based) of the power-on animation.
pub fn power_on_frame(frame: u8, name: &str) -> Screen {
    Screen::from_lines(name, dots(frame))
}

fn dots(frame: u8) -> &'static str {
    let n = (usize::from(frame) + 1).min(DOTS.len());
    &DOTS[..n]
}
