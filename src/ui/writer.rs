//! Applies composed [`Screen`]s to a [`DisplayPort`] with minimal traffic.
//!
//! The I2C backpack is slow (every character is four bus writes), so after
//! the first full redraw of a mode only the changed column span of each row
//! is rewritten: typically the clock digits, the blinking separator or the
//! selected menu line.

use crate::app::ports::DisplayPort;
use crate::config::DISPLAY_ROWS;

use super::screen::Screen;

#[derive(Debug, Default)]
pub struct ScreenWriter {
    /// What is believed to be on the glass; `None` forces a full redraw.
    shown: Option<Screen>,
}

impl ScreenWriter {
    pub const fn new() -> Self {
        Self { shown: None }
    }

    /// Forget the glass contents so the next `apply` redraws everything.
    pub fn invalidate(&mut self) {
        self.shown = None;
    }

    pub fn shown(&self) -> Option<&Screen> {
        self.shown.as_ref()
    }

    /// Bring the display in line with `screen`.
    ///
    /// `first_entry` requests a clear and full redraw.
    pub fn apply(&mut self, display: &mut impl DisplayPort, screen: &Screen, first_entry: bool) {
        match self.shown {
            Some(ref old) if !first_entry => {
                if old == screen {
                    return;
                }
                for row in 0..DISPLAY_ROWS {
                    if let Some((start, end)) = changed_span(old.row(row), screen.row(row)) {
                        display.set_cursor(start as u8, row as u8);
                        display.print(&screen.row_str(row)[start..=end]);
                    }
                }
            }
            _ => {
                display.clear();
                for row in 0..DISPLAY_ROWS {
                    let text = screen.row_str(row).trim_end();
                    if !text.is_empty() {
                        display.set_cursor(0, row as u8);
                        display.print(text);
                    }
                }
            }
        }
        self.shown = Some(*screen);
    }
}

/// First and last differing column, inclusive.
fn changed_span(old: &[u8], new: &[u8]) -> Option<(usize, usize)> {
    let start = old.iter().zip(new).position(|(a, b)| a != b)?;
    let end = old.iter().zip(new).rposition(|(a, b)| a != b)?;
    Some((start, end))
}
