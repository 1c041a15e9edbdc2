//! Software clock: an elapsed-seconds counter with a user-set offset.
//!
//! This is not calendar time.  The clock counts seconds since an epoch
//! captured from the platform's monotonic uptime, adds whatever correction
//! the user sent in `HH:MM` form, and wraps back to zero once a simulated
//! day (86 400 s) has passed.
//!
//! ```text
//! elapsed = (wall - epoch_start) + offset        clamped at 0
//! elapsed >= 86_400  ->  epoch_start = wall, offset = 0, elapsed = 0
//! hours   = (elapsed / 3600) % 13                0 shown as 12
//! minutes = (elapsed % 3600) / 60                >59 clamped to 0
//! ```

use core::fmt;

use crate::config::SECS_PER_DAY;
use crate::error::InputError;

const SECS_PER_HOUR: u32 = 3_600;
const SECS_PER_MINUTE: u32 = 60;
const MAX_SET_HOURS: u8 = 12;
const MAX_SET_MINUTES: u8 = 59;

// ── Timestamp ─────────────────────────────────────────────────

/// Hour/minute pair attached to every stored reading.
///
/// `None` is the "unset" sentinel and is distinct from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp {
    pub hours: Option<u8>,
    pub minutes: Option<u8>,
}

impl Timestamp {
    pub const UNSET: Self = Self {
        hours: None,
        minutes: None,
    };

    pub const fn new(hours: u8, minutes: u8) -> Self {
        Self {
            hours: Some(hours),
            minutes: Some(minutes),
        }
    }

    pub const fn is_set(&self) -> bool {
        self.hours.is_some() && self.minutes.is_some()
    }
}

/// 12-hour display form, `--:--` when unset.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.hours, self.minutes) {
            (Some(h), Some(m)) => write!(f, "{:02}:{:02}", display_hours(h), m),
            _ => f.write_str("--:--"),
        }
    }
}

/// Internal hour 0 reads as 12 on a 12-hour face.
pub const fn display_hours(hours: u8) -> u8 {
    if hours == 0 { 12 } else { hours }
}

// ── Clock reading ─────────────────────────────────────────────

/// Everything the renderer needs from one clock sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub elapsed_secs: u32,
    pub hours: u8,
    pub minutes: u8,
}

impl ClockReading {
    pub fn from_elapsed(elapsed_secs: u32) -> Self {
        let hours = ((elapsed_secs / SECS_PER_HOUR) % 13) as u8;
        let mut minutes = ((elapsed_secs % SECS_PER_HOUR) / SECS_PER_MINUTE) as u8;
        if minutes > MAX_SET_MINUTES {
            minutes = 0;
        }
        Self {
            elapsed_secs,
            hours,
            minutes,
        }
    }

    pub const fn timestamp(&self) -> Timestamp {
        Timestamp::new(self.hours, self.minutes)
    }

    /// The separator blinks: shown on even seconds, hidden on odd ones.
    pub const fn colon_visible(&self) -> bool {
        self.elapsed_secs % 2 == 0
    }
}

// ── Software clock ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareClock {
    epoch_start_secs: u64,
    offset_secs: i64,
    elapsed_secs: u32,
}

impl SoftwareClock {
    /// Start counting from `wall_secs`.
    pub const fn new(wall_secs: u64) -> Self {
        Self {
            epoch_start_secs: wall_secs,
            offset_secs: 0,
            elapsed_secs: 0,
        }
    }

    /// Recompute elapsed seconds for `wall_secs`, applying the daily rollover.
    pub fn tick(&mut self, wall_secs: u64) -> u32 {
        let raw = self.raw_elapsed(wall_secs);
        if raw >= i64::from(SECS_PER_DAY) {
            log::debug!("clock: daily rollover at wall={wall_secs}s");
            self.epoch_start_secs = wall_secs;
            self.offset_secs = 0;
            self.elapsed_secs = 0;
        } else {
            // raw is in [0, SECS_PER_DAY) here.
            self.elapsed_secs = raw as u32;
        }
        self.elapsed_secs
    }

    /// Apply a user-sent `HH:MM` so that, at `wall_secs`, the clock reads it.
    ///
    /// On error the offset is left untouched.
    pub fn set_offset(&mut self, payload: &[u8], wall_secs: u64) -> Result<(), InputError> {
        let (hh, mm) = parse_hh_mm(payload)?;
        let target = i64::from(hh) * i64::from(SECS_PER_HOUR) + i64::from(mm) * 60;
        let since_epoch = wall_secs.saturating_sub(self.epoch_start_secs) as i64;
        self.offset_secs = target - since_epoch;
        self.elapsed_secs = target as u32;
        Ok(())
    }

    /// The clock as of the last `tick`/`set_offset`.
    pub fn reading(&self) -> ClockReading {
        ClockReading::from_elapsed(self.elapsed_secs)
    }

    pub const fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub const fn offset_secs(&self) -> i64 {
        self.offset_secs
    }

    pub const fn epoch_start_secs(&self) -> u64 {
        self.epoch_start_secs
    }

    fn raw_elapsed(&self, wall_secs: u64) -> i64 {
        let since_epoch = wall_secs.saturating_sub(self.epoch_start_secs) as i64;
        (since_epoch + self.offset_secs).max(0)
    }
}

/// Parse exactly `HH:MM` (two digits, colon, two digits).
pub fn parse_hh_mm(payload: &[u8]) -> Result<(u8, u8), InputError> {
    let [h1, h0, b':', m1, m0] = *payload else {
        return Err(InputError::BadTimeFormat);
    };
    if ![h1, h0, m1, m0].iter().all(u8::is_ascii_digit) {
        return Err(InputError::BadTimeFormat);
    }
    let hh = (h1 - b'0') * 10 + (h0 - b'0');
    let mm = (m1 - b'0') * 10 + (m0 - b'0');
    if hh > MAX_SET_HOURS || mm > MAX_SET_MINUTES {
        return Err(InputError::TimeOutOfRange);
    }
    Ok((hh, mm))
}
