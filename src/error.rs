//! Unified error types for the Glucologger firmware.
//!
//! A single `Error` enum that every subsystem can convert into.
//! All variants are `Copy` so they can be passed through the UI state
//! machine and the event sink without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A remote write was malformed (the only recoverable runtime error).
    Input(InputError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(e) => write!(f, "invalid input: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

/// Why a remote write was rejected.
///
/// The UI shows every kind the same way ("Invalid Data"); the distinction
/// only reaches the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// Zero-length write.
    Empty,
    /// Longer than the field allows (`len` is what arrived).
    TooLong { len: usize },
    /// Contains bytes outside printable ASCII.
    NotPrintable,
    /// Not exactly `HH:MM`.
    BadTimeFormat,
    /// `HH:MM` shape but hours > 12 or minutes > 59.
    TimeOutOfRange,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty payload"),
            Self::TooLong { len } => write!(f, "payload too long ({len} bytes)"),
            Self::NotPrintable => write!(f, "payload not printable ASCII"),
            Self::BadTimeFormat => write!(f, "time must be HH:MM"),
            Self::TimeOutOfRange => write!(f, "time out of range"),
        }
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
