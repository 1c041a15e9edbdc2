//! Character-display rendering: pure composition plus a diffing writer.

pub mod screen;
pub mod writer;
