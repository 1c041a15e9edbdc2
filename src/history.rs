//! Rolling history of the last `MAX_DATA` readings.
//!
//! Fixed capacity, insertion ordered, oldest first.  When full, a new
//! reading evicts index 0 and everything shifts one slot toward the front.
//! Nothing is persisted; the store starts empty on every boot.

use heapless::{String, Vec};

use crate::clock::Timestamp;
use crate::config::{MAX_DATA, MAX_DATA_LEN};
use crate::error::InputError;

/// One stored reading, at most `MAX_DATA_LEN` printable characters.
pub type Reading = String<MAX_DATA_LEN>;

/// A reading with the clock time it was recorded at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub reading: Reading,
    pub stamp: Timestamp,
}

impl Entry {
    /// The "empty slot" sentinel.
    pub const EMPTY: Self = Self {
        reading: String::new(),
        stamp: Timestamp::UNSET,
    };

    pub fn is_empty(&self) -> bool {
        self.reading.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: Vec<Entry, MAX_DATA>,
}

static EMPTY_ENTRY: Entry = Entry::EMPTY;

impl HistoryStore {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Validate and append a reading, evicting the oldest when full.
    ///
    /// A rejected payload leaves the store untouched.
    pub fn record(&mut self, payload: &[u8], stamp: Timestamp) -> Result<(), InputError> {
        let reading = validate_reading(payload)?;

        if self.entries.is_full() {
            let evicted = self.entries.remove(0);
            log::debug!("history: evicted oldest reading '{}'", evicted.reading);
        }
        // One slot is free after the eviction above.
        let pushed = self.entries.push(Entry { reading, stamp });
        debug_assert!(pushed.is_ok(), "history push after eviction");
        Ok(())
    }

    /// Last successfully recorded entry.
    pub fn most_recent(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Indexed read for the saved-data view.
    ///
    /// Any cursor past the fill level (including past capacity) yields the
    /// empty sentinel rather than an error.
    pub fn get(&self, cursor: usize) -> &Entry {
        self.entries.get(cursor).unwrap_or(&EMPTY_ENTRY)
    }

    /// Drop every entry; the next insertion goes to slot 0.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of filled slots, which is also the next free slot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    /// Filled entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }
}

/// Length and charset checks for a remote-written reading.
pub fn validate_reading(payload: &[u8]) -> Result<Reading, InputError> {
    if payload.is_empty() {
        return Err(InputError::Empty);
    }
    if payload.len() > MAX_DATA_LEN {
        return Err(InputError::TooLong { len: payload.len() });
    }
    if !payload.iter().all(|b| matches!(b, 0x20..=0x7E)) {
        return Err(InputError::NotPrintable);
    }
    let text = core::str::from_utf8(payload).map_err(|_| InputError::NotPrintable)?;
    String::try_from(text).map_err(|()| InputError::TooLong { len: payload.len() })
}
