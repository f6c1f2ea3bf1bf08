/// Ordering and cursor navigation
///
/// Entries are sorted once by ascending weight (stable, so equal weights
/// keep scan order) and then navigated as a ring. The startup position
/// skips excluded entries; later navigation visits everything.
use super::data::Entry;
use super::store::{CaptionStore, Clock};
use super::weight::weight;
use crate::error::{Error, Result};

/// The sorted, circular sequence of entries for one session
#[derive(Debug, Clone)]
pub struct WorkingSet {
    entries: Vec<Entry>,
    cursor: usize,
}

impl WorkingSet {
    /// Load every log, sort by weight and pick the starting entry
    pub fn build<C: Clock>(entries: Vec<Entry>, store: &CaptionStore<C>) -> Result<Self> {
        let weighted = entries
            .into_iter()
            .map(|entry| {
                let log = store.load(&entry.log_path)?;
                Ok((entry, weight(&log)))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_weighted(weighted)
    }

    /// Sort pre-weighted entries and skip past excluded ones
    ///
    /// Fails with `NoEligibleEntries` when every entry has a negative
    /// weight, after visiting each entry once.
    pub fn from_weighted(mut weighted: Vec<(Entry, i64)>) -> Result<Self> {
        // sort_by_key is stable
        weighted.sort_by_key(|(_, w)| *w);

        let len = weighted.len();
        let mut cursor = 0;
        let mut skipped = 0;
        while len > 0 && weighted[cursor].1 < 0 {
            skipped += 1;
            if skipped >= len {
                return Err(Error::NoEligibleEntries { count: len });
            }
            cursor = (cursor + 1) % len;
        }

        if len > 0 {
            tracing::info!(
                "Selected entry {} of {} (weight {}), skipped {} excluded",
                cursor,
                len,
                weighted[cursor].1,
                skipped
            );
        }

        Ok(Self {
            entries: weighted.into_iter().map(|(entry, _)| entry).collect(),
            cursor,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current cursor index
    pub fn index(&self) -> usize {
        self.cursor
    }

    /// Entry at the cursor, `None` only for an empty set
    pub fn current(&self) -> Option<&Entry> {
        self.entries.get(self.cursor)
    }

    /// Move forward one entry, wrapping at the end
    pub fn advance(&mut self) -> usize {
        if !self.entries.is_empty() {
            self.cursor = (self.cursor + 1) % self.entries.len();
        }
        self.cursor
    }

    /// Move back one entry, wrapping at the start
    pub fn retreat(&mut self) -> usize {
        let len = self.entries.len();
        if len > 0 {
            self.cursor = (self.cursor + len - 1) % len;
        }
        self.cursor
    }
}
