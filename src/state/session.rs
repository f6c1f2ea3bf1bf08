/// Curation session
///
/// The facade the UI drives. It owns the working set and the store and
/// always reads the current caption log fresh from disk, so what the UI
/// shows matches what was last written.
use std::path::Path;

use super::data::{CurrentView, Entry};
use super::scanner;
use super::store::{CaptionStore, Clock, LocalClock};
use super::weight::weight;
use super::working_set::WorkingSet;
use crate::error::{Error, Result};

pub struct Session<C: Clock = LocalClock> {
    store: CaptionStore<C>,
    set: WorkingSet,
}

/// A scanned and ordered folder, ready to become a session
#[derive(Debug, Clone)]
pub struct Prepared {
    pub set: WorkingSet,
    /// Empty caption logs created by the scan
    pub created_logs: usize,
}

impl<C: Clock> Session<C> {
    /// Scan and order a folder without starting a session
    ///
    /// This is the slow part of opening a folder; the UI runs it on a
    /// blocking worker and hands the result to [`Session::new`].
    pub fn prepare(root: &Path, store: &CaptionStore<C>) -> Result<Prepared> {
        let scan = scanner::scan(root, store)?;
        if scan.entries.is_empty() {
            return Err(Error::EmptyWorkingSet);
        }
        Ok(Prepared {
            set: WorkingSet::build(scan.entries, store)?,
            created_logs: scan.created_logs,
        })
    }

    /// Start a session on an already built working set
    pub fn new(set: WorkingSet, store: CaptionStore<C>) -> Result<Self> {
        if set.is_empty() {
            return Err(Error::EmptyWorkingSet);
        }
        Ok(Self { store, set })
    }

    fn entry(&self) -> Result<&Entry> {
        // new() rejects empty sets, so this only fails on misuse
        self.set.current().ok_or(Error::EmptyWorkingSet)
    }

    /// Current image, its log path and its records
    pub fn current(&self) -> Result<CurrentView> {
        let entry = self.entry()?;
        let records = self.store.load(&entry.log_path)?;
        Ok(CurrentView {
            image_path: entry.image_path.clone(),
            log_path: entry.log_path.clone(),
            records,
            index: self.set.index(),
            total: self.set.len(),
        })
    }

    /// Weight of the current entry, recomputed from its log
    pub fn current_weight(&self) -> Result<i64> {
        let log = self.store.load(&self.entry()?.log_path)?;
        Ok(weight(&log))
    }

    /// Cursor index and working set size
    pub fn position(&self) -> (usize, usize) {
        (self.set.index(), self.set.len())
    }

    /// Record a caption for the current entry and move on
    ///
    /// Empty text writes nothing and just advances. Returns whether a
    /// caption was written.
    pub fn submit_caption(&mut self, text: &str) -> Result<bool> {
        let log_path = self.entry()?.log_path.clone();
        let written = self.store.append(&log_path, text)?;
        if written {
            tracing::info!("💾 Saved caption to {}", log_path.display());
        }
        self.go_next();
        Ok(written)
    }

    /// Exclude the current entry and move on
    pub fn exclude_current(&mut self) -> Result<()> {
        let log_path = self.entry()?.log_path.clone();
        self.store.mark_excluded(&log_path)?;
        tracing::info!("🗑️  Excluded {}", self.entry()?.image_path.display());
        self.go_next();
        Ok(())
    }

    pub fn go_next(&mut self) {
        let index = self.set.advance();
        tracing::debug!(index, "next entry");
    }

    pub fn go_previous(&mut self) {
        let index = self.set.retreat();
        tracing::debug!(index, "previous entry");
    }
}
