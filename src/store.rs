// Flat-file store: an owned, ordered sequence of records backed by one file

use crate::flatfile;
use crate::record::Record;
use eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of a successful [`Store::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loaded {
    /// The file existed and held this many records
    Found(usize),
    /// No file yet; the store is empty
    Missing,
}

/// In-memory record sequence mirrored to a single flat file
///
/// Loading replaces the sequence wholesale and saving overwrites the file
/// wholesale. Nothing is written until [`Store::save`] is called.
#[derive(Debug)]
pub struct Store<R: Record> {
    path: PathBuf,
    records: Vec<R>,
}

impl<R: Record> Store<R> {
    /// Create an empty store for the given file without touching disk
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            records: Vec::new(),
        }
    }

    /// Create a store and load it in one step
    ///
    /// A missing file yields an empty store; a malformed one is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory sequence with the file contents
    ///
    /// On any read or parse error the sequence is left empty and the error
    /// is returned.
    pub fn load(&mut self) -> Result<Loaded> {
        match flatfile::read_records(&self.path) {
            Ok(Some(records)) => {
                let count = records.len();
                self.records = records;
                Ok(Loaded::Found(count))
            }
            Ok(None) => {
                info!(file = ?self.path, "No data file found, starting empty");
                self.records.clear();
                Ok(Loaded::Missing)
            }
            Err(e) => {
                warn!(file = ?self.path, error = ?e, "Failed to load data file, starting empty");
                self.records.clear();
                Err(e)
            }
        }
    }

    /// Overwrite the file with the in-memory sequence
    pub fn save(&self) -> Result<()> {
        flatfile::write_records(&self.path, &self.records)
            .wrap_err_with(|| format!("Failed to save {}", self.path.display()))?;
        debug!(file = ?self.path, count = self.records.len(), "Saved store");
        Ok(())
    }

    /// Current in-memory sequence
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut Vec<R> {
        &mut self.records
    }

    /// Replace the in-memory sequence; no validation is done
    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = records;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
