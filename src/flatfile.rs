// Flat-file operations: one JSON array holding every record

use eyre::{Context, Result};
use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

const INDENT: &[u8] = b"    ";

/// Read all records from a flat file, in file order
///
/// Returns `Ok(None)` when the file does not exist. A file that exists but
/// is not a JSON array of records (including an empty file) is an error.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    if !path.exists() {
        debug!(file = ?path, "Flat file does not exist");
        return Ok(None);
    }

    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<T> =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    info!(file = ?path, count = records.len(), "Loaded records from flat file");

    Ok(Some(records))
}

/// Render records the way they are stored: indented, UTF-8, non-ASCII kept literal
pub fn to_pretty_string<T: Serialize>(records: &[T]) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    records.serialize(&mut ser).context("Failed to serialize records")?;
    buf.push(b'\n');

    String::from_utf8(buf).context("Serialized records are not valid UTF-8")
}

/// Overwrite a flat file with the given records
///
/// The parent directory is created when missing. The whole file is replaced;
/// there is no partial update. The advisory lock is held only for this one
/// write and does not coordinate separate processes that load, edit and save.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let content = to_pretty_string(records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open {} for writing", path.display()))?;

    // Advisory, and only for the duration of this write
    file.lock_exclusive().context("Failed to acquire file lock")?;

    file.set_len(0)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?; // Ensure data is flushed to disk

    // Lock is automatically released when file is dropped
    debug!(file = ?path, count = records.len(), "Wrote records to flat file");

    Ok(())
}
