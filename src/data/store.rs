//! Key-value persistence for extracted records.
//!
//! The store is an opaque string-keyed map of JSON values. Two well-known
//! keys are used: the full augmented record list and the last-write
//! timestamp. Writers replace the whole store as a unit; readers treat
//! absent keys as "no data yet".

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;

use crate::data::records::MarkRecord;

/// Key holding the full augmented record list.
pub const KEY_RECORDS: &str = "records";
/// Key holding the last-write timestamp, in milliseconds since epoch.
pub const KEY_UPDATED_AT: &str = "updated_at";

/// String-keyed storage of structured values.
pub trait RecordStore {
    /// Retrieve the requested keys. Absent keys are simply left out of the
    /// returned map.
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>>;

    /// Insert or update the given entries.
    fn set(&mut self, entries: HashMap<String, Value>) -> Result<()>;

    /// Remove all stored state unconditionally.
    fn clear(&mut self) -> Result<()>;
}

/// Replace all previously stored records with the new augmented set.
///
/// Clears prior state first, then writes the record list together with the
/// current timestamp. This is the sole write path for record data.
pub fn persist_records(store: &mut dyn RecordStore, records: &[MarkRecord]) -> Result<()> {
    store.clear().context("Failed to clear record store")?;

    let mut entries = HashMap::new();
    entries.insert(
        KEY_RECORDS.to_string(),
        serde_json::to_value(records).context("Failed to serialize records")?,
    );
    entries.insert(
        KEY_UPDATED_AT.to_string(),
        Value::from(Utc::now().timestamp_millis()),
    );
    store.set(entries).context("Failed to write record store")
}

/// Load the stored record list and last-write timestamp.
///
/// Both come back empty/`None` when nothing has been persisted yet.
pub fn load_records(store: &dyn RecordStore) -> Result<(Vec<MarkRecord>, Option<i64>)> {
    let entries = store.get(&[KEY_RECORDS, KEY_UPDATED_AT])?;

    let records = match entries.get(KEY_RECORDS) {
        Some(value) => {
            serde_json::from_value(value.clone()).context("Malformed stored record list")?
        }
        None => Vec::new(),
    };
    let updated_at = entries.get(KEY_UPDATED_AT).and_then(Value::as_i64);

    Ok((records, updated_at))
}

/// Store backed by a single JSON object file.
///
/// A missing file reads as an empty store.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_entries(&self) -> Result<HashMap<String, Value>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("Malformed store file {}", self.path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        }
    }

    fn write_entries(&self, entries: &HashMap<String, Value>) -> Result<()> {
        let text = serde_json::to_string_pretty(entries).context("Failed to serialize store")?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

impl RecordStore for JsonFileStore {
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let mut entries = self.read_entries()?;
        Ok(keys
            .iter()
            .filter_map(|&key| entries.remove(key).map(|value| (key.to_string(), value)))
            .collect())
    }

    fn set(&mut self, new_entries: HashMap<String, Value>) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.extend(new_entries);
        self.write_entries(&entries)
    }

    fn clear(&mut self) -> Result<()> {
        self.write_entries(&HashMap::new())
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl RecordStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        Ok(keys
            .iter()
            .filter_map(|&key| {
                self.entries
                    .get(key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect())
    }

    fn set(&mut self, entries: HashMap<String, Value>) -> Result<()> {
        self.entries.extend(entries);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}
