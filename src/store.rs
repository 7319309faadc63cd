// src/store.rs

use crate::error::Result;
use crate::model::*;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

/// Durable byte store keyed by asset path
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS assets (
                key   TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );",
        )?;
        debug!("Opened asset cache at {}", path.display());
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row("SELECT value FROM assets WHERE key = ?1", params![key], |row| row.get::<_, Vec<u8>>(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO assets (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM assets ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Result of looking an asset up in the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(AssetRecord),
    NotCached,
    /// An entry exists but was written by an incompatible build
    Undecodable,
}

/// Typed view over a [`KeyValueStore`]; the only writer of asset records
pub struct AssetStore<S> {
    backend: S,
}

impl<S: KeyValueStore> AssetStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn lookup(&self, key: &str) -> Result<Lookup> {
        let Some(bytes) = self.backend.get(key)? else {
            return Ok(Lookup::NotCached);
        };
        Ok(match serde_json::from_slice::<AssetRecord>(&bytes) {
            Ok(record) => Lookup::Found(record),
            Err(err) => {
                debug!("cache entry for {key} is unreadable: {err}");
                Lookup::Undecodable
            }
        })
    }

    pub fn save(&mut self, record: &AssetRecord) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        self.backend.set(&record.location, &bytes)
    }

    /// Assignment is terminal: an already assigned record keeps its document
    pub fn tag_assigned(&mut self, record: &mut AssetRecord, document: DocumentIndex) -> Result<()> {
        if matches!(record.assignment, Assignment::Assigned(_)) {
            return Ok(());
        }
        record.assignment = Assignment::Assigned(document);
        self.save(record)
    }

    pub fn tag_skipped(&mut self, record: &mut AssetRecord) -> Result<()> {
        record.assignment = Assignment::Skipped;
        self.save(record)
    }

    /// Marks every decodable record unassigned again; returns how many changed
    pub fn reset_assignments(&mut self) -> Result<usize> {
        let mut reset = 0;
        for key in self.backend.keys()? {
            if let Lookup::Found(mut record) = self.lookup(&key)? {
                if record.assignment != Assignment::Unassigned {
                    record.assignment = Assignment::Unassigned;
                    self.save(&record)?;
                    reset += 1;
                }
            }
        }
        info!("Reset {reset} cached assignments");
        Ok(reset)
    }
}
