// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Thin wrapper over the embedded RocksDB engine.
//!
//! Exposes exactly the primitives the typed store needs: point get/put/delete,
//! forward range scans over `[from, to)`, and atomic write batches (including range
//! deletes). Everything above this module works with logical keys and values only.

use std::path::Path;

use rocksdb::{DB, Direction, IteratorMode, Options, WriteBatch};
use thiserror::Error;

/// Represents errors raised by the persistent store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying storage engine failed (I/O, corruption, resource limits).
    #[error("storage engine error: {0}")]
    Engine(#[from] rocksdb::Error),
    /// A stored value does not decode as its keyspace's type.
    #[error("corrupt value at key 0x{key}: {reason}")]
    CorruptValue { key: String, reason: String },
}

impl StoreError {
    pub(crate) fn corrupt(key: &[u8], reason: impl Into<String>) -> Self {
        Self::CorruptValue {
            key: hex_string(key),
            reason: reason.into(),
        }
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Embedded ordered key-value engine backing the tick store.
pub struct StoreEngine {
    db: DB,
}

impl std::fmt::Debug for StoreEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreEngine")
            .field("path", &self.db.path())
            .finish()
    }
}

impl StoreEngine {
    /// Opens (creating if missing) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut options = Options::default();
        options.create_if_missing(true);
        let db = DB::open(&options, path)?;
        Ok(Self { db })
    }

    /// Reads the value stored at `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine read fails.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?)
    }

    /// Writes `value` at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine write fails.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        Ok(self.db.put(key, value)?)
    }

    /// Deletes the value at `key` (no-op if absent).
    ///
    /// # Errors
    ///
    /// Returns an error if the engine write fails.
    pub fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        Ok(self.db.delete(key)?)
    }

    /// Applies a write batch atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine write fails.
    pub fn write(&self, batch: WriteBatch) -> Result<(), StoreError> {
        Ok(self.db.write(batch)?)
    }

    /// Scans keys in `[from, to)` in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if iteration fails.
    pub fn scan(&self, from: &[u8], to: &[u8]) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>, StoreError> {
        let mut entries = Vec::new();

        for entry in self
            .db
            .iterator(IteratorMode::From(from, Direction::Forward))
        {
            let (key, value) = entry?;
            if key.as_ref() >= to {
                break;
            }
            entries.push((key, value));
        }

        Ok(entries)
    }

    /// Scans the entire database in key order (debug tooling).
    ///
    /// # Errors
    ///
    /// Returns an error if iteration fails.
    pub fn scan_all(&self) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>, StoreError> {
        let mut entries = Vec::new();
        for entry in self.db.iterator(IteratorMode::Start) {
            entries.push(entry?);
        }
        Ok(entries)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_point_operations() {
        let dir = tempfile::tempdir().unwrap();
        let engine = StoreEngine::open(dir.path()).unwrap();

        assert_eq!(engine.get(b"k").unwrap(), None);
        engine.put(b"k", b"v").unwrap();
        assert_eq!(engine.get(b"k").unwrap(), Some(b"v".to_vec()));
        engine.delete(b"k").unwrap();
        assert_eq!(engine.get(b"k").unwrap(), None);
    }

    #[rstest]
    fn test_scan_is_half_open_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let engine = StoreEngine::open(dir.path()).unwrap();

        for key in [b"a1", b"a2", b"a3", b"b1"] {
            engine.put(key, b"x").unwrap();
        }

        let entries = engine.scan(b"a1", b"a3").unwrap();
        let keys: Vec<&[u8]> = entries.iter().map(|(k, _)| k.as_ref()).collect();
        assert_eq!(keys, vec![b"a1".as_slice(), b"a2".as_slice()]);
    }

    #[rstest]
    fn test_batch_with_range_delete_is_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let engine = StoreEngine::open(dir.path()).unwrap();

        for key in [b"a1", b"a2", b"a3"] {
            engine.put(key, b"x").unwrap();
        }

        let mut batch = WriteBatch::default();
        batch.put(b"b1", b"y");
        batch.delete_range(b"a1".as_slice(), b"a3".as_slice());
        engine.write(batch).unwrap();

        assert_eq!(engine.get(b"a1").unwrap(), None);
        assert_eq!(engine.get(b"a2").unwrap(), None);
        assert_eq!(engine.get(b"a3").unwrap(), Some(b"x".to_vec()));
        assert_eq!(engine.get(b"b1").unwrap(), Some(b"y".to_vec()));
    }
}
