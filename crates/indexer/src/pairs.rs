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

//! Pair metadata source and its in-memory TTL cache.
//!
//! Pair metadata is owned by an external read-only key-value service; the pipeline
//! only consumes it. A miss means "do not track" and never blocks or fails the
//! pipeline. [`TtlPairCache`] fronts the source with an in-memory L1 whose entries
//! expire after 24 hours; cache writes are atomic replacement.

use std::{
    path::Path,
    sync::RwLock,
    time::{Duration, Instant},
};

use ahash::AHashMap;
use alloy_primitives::Address;
use async_trait::async_trait;
use tickstate_model::Pair;

/// Lifetime of an L1 cache entry.
pub const PAIR_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Read-only source of pair metadata.
#[async_trait]
pub trait PairSource: Send + Sync {
    /// Returns the pair record for `address`, or `None` when unknown.
    async fn get_pair(&self, address: &Address) -> Option<Pair>;
}

/// Pair source backed by a fixed in-memory map, loadable from a JSON file.
#[derive(Debug, Default)]
pub struct StaticPairSource {
    pairs: AHashMap<Address, Pair>,
}

impl StaticPairSource {
    /// Creates a source holding the given pairs.
    #[must_use]
    pub fn new(pairs: impl IntoIterator<Item = Pair>) -> Self {
        Self {
            pairs: pairs.into_iter().map(|pair| (pair.address, pair)).collect(),
        }
    }

    /// Loads a source from a JSON array of pair records.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let pairs: Vec<Pair> = serde_json::from_str(&raw)?;
        Ok(Self::new(pairs))
    }

    /// Returns the number of known pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if the source holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[async_trait]
impl PairSource for StaticPairSource {
    async fn get_pair(&self, address: &Address) -> Option<Pair> {
        self.pairs.get(address).cloned()
    }
}

/// In-memory TTL cache fronting a [`PairSource`].
pub struct TtlPairCache {
    source: std::sync::Arc<dyn PairSource>,
    ttl: Duration,
    entries: RwLock<AHashMap<Address, (Pair, Instant)>>,
}

impl std::fmt::Debug for TtlPairCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlPairCache")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TtlPairCache {
    /// Creates a cache over `source` with the given entry lifetime.
    #[must_use]
    pub fn new(source: std::sync::Arc<dyn PairSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: RwLock::new(AHashMap::new()),
        }
    }

    /// Returns the pair record for `address`, serving fresh entries from the L1
    /// and falling back to the source. Misses are not cached.
    pub async fn get_pair(&self, address: &Address) -> Option<Pair> {
        {
            let entries = self.entries.read().expect("pair cache lock poisoned");
            if let Some((pair, cached_at)) = entries.get(address) {
                if cached_at.elapsed() < self.ttl {
                    return Some(pair.clone());
                }
            }
        }

        let pair = self.source.get_pair(address).await?;

        let mut entries = self.entries.write().expect("pair cache lock poisoned");
        entries.insert(*address, (pair.clone(), Instant::now()));
        Some(pair)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
