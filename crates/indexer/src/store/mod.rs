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

//! Typed persistent key-value store for per-pool tick state.
//!
//! [`TickStore`] maps the logical keyspaces (watermark, tick spacing, current tick,
//! pool height, per-tick net liquidity) onto the embedded engine. [`SafeStore`] adds
//! the concurrency contract: a grow-only map of per-address readers-writer locks plus
//! a dedicated watermark lock, shared between the single-writer reactor and the many
//! concurrent read-API handlers.

use std::sync::{Arc, RwLock};

use alloy_primitives::Address;
use dashmap::DashMap;
use rocksdb::WriteBatch;
use tickstate_model::{
    PoolGlobalState, PoolSnapshot, TickState,
    tick::TICK_STATE_ENCODED_LEN,
};

pub mod engine;
pub mod keys;

pub use engine::{StoreEngine, StoreError};

use self::keys::{
    current_tick_key, finish_height_key, pool_height_key, tick_spacing_key, tick_state_key,
};

fn decode_u64(key: &[u8], bytes: &[u8]) -> Result<u64, StoreError> {
    let array: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::corrupt(key, format!("expected 8 bytes, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(array))
}

fn decode_i32(key: &[u8], bytes: &[u8]) -> Result<i32, StoreError> {
    let array: [u8; 4] = bytes
        .try_into()
        .map_err(|_| StoreError::corrupt(key, format!("expected 4 bytes, got {}", bytes.len())))?;
    Ok(i32::from_be_bytes(array))
}

/// Typed store over the embedded engine, one logical operation per keyspace.
///
/// Missing numeric keys read as zero; a missing tick state reads as the empty tick.
/// Cross-key atomicity is provided for [`TickStore::set_pool_state`] and
/// [`TickStore::delete_pool_state`], which are single write batches.
#[derive(Debug)]
pub struct TickStore {
    engine: StoreEngine,
}

impl TickStore {
    /// Opens the store at `path`, creating the database if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be opened.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        Ok(Self {
            engine: StoreEngine::open(path)?,
        })
    }

    /// Returns the global finish-height watermark, or zero if never written.
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn finish_height(&self) -> Result<u64, StoreError> {
        let key = finish_height_key();
        match self.engine.get(&key)? {
            Some(bytes) => decode_u64(&key, &bytes),
            None => Ok(0),
        }
    }

    /// Sets the global finish-height watermark.
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn set_finish_height(&self, height: u64) -> Result<(), StoreError> {
        self.engine
            .put(&finish_height_key(), &height.to_be_bytes())
    }

    /// Returns a pool's tick spacing, or zero if the pool is untracked.
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn tick_spacing(&self, address: &Address) -> Result<i32, StoreError> {
        let key = tick_spacing_key(address);
        match self.engine.get(&key)? {
            Some(bytes) => decode_i32(&key, &bytes),
            None => Ok(0),
        }
    }

    /// Sets a pool's tick spacing. Immutable per pool after first write; presence
    /// marks the pool as tracked.
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn set_tick_spacing(&self, address: &Address, tick_spacing: i32) -> Result<(), StoreError> {
        self.engine
            .put(&tick_spacing_key(address), &tick_spacing.to_be_bytes())
    }

    /// Returns a pool's latest observed tick, or zero if never written.
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn current_tick(&self, address: &Address) -> Result<i32, StoreError> {
        let key = current_tick_key(address);
        match self.engine.get(&key)? {
            Some(bytes) => decode_i32(&key, &bytes),
            None => Ok(0),
        }
    }

    /// Sets a pool's latest observed tick.
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn set_current_tick(&self, address: &Address, tick: i32) -> Result<(), StoreError> {
        self.engine
            .put(&current_tick_key(address), &tick.to_be_bytes())
    }

    /// Returns a pool's applied-height watermark, or zero if never written.
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn pool_height(&self, address: &Address) -> Result<u64, StoreError> {
        let key = pool_height_key(address);
        match self.engine.get(&key)? {
            Some(bytes) => decode_u64(&key, &bytes),
            None => Ok(0),
        }
    }

    /// Sets a pool's applied-height watermark.
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn set_pool_height(&self, address: &Address, height: u64) -> Result<(), StoreError> {
        self.engine
            .put(&pool_height_key(address), &height.to_be_bytes())
    }

    /// Returns the tick state at `(address, tick)`, or the empty tick state when the
    /// key is missing (never an error for absence).
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn tick_state(&self, address: &Address, tick: i32) -> Result<TickState, StoreError> {
        let key = tick_state_key(address, tick);
        match self.engine.get(&key)? {
            Some(bytes) => TickState::from_bytes(&bytes)
                .map_err(|e| StoreError::corrupt(&key, e.to_string())),
            None => Ok(TickState::empty(tick)),
        }
    }

    /// Writes the tick state at `(address, tick_state.tick)`.
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn set_tick_state(
        &self,
        address: &Address,
        tick_state: &TickState,
    ) -> Result<(), StoreError> {
        self.engine.put(
            &tick_state_key(address, tick_state.tick),
            &tick_state.to_bytes(),
        )
    }

    /// Returns the pool's tick states over the half-open range `[tick_lower,
    /// tick_upper)`, ordered by tick ascending.
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn tick_states(
        &self,
        address: &Address,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Result<Vec<TickState>, StoreError> {
        let from = tick_state_key(address, tick_lower);
        let to = tick_state_key(address, tick_upper);
        let entries = self.engine.scan(&from, &to)?;

        let mut states = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            if value.len() != TICK_STATE_ENCODED_LEN {
                return Err(StoreError::corrupt(&key, "bad tick state length"));
            }
            states.push(
                TickState::from_bytes(&value)
                    .map_err(|e| StoreError::corrupt(&key, e.to_string()))?,
            );
        }

        Ok(states)
    }

    /// Returns all of the pool's tick states, ordered by tick ascending.
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn all_tick_states(&self, address: &Address) -> Result<Vec<TickState>, StoreError> {
        self.tick_states(address, i32::MIN, i32::MAX)
    }

    /// Returns `true` if the pool is tracked (its tick spacing has been written).
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn pool_exists(&self, address: &Address) -> Result<bool, StoreError> {
        Ok(self.tick_spacing(address)? != 0)
    }

    /// Persists a full pool snapshot in one atomic batch: all ticks plus the global
    /// fields, with the pool height set to the snapshot height.
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn set_pool_state(
        &self,
        address: &Address,
        snapshot: &PoolSnapshot,
    ) -> Result<(), StoreError> {
        let mut batch = WriteBatch::default();

        batch.put(
            pool_height_key(address),
            snapshot.global.height.to_be_bytes(),
        );
        batch.put(
            tick_spacing_key(address),
            snapshot.global.tick_spacing.to_be_bytes(),
        );
        batch.put(
            current_tick_key(address),
            snapshot.global.current_tick.to_be_bytes(),
        );
        for tick_state in &snapshot.ticks {
            batch.put(
                tick_state_key(address, tick_state.tick),
                tick_state.to_bytes(),
            );
        }

        self.engine.write(batch)
    }

    /// Removes every key of the pool in one atomic batch (range-delete over the tick
    /// namespace plus the global fields).
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn delete_pool_state(&self, address: &Address) -> Result<(), StoreError> {
        let mut batch = WriteBatch::default();

        batch.delete(pool_height_key(address));
        batch.delete(tick_spacing_key(address));
        batch.delete(current_tick_key(address));
        batch.delete_range(
            tick_state_key(address, i32::MIN).as_slice(),
            tick_state_key(address, i32::MAX).as_slice(),
        );

        self.engine.write(batch)
    }

    /// Reads a pool's global state and full tick distribution.
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn pool_state(
        &self,
        address: &Address,
    ) -> Result<(PoolGlobalState, Vec<TickState>), StoreError> {
        let global = PoolGlobalState::new(
            self.pool_height(address)?,
            self.tick_spacing(address)?,
            self.current_tick(address)?,
        );
        let ticks = self.all_tick_states(address)?;
        Ok((global, ticks))
    }

    /// Dumps every raw entry in key order (debug tooling).
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn dump_entries(&self) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>, StoreError> {
        self.engine.scan_all()
    }
}

/// Concurrency wrapper around [`TickStore`].
///
/// Operations on one pool are guarded by that pool's readers-writer lock; locks are
/// created on first use and kept for the process lifetime (bounded by the universe
/// of observed pools). The watermark has its own lock.
#[derive(Debug)]
pub struct SafeStore {
    inner: TickStore,
    address_locks: DashMap<Address, Arc<RwLock<()>>>,
    watermark_lock: RwLock<()>,
}

impl SafeStore {
    /// Wraps a typed store with the locking layer.
    #[must_use]
    pub fn new(inner: TickStore) -> Self {
        Self {
            inner,
            address_locks: DashMap::new(),
            watermark_lock: RwLock::new(()),
        }
    }

    /// Opens the store at `path`, creating the database if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be opened.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        Ok(Self::new(TickStore::open(path)?))
    }

    fn lock_for(&self, address: &Address) -> Arc<RwLock<()>> {
        self.address_locks
            .entry(*address)
            .or_default()
            .clone()
    }

    /// See [`TickStore::finish_height`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn finish_height(&self) -> Result<u64, StoreError> {
        let _guard = self.watermark_lock.read().expect("watermark lock poisoned");
        self.inner.finish_height()
    }

    /// See [`TickStore::set_finish_height`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn set_finish_height(&self, height: u64) -> Result<(), StoreError> {
        let _guard = self.watermark_lock.write().expect("watermark lock poisoned");
        self.inner.set_finish_height(height)
    }

    /// See [`TickStore::tick_spacing`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn tick_spacing(&self, address: &Address) -> Result<i32, StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.read().expect("address lock poisoned");
        self.inner.tick_spacing(address)
    }

    /// See [`TickStore::set_tick_spacing`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn set_tick_spacing(&self, address: &Address, tick_spacing: i32) -> Result<(), StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.write().expect("address lock poisoned");
        self.inner.set_tick_spacing(address, tick_spacing)
    }

    /// See [`TickStore::current_tick`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn current_tick(&self, address: &Address) -> Result<i32, StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.read().expect("address lock poisoned");
        self.inner.current_tick(address)
    }

    /// See [`TickStore::set_current_tick`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn set_current_tick(&self, address: &Address, tick: i32) -> Result<(), StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.write().expect("address lock poisoned");
        self.inner.set_current_tick(address, tick)
    }

    /// See [`TickStore::pool_height`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn pool_height(&self, address: &Address) -> Result<u64, StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.read().expect("address lock poisoned");
        self.inner.pool_height(address)
    }

    /// See [`TickStore::set_pool_height`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn set_pool_height(&self, address: &Address, height: u64) -> Result<(), StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.write().expect("address lock poisoned");
        self.inner.set_pool_height(address, height)
    }

    /// See [`TickStore::tick_state`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn tick_state(&self, address: &Address, tick: i32) -> Result<TickState, StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.read().expect("address lock poisoned");
        self.inner.tick_state(address, tick)
    }

    /// See [`TickStore::set_tick_state`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn set_tick_state(
        &self,
        address: &Address,
        tick_state: &TickState,
    ) -> Result<(), StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.write().expect("address lock poisoned");
        self.inner.set_tick_state(address, tick_state)
    }

    /// See [`TickStore::tick_states`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn tick_states(
        &self,
        address: &Address,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Result<Vec<TickState>, StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.read().expect("address lock poisoned");
        self.inner.tick_states(address, tick_lower, tick_upper)
    }

    /// See [`TickStore::all_tick_states`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn all_tick_states(&self, address: &Address) -> Result<Vec<TickState>, StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.read().expect("address lock poisoned");
        self.inner.all_tick_states(address)
    }

    /// See [`TickStore::pool_exists`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn pool_exists(&self, address: &Address) -> Result<bool, StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.read().expect("address lock poisoned");
        self.inner.pool_exists(address)
    }

    /// See [`TickStore::set_pool_state`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn set_pool_state(
        &self,
        address: &Address,
        snapshot: &PoolSnapshot,
    ) -> Result<(), StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.write().expect("address lock poisoned");
        self.inner.set_pool_state(address, snapshot)
    }

    /// See [`TickStore::delete_pool_state`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure.
    pub fn delete_pool_state(&self, address: &Address) -> Result<(), StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.write().expect("address lock poisoned");
        self.inner.delete_pool_state(address)
    }

    /// See [`TickStore::pool_state`].
    ///
    /// # Errors
    ///
    /// Returns an error on engine failure or a corrupt value.
    pub fn pool_state(
        &self,
        address: &Address,
    ) -> Result<(PoolGlobalState, Vec<TickState>), StoreError> {
        let lock = self.lock_for(address);
        let _guard = lock.read().expect("address lock poisoned");
        self.inner.pool_state(address)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
