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

//! Read-through pool state access.
//!
//! A store hit returns persisted state; a miss fetches a lens snapshot, persists it
//! atomically, and returns it. The result is decorated with token metadata from the
//! pair record, honoring `tokens_reversed`.

use std::sync::Arc;

use alloy_primitives::Address;
use thiserror::Error;
use tickstate_model::{PoolSnapshot, PoolState};

use crate::{
    lens::{LensClient, LensError},
    pairs::TtlPairCache,
    store::{SafeStore, StoreError},
};

/// Represents errors that can occur while resolving a pool's state.
#[derive(Debug, Error)]
pub enum PoolStateError {
    /// The pair metadata source does not know the pool.
    #[error("no pair metadata for pool {0}")]
    PairNotFound(Address),
    /// The pair is filtered out of the tracked universe.
    #[error("pair is filtered for pool {0}")]
    PairFiltered(Address),
    /// The pair does not belong to a V3-style pool.
    #[error("pool {0} is not a V3 pool")]
    NotV3Pool(Address),
    /// The lens snapshot failed.
    #[error(transparent)]
    Lens(#[from] LensError),
    /// The persistent store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PoolStateError {
    /// Returns `true` for the business outcomes the reactor ignores per event:
    /// pair unknown, pair filtered, or not a V3 pool.
    #[must_use]
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            Self::PairNotFound(_) | Self::PairFiltered(_) | Self::NotV3Pool(_)
        )
    }

    /// Returns `true` when a first-touch snapshot failed in a way that is permanent
    /// for this attempt but worth retrying on the pool's next event.
    #[must_use]
    pub fn is_snapshot_failure(&self) -> bool {
        matches!(self, Self::Lens(error) if error.is_pool_data_error())
    }
}

/// Read-through accessor combining store, lens, and pair metadata.
#[derive(Debug)]
pub struct PoolStateReader {
    store: Arc<SafeStore>,
    lens: Arc<LensClient>,
    pairs: Arc<TtlPairCache>,
}

impl PoolStateReader {
    /// Creates a new [`PoolStateReader`].
    #[must_use]
    pub fn new(store: Arc<SafeStore>, lens: Arc<LensClient>, pairs: Arc<TtlPairCache>) -> Self {
        Self { store, lens, pairs }
    }

    /// Returns the shared store handle.
    #[must_use]
    pub fn store(&self) -> &Arc<SafeStore> {
        &self.store
    }

    /// Resolves the pair record for `address`, applying the tracking filter.
    ///
    /// # Errors
    ///
    /// Returns one of the ignorable errors when the pool is not tracked.
    pub async fn tracked_pair(
        &self,
        address: &Address,
    ) -> Result<tickstate_model::Pair, PoolStateError> {
        let pair = self
            .pairs
            .get_pair(address)
            .await
            .ok_or(PoolStateError::PairNotFound(*address))?;

        if pair.filtered {
            return Err(PoolStateError::PairFiltered(*address));
        }
        if !pair.is_v3() {
            return Err(PoolStateError::NotV3Pool(*address));
        }

        Ok(pair)
    }

    /// Fetches a lens snapshot for `address` and persists it atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the lens call or the store write fails.
    pub async fn materialize(&self, address: &Address) -> Result<PoolSnapshot, PoolStateError> {
        let snapshot = self.lens.fetch_snapshot(address).await?;
        self.store.set_pool_state(address, &snapshot)?;
        tracing::info!(
            "Materialized pool {address} at height {} with {} ticks",
            snapshot.global.height,
            snapshot.ticks.len(),
        );
        Ok(snapshot)
    }

    /// Returns the pool's state: store hit → persisted state; miss → snapshot,
    /// persisted and returned. Token metadata is decorated from the pair record.
    ///
    /// # Errors
    ///
    /// Returns an error when the pool is untracked, or when the store or the lens
    /// fails.
    pub async fn get_pool_state(&self, address: &Address) -> Result<PoolState, PoolStateError> {
        let pair = self.tracked_pair(address).await?;

        let (global, ticks) = if self.store.pool_exists(address)? {
            self.store.pool_state(address)?
        } else {
            let snapshot = self.materialize(address).await?;
            (snapshot.global, snapshot.ticks)
        };

        let (token0, token1) = pair.oriented_tokens();
        Ok(PoolState {
            global,
            ticks,
            token0: token0.clone(),
            token1: token1.clone(),
        })
    }
}
