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

//! Single-threaded event reactor: applies pool events to the store in strict
//! ascending block order.
//!
//! Per event: resolve the pair (unknown, filtered, or non-V3 pairs are ignored),
//! materialize a lens snapshot on first touch, drop events at or below the pool's
//! applied height (replay/snapshot idempotence guard), then apply. Per block:
//! advance the touched pools' heights, then the global watermark, exactly once.
//!
//! A snapshot whose height is beyond an in-flight event silently discards that
//! event via the stale guard; the ordered stream delivers the state the snapshot
//! already contains. Chain re-orgs are never rolled back.

use std::sync::Arc;

use ahash::AHashSet;
use alloy_primitives::{Address, I256, U256};
use tickstate_model::{BlockEvents, PoolEvent};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    error::IndexerError,
    getter::PoolStateReader,
    reporting::BlockSyncReporter,
    store::{SafeStore, StoreError},
};

const BLOCKS_PER_PROGRESS_REPORT: u64 = 10_000;

/// Applies ordered block events to the persistent per-pool state.
#[derive(Debug)]
pub struct EventReactor {
    store: Arc<SafeStore>,
    reader: Arc<PoolStateReader>,
}

impl EventReactor {
    /// Creates a new [`EventReactor`].
    #[must_use]
    pub fn new(store: Arc<SafeStore>, reader: Arc<PoolStateReader>) -> Self {
        Self { store, reader }
    }

    /// Spawns the reactor task consuming `input` until it closes.
    ///
    /// The task resolves with an error when a fatal store or RPC failure occurs;
    /// the watermark prevents replay of committed blocks on restart.
    #[must_use]
    pub fn spawn(self, input: mpsc::Receiver<BlockEvents>) -> JoinHandle<Result<(), IndexerError>> {
        tokio::spawn(self.run(input))
    }

    async fn run(self, mut input: mpsc::Receiver<BlockEvents>) -> Result<(), IndexerError> {
        let mut reporter: Option<BlockSyncReporter> = None;

        while let Some(block) = input.recv().await {
            self.process_block(&block).await?;

            let reporter = reporter
                .get_or_insert_with(|| BlockSyncReporter::new(block.height, BLOCKS_PER_PROGRESS_REPORT));
            reporter.update();
            if reporter.should_log_progress(block.height) {
                reporter.log_progress(block.height);
            }
        }

        if let Some(reporter) = reporter {
            reporter.log_final_stats();
        }
        tracing::info!("Reactor input drained");
        Ok(())
    }

    /// Processes one block: applies every event, then advances the touched pools'
    /// heights and the global watermark.
    ///
    /// # Errors
    ///
    /// Returns an error on store failure or non-ignorable RPC failure.
    pub async fn process_block(&self, block: &BlockEvents) -> Result<(), IndexerError> {
        let mut touched: AHashSet<Address> = AHashSet::new();

        for event in &block.events {
            if self.process_event(block.height, event).await? {
                touched.insert(event.address());
            }
        }

        // Pool heights advance only after every event of the block has been applied,
        // otherwise later events of the same block would trip the stale guard.
        for address in &touched {
            self.store.set_pool_height(address, block.height)?;
        }

        self.store.set_finish_height(block.height)?;
        tracing::debug!(
            "Processed block {} ({} events, {} pools)",
            block.height,
            block.events.len(),
            touched.len(),
        );
        Ok(())
    }

    /// Processes one event, returning `true` if it was applied to its pool.
    async fn process_event(&self, height: u64, event: &PoolEvent) -> Result<bool, IndexerError> {
        let address = event.address();

        match self.reader.tracked_pair(&address).await {
            Ok(_) => {}
            Err(error) if error.is_ignorable() => return Ok(false),
            Err(error) => return Err(error.into()),
        }

        if self.store.pool_height(&address)? == 0 {
            match self.reader.materialize(&address).await {
                Ok(_) => {}
                Err(error) if error.is_snapshot_failure() => {
                    tracing::warn!(
                        "Snapshot failed for pool {address} at block {height}: {error}, \
                         skipping event"
                    );
                    return Ok(false);
                }
                Err(error) => return Err(error.into()),
            }
        }

        // Idempotence guard: events already covered by the stored state (a replayed
        // block, or a snapshot taken at a later height) are dropped.
        if height <= self.store.pool_height(&address)? {
            return Ok(false);
        }

        match event {
            PoolEvent::Mint {
                tick_lower,
                tick_upper,
                amount,
                ..
            } => {
                let Some(amount) = to_signed(*amount) else {
                    tracing::warn!("Mint amount out of range for pool {address}, dropping");
                    return Ok(false);
                };
                self.apply_liquidity(&address, *tick_lower, amount)?;
                self.apply_liquidity(&address, *tick_upper, -amount)?;
            }
            PoolEvent::Burn {
                tick_lower,
                tick_upper,
                amount,
                ..
            } => {
                let Some(amount) = to_signed(*amount) else {
                    tracing::warn!("Burn amount out of range for pool {address}, dropping");
                    return Ok(false);
                };
                self.apply_liquidity(&address, *tick_lower, -amount)?;
                self.apply_liquidity(&address, *tick_upper, amount)?;
            }
            PoolEvent::Swap { tick, .. } => {
                self.store.set_current_tick(&address, *tick)?;
            }
        }

        Ok(true)
    }

    fn apply_liquidity(&self, address: &Address, tick: i32, delta: I256) -> Result<(), StoreError> {
        let mut state = self.store.tick_state(address, tick)?;
        state.add_liquidity(delta);
        self.store.set_tick_state(address, &state)
    }
}

fn to_signed(amount: U256) -> Option<I256> {
    I256::try_from(amount).ok()
}
