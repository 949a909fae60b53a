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

use std::fmt::Display;

use alloy_primitives::U160;
use serde::{Deserialize, Serialize};

use crate::{tick::TickState, token::TokenMeta};

/// Persisted global state of a tracked pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolGlobalState {
    /// The last block height whose events have been applied to this pool.
    pub height: u64,
    /// The pool-wide tick quantum, immutable per pool, always positive.
    pub tick_spacing: i32,
    /// The latest observed price tick.
    pub current_tick: i32,
}

impl PoolGlobalState {
    /// Creates a new [`PoolGlobalState`] instance with the specified properties.
    #[must_use]
    pub const fn new(height: u64, tick_spacing: i32, current_tick: i32) -> Self {
        Self {
            height,
            tick_spacing,
            current_tick,
        }
    }
}

/// Full on-chain snapshot of a pool as returned by the lens contract.
///
/// Carries the extra global fields (`liquidity`, `sqrt_price_x96`) the lens reports
/// beyond what the store persists, plus the complete tick distribution ordered by
/// tick ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    /// Global pool state at the snapshot height.
    pub global: PoolGlobalState,
    /// Current active liquidity reported by the pool.
    pub liquidity: u128,
    /// Current sqrt price as a Q64.96 fixed-point number.
    pub sqrt_price_x96: U160,
    /// Complete tick distribution, ordered by tick ascending.
    pub ticks: Vec<TickState>,
}

/// In-memory aggregate of one pool's stored state, decorated with token metadata.
///
/// This is the payload served by the read API's `liquidity` mode and the input to
/// the depth math.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    /// Global pool state.
    pub global: PoolGlobalState,
    /// All stored ticks of the pool, ordered by tick ascending.
    pub ticks: Vec<TickState>,
    /// Metadata of the pool's token0 (pool order, reversal already applied).
    pub token0: TokenMeta,
    /// Metadata of the pool's token1 (pool order, reversal already applied).
    pub token1: TokenMeta,
}

impl Display for PoolState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PoolState(pair={}/{}, height={}, tick={}, spacing={}, ticks={})",
            self.token0.symbol,
            self.token1.symbol,
            self.global.height,
            self.global.current_tick,
            self.global.tick_spacing,
            self.ticks.len(),
        )
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
