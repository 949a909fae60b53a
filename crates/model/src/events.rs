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

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// A pool-liquidity event decoded from a chain log.
///
/// Tick bounds of `Mint`/`Burn` satisfy `tick_lower < tick_upper` and are multiples
/// of the pool's tick spacing; `amount` is non-negative (an on-chain `uint128`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    /// Liquidity added to the range `[tick_lower, tick_upper)`.
    Mint {
        address: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: U256,
    },
    /// Liquidity removed from the range `[tick_lower, tick_upper)`.
    Burn {
        address: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: U256,
    },
    /// Price moved to a new tick; liquidity distribution unchanged.
    Swap { address: Address, tick: i32 },
}

impl PoolEvent {
    /// Returns the address of the pool this event targets.
    #[must_use]
    pub const fn address(&self) -> Address {
        match self {
            Self::Mint { address, .. } | Self::Burn { address, .. } | Self::Swap { address, .. } => {
                *address
            }
        }
    }
}

impl Display for PoolEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mint {
                address,
                tick_lower,
                tick_upper,
                amount,
            } => write!(
                f,
                "Mint(pool={address}, range=[{tick_lower},{tick_upper}), amount={amount})"
            ),
            Self::Burn {
                address,
                tick_lower,
                tick_upper,
                amount,
            } => write!(
                f,
                "Burn(pool={address}, range=[{tick_lower},{tick_upper}), amount={amount})"
            ),
            Self::Swap { address, tick } => write!(f, "Swap(pool={address}, tick={tick})"),
        }
    }
}

/// All pool events of a single block, in source-log order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEvents {
    /// The block height the events were emitted at.
    pub height: u64,
    /// Decoded events, preserving the within-block order of the source logs.
    pub events: Vec<PoolEvent>,
}

impl BlockEvents {
    /// Creates a new [`BlockEvents`] wrapper.
    #[must_use]
    pub const fn new(height: u64, events: Vec<PoolEvent>) -> Self {
        Self { height, events }
    }
}
