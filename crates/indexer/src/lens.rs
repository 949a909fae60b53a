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

//! Snapshot lens contract client.
//!
//! The lens is a read-only on-chain contract returning a pool's global state plus
//! its full tick list in one call. It is the source of the lazy first-touch
//! snapshot: the returned height becomes the pool's initial watermark.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, I256};
use alloy_sol_types::{SolCall, sol};
use thiserror::Error;
use tickstate_model::{PoolGlobalState, PoolSnapshot, TickState};

use crate::rpc::{EvmRpc, RpcClientError, retry::with_retry};

sol! {
    /// Global pool state as reported by the lens.
    struct LensPoolState {
        uint256 height;
        int24 tickSpacing;
        int24 tick;
        uint128 liquidity;
        uint160 sqrtPriceX96;
    }

    /// One initialized tick as reported by the lens.
    struct LensTick {
        int24 index;
        uint128 liquidityGross;
        int128 liquidityNet;
    }

    function getAllTicks(address pool) external view returns (LensPoolState poolState, LensTick[] ticks);
}

/// Represents errors that can occur when fetching a pool snapshot from the lens.
#[derive(Debug, Error)]
pub enum LensError {
    /// The lens call produced no return data (reverted or empty output).
    #[error("lens returned no data for pool {pool}")]
    EmptyOutput { pool: Address },
    /// The lens reported a non-positive tick spacing, a data error for the pool.
    #[error("lens reported tick spacing {tick_spacing} for pool {pool}")]
    ZeroTickSpacing { pool: Address, tick_spacing: i32 },
    /// The return data could not be decoded.
    #[error("failed to decode lens output for pool {pool}: {reason}")]
    Decode { pool: Address, reason: String },
    /// The underlying RPC call failed.
    #[error(transparent)]
    Rpc(#[from] RpcClientError),
}

impl LensError {
    /// Returns `true` if the error describes bad or missing pool data (as opposed
    /// to a transport failure): the event is skipped and the pool retried on its
    /// next event.
    #[must_use]
    pub fn is_pool_data_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyOutput { .. } | Self::ZeroTickSpacing { .. } | Self::Decode { .. }
        )
    }
}

/// Client for the snapshot lens contract.
#[derive(Clone)]
pub struct LensClient {
    rpc: Arc<dyn EvmRpc>,
    address: Address,
}

impl std::fmt::Debug for LensClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LensClient")
            .field("address", &self.address)
            .finish()
    }
}

impl LensClient {
    /// Creates a new [`LensClient`] calling the lens deployed at `address`.
    #[must_use]
    pub fn new(rpc: Arc<dyn EvmRpc>, address: Address) -> Self {
        Self { rpc, address }
    }

    /// Fetches a full snapshot of `pool` from chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails, produces no data, or decodes to an
    /// inconsistent pool state (zero tick spacing).
    pub async fn fetch_snapshot(&self, pool: &Address) -> Result<PoolSnapshot, LensError> {
        let data = Bytes::from(getAllTicksCall { pool: *pool }.abi_encode());

        tracing::info!("Fetching lens snapshot for pool {pool}");
        let raw = with_retry(|| self.rpc.call_contract(self.address, data.clone())).await?;

        let raw = match raw {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Err(LensError::EmptyOutput { pool: *pool }),
        };

        let decoded = getAllTicksCall::abi_decode_returns(&raw).map_err(|e| LensError::Decode {
            pool: *pool,
            reason: e.to_string(),
        })?;

        let tick_spacing = decoded.poolState.tickSpacing.as_i32();
        if tick_spacing <= 0 {
            return Err(LensError::ZeroTickSpacing {
                pool: *pool,
                tick_spacing,
            });
        }

        let height = u64::try_from(decoded.poolState.height).map_err(|_| LensError::Decode {
            pool: *pool,
            reason: "snapshot height exceeds u64".to_string(),
        })?;

        let mut ticks = Vec::with_capacity(decoded.ticks.len());
        for tick in &decoded.ticks {
            let liquidity_net = I256::try_from(tick.liquidityNet).map_err(|e| LensError::Decode {
                pool: *pool,
                reason: format!("liquidity net out of range: {e}"),
            })?;
            ticks.push(TickState::new(tick.index.as_i32(), liquidity_net));
        }
        ticks.sort_by_key(|tick| tick.tick);

        Ok(PoolSnapshot {
            global: PoolGlobalState::new(height, tick_spacing, decoded.poolState.tick.as_i32()),
            liquidity: decoded.poolState.liquidity,
            sqrt_price_x96: decoded.poolState.sqrtPriceX96,
            ticks,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
