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

//! Depth query: the library surface behind the read API's pool-state endpoint.
//!
//! `liquidity` returns the raw decorated pool state; `token_amount` converts the
//! window's liquidity ranges to token amounts; `token_amount_detail` additionally
//! splits each range into `tick_spacing`-wide sub-ranges.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tickstate_model::{
    PoolState, RangeAmount, build_liquidity_ranges, filter_liquidity_ranges, range_amounts,
    split_liquidity_ranges, tick_window,
};

use crate::{
    getter::{PoolStateError, PoolStateReader},
    lens::LensError,
};

/// Tick offset applied when the caller omits one.
pub const DEFAULT_TICK_OFFSET: u32 = 10;

/// Output mode of the depth query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, Default,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DepthMode {
    /// Raw stored pool state.
    #[default]
    Liquidity,
    /// Token amounts per liquidity range over the window.
    TokenAmount,
    /// Token amounts per `tick_spacing`-wide sub-range over the window.
    TokenAmountDetail,
}

/// Parameters of a depth query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthQuery {
    /// Pool address.
    pub address: Address,
    /// Half-width of the window in tick-spacing steps; `None` or zero applies
    /// [`DEFAULT_TICK_OFFSET`].
    pub tick_offset: Option<u32>,
    /// Output mode.
    #[serde(default)]
    pub mode: DepthMode,
}

impl DepthQuery {
    fn effective_tick_offset(&self) -> u32 {
        match self.tick_offset {
            None | Some(0) => DEFAULT_TICK_OFFSET,
            Some(offset) => offset,
        }
    }
}

/// Result of a depth query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DepthResponse {
    /// The raw decorated pool state (`liquidity` mode).
    Liquidity(PoolState),
    /// Token amounts over the selected window (`token_amount*` modes).
    TokenAmounts(Vec<RangeAmount>),
}

/// Executes a depth query against the read-through pool state.
///
/// # Errors
///
/// Returns an error when the pool is untracked or state resolution fails.
pub async fn depth_query(
    reader: &PoolStateReader,
    query: &DepthQuery,
) -> Result<DepthResponse, PoolStateError> {
    let state = reader.get_pool_state(&query.address).await?;

    match query.mode {
        DepthMode::Liquidity => Ok(DepthResponse::Liquidity(state)),
        DepthMode::TokenAmount | DepthMode::TokenAmountDetail => {
            let tick_spacing = positive_tick_spacing(&query.address, &state)?;
            let offset = i32::try_from(query.effective_tick_offset()).unwrap_or(i32::MAX);
            let (from, to) = tick_window(state.global.current_tick, offset, tick_spacing);

            let mut ranges =
                filter_liquidity_ranges(build_liquidity_ranges(&state.ticks), from, to);
            if query.mode == DepthMode::TokenAmountDetail {
                ranges = split_liquidity_ranges(ranges, tick_spacing);
            }

            Ok(DepthResponse::TokenAmounts(range_amounts(
                &ranges,
                state.token0.decimals,
                state.token1.decimals,
            )))
        }
    }
}

/// Validates the stored tick spacing before window math.
pub(crate) fn positive_tick_spacing(
    address: &Address,
    state: &PoolState,
) -> Result<i32, PoolStateError> {
    let tick_spacing = state.global.tick_spacing;
    if tick_spacing <= 0 {
        return Err(PoolStateError::Lens(LensError::ZeroTickSpacing {
            pool: *address,
            tick_spacing,
        }));
    }
    Ok(tick_spacing)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
