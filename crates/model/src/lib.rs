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

//! Domain model for the tickstate indexer.
//!
//! This crate contains the pure data types and math shared by the indexing pipeline
//! and the read-side analytics: tick-level liquidity state, pool global state, pair
//! and token metadata, pipeline events, and the concentrated-liquidity depth math
//! that converts stored tick state into token-denominated amounts.
//!
//! Everything here is free of I/O so it can be exercised directly in unit tests and
//! reused by any front-end (HTTP handlers, report formatters) without pulling in the
//! indexer runtime.

pub mod amounts;
pub mod events;
pub mod liquidity;
pub mod pair;
pub mod state;
pub mod tick;
pub mod token;

pub use amounts::{RangeAmount, range_amounts, sqrt_ratio_x96};
pub use events::{BlockEvents, PoolEvent};
pub use liquidity::{
    RangeLiquidity, build_liquidity_ranges, filter_liquidity_ranges, split_liquidity_ranges,
    tick_window,
};
pub use pair::{PROTOCOL_ID_V3, Pair};
pub use state::{PoolGlobalState, PoolSnapshot, PoolState};
pub use tick::{MAX_TICK, MIN_TICK, TickState};
pub use token::{TokenMeta, is_usd_stable};
