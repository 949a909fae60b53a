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

use alloy_primitives::I256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum usable tick of a V3-style pool (`TickMath.MIN_TICK`).
pub const MIN_TICK: i32 = -887_272;
/// Maximum usable tick of a V3-style pool (`TickMath.MAX_TICK`).
pub const MAX_TICK: i32 = 887_272;

/// Minimum value representable by an on-chain `int24`.
pub const MIN_INT24: i32 = -8_388_608;
/// Maximum value representable by an on-chain `int24`.
pub const MAX_INT24: i32 = 8_388_607;

/// Represents errors that can occur when decoding a persisted tick state value.
#[derive(Debug, Error)]
pub enum TickStateCodecError {
    #[error("Invalid tick state encoding length {len}, expected {expected}")]
    InvalidLength { len: usize, expected: usize },
}

/// Net liquidity state at a single tick boundary of one pool.
///
/// `liquidity_net` is the signed delta applied to the active liquidity as the price
/// crosses `tick` going upward. A tick whose `liquidity_net` is zero is semantically
/// equivalent to an absent tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickState {
    /// The tick index (an `int24` on chain, transported as `i32`).
    pub tick: i32,
    /// The signed liquidity delta crossing this tick upward.
    #[serde(with = "serde_i256_dec")]
    pub liquidity_net: I256,
}

/// Length in bytes of the binary tick state encoding.
pub const TICK_STATE_ENCODED_LEN: usize = 36;

impl TickState {
    /// Creates a new [`TickState`] with the given net liquidity.
    #[must_use]
    pub const fn new(tick: i32, liquidity_net: I256) -> Self {
        Self {
            tick,
            liquidity_net,
        }
    }

    /// Creates an empty [`TickState`] (zero net liquidity) at the given tick.
    #[must_use]
    pub const fn empty(tick: i32) -> Self {
        Self {
            tick,
            liquidity_net: I256::ZERO,
        }
    }

    /// Returns `true` if this tick carries no net liquidity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.liquidity_net.is_zero()
    }

    /// Adds a signed liquidity delta to this tick.
    pub fn add_liquidity(&mut self, delta: I256) {
        self.liquidity_net += delta;
    }

    /// Encodes the tick state as 4 big-endian tick bytes followed by the 32-byte
    /// big-endian two's-complement `liquidity_net`.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; TICK_STATE_ENCODED_LEN] {
        let mut buf = [0u8; TICK_STATE_ENCODED_LEN];
        buf[..4].copy_from_slice(&self.tick.to_be_bytes());
        buf[4..].copy_from_slice(&self.liquidity_net.to_be_bytes::<32>());
        buf
    }

    /// Decodes a tick state previously produced by [`TickState::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not exactly [`TICK_STATE_ENCODED_LEN`] bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TickStateCodecError> {
        if data.len() != TICK_STATE_ENCODED_LEN {
            return Err(TickStateCodecError::InvalidLength {
                len: data.len(),
                expected: TICK_STATE_ENCODED_LEN,
            });
        }

        let mut tick_bytes = [0u8; 4];
        tick_bytes.copy_from_slice(&data[..4]);
        let mut net_bytes = [0u8; 32];
        net_bytes.copy_from_slice(&data[4..]);

        Ok(Self {
            tick: i32::from_be_bytes(tick_bytes),
            liquidity_net: I256::from_be_bytes::<32>(net_bytes),
        })
    }
}

/// Serializes an [`I256`] as its decimal string representation.
pub(crate) mod serde_i256_dec {
    use core::str::FromStr;

    use alloy_primitives::I256;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &I256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<I256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        I256::from_str(&raw).map_err(D::Error::custom)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
