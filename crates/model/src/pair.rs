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

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::token::TokenMeta;

/// Protocol identifier of concentrated-liquidity (V3-style) pools in the pair
/// metadata source. Only pools with this protocol id are tracked.
pub const PROTOCOL_ID_V3: u8 = 3;

/// Pair metadata record supplied by the external read-only metadata cache.
///
/// The stored `token0`/`token1` order may not match the on-chain pool order; when
/// `tokens_reversed` is set the two are swapped on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    /// The blockchain address of the pool contract.
    pub address: Address,
    /// Metadata of the pair's first token as recorded by the metadata source.
    pub token0: TokenMeta,
    /// Metadata of the pair's second token as recorded by the metadata source.
    pub token1: TokenMeta,
    /// Whether the recorded token order is reversed relative to the pool contract.
    pub tokens_reversed: bool,
    /// AMM protocol identifier (see [`PROTOCOL_ID_V3`]).
    pub protocol_id: u8,
    /// Whether the pair has been filtered out of the tracked universe.
    pub filtered: bool,
}

impl Pair {
    /// Returns `true` if this pair belongs to a V3-style pool.
    #[must_use]
    pub fn is_v3(&self) -> bool {
        self.protocol_id == PROTOCOL_ID_V3
    }

    /// Returns the pair's tokens in on-chain pool order, applying `tokens_reversed`.
    #[must_use]
    pub fn oriented_tokens(&self) -> (&TokenMeta, &TokenMeta) {
        if self.tokens_reversed {
            (&self.token1, &self.token0)
        } else {
            (&self.token0, &self.token1)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn pair() -> Pair {
        Pair {
            address: address!("36696169c63e42cd08ce11f5deebbcebae652050"),
            token0: TokenMeta::new(
                address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c"),
                "WBNB".to_string(),
                18,
            ),
            token1: TokenMeta::new(
                address!("55d398326f99059ff775485246999027b3197955"),
                "USDT".to_string(),
                18,
            ),
            tokens_reversed: false,
            protocol_id: PROTOCOL_ID_V3,
            filtered: false,
        }
    }

    #[rstest]
    fn test_is_v3(pair: Pair) {
        assert!(pair.is_v3());

        let v2 = Pair {
            protocol_id: 2,
            ..pair
        };
        assert!(!v2.is_v3());
    }

    #[rstest]
    fn test_oriented_tokens_applies_reversal(mut pair: Pair) {
        let (token0, token1) = pair.oriented_tokens();
        assert_eq!(token0.symbol, "WBNB");
        assert_eq!(token1.symbol, "USDT");

        pair.tokens_reversed = true;
        let (token0, token1) = pair.oriented_tokens();
        assert_eq!(token0.symbol, "USDT");
        assert_eq!(token1.symbol, "WBNB");
    }
}
