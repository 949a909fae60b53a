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

use std::fmt::{Display, Formatter};

use alloy_primitives::{Address, address};
use serde::{Deserialize, Serialize};

/// Token metadata used to decorate pool state on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    /// The blockchain address of the token contract.
    pub address: Address,
    /// The token's ticker symbol.
    pub symbol: String,
    /// The number of decimal places used to represent fractional token amounts.
    pub decimals: u8,
}

impl TokenMeta {
    /// Creates a new [`TokenMeta`] instance with the specified properties.
    #[must_use]
    pub const fn new(address: Address, symbol: String, decimals: u8) -> Self {
        Self {
            address,
            symbol,
            decimals,
        }
    }
}

impl Display for TokenMeta {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenMeta(symbol={}, address={})", self.symbol, self.address)
    }
}

/// Tether USD on BSC.
pub const USDT: Address = address!("55d398326f99059ff775485246999027b3197955");
/// USD Coin on BSC.
pub const USDC: Address = address!("8ac76a51cc950d9822d68b83fe1ad97b32cd580d");
/// World Liberty Financial USD on BSC.
pub const USD1: Address = address!("8d0d000ee44948fc98c9b98a4fa4921476f08b0d");
/// Binance USD on BSC.
pub const BUSD: Address = address!("e9e7cea3dedca5984780bafc599bd69add087d56");

/// The curated USD stablecoin set used as the arbitrage price base.
pub const USD_STABLECOINS: [Address; 4] = [USDT, USDC, USD1, BUSD];

/// Returns `true` if `address` is one of the tracked USD stablecoins.
#[must_use]
pub fn is_usd_stable(address: &Address) -> bool {
    USD_STABLECOINS.contains(address)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(USDT, true)]
    #[case(USDC, true)]
    #[case(USD1, true)]
    #[case(BUSD, true)]
    #[case(address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c"), false)] // WBNB
    fn test_is_usd_stable(#[case] address: Address, #[case] expected: bool) {
        assert_eq!(is_usd_stable(&address), expected);
    }
}
