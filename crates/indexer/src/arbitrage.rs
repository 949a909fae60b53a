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

//! Cross-pool arbitrage analytics over stored tick state.
//!
//! Both pools must pair one of the tracked USD stablecoins; prices are oriented so
//! they quote USD per unit of the non-USD token. The optimal trade size is the
//! smaller of the two pools' current-range non-USD token amounts, and the profit
//! estimate assumes buying the full size in the cheaper pool and selling it in the
//! dearer one.

use std::sync::Arc;

use alloy_primitives::Address;
use bigdecimal::ToPrimitive;
use serde::Serialize;
use strum::Display;
use thiserror::Error;
use tickstate_model::{
    PoolState, build_liquidity_ranges, filter_liquidity_ranges, is_usd_stable, range_amounts,
    tick_window,
};

use crate::{
    depth::positive_tick_spacing,
    getter::{PoolStateError, PoolStateReader},
};

/// Represents errors that can occur during arbitrage analysis.
#[derive(Debug, Error)]
pub enum ArbitrageError {
    /// Pool state could not be resolved.
    #[error(transparent)]
    PoolState(#[from] PoolStateError),
    /// The pool does not pair a tracked USD stablecoin.
    #[error("pool {0} does not pair a tracked USD stablecoin")]
    NotUsdPair(Address),
}

/// Qualitative risk bucket of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Direction of the profitable trade: buy in the cheaper pool, sell in the dearer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Pool1ToPool2,
    Pool2ToPool1,
}

/// Per-pool figures entering the cross-pool comparison.
#[derive(Debug, Clone, Serialize)]
pub struct PoolQuote {
    /// Pool address.
    pub address: Address,
    /// USD price of the non-USD token.
    pub price_usd: f64,
    /// Active liquidity at the current tick (prefix sum, raw units).
    pub liquidity: f64,
    /// Current-range token0 amount.
    pub amount0: f64,
    /// Current-range token1 amount.
    pub amount1: f64,
    /// Current-range amount of the non-USD token.
    #[serde(skip)]
    non_usd_amount: f64,
}

/// Cross-pool arbitrage report.
#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageReport {
    /// First pool's quote.
    pub pool1: PoolQuote,
    /// Second pool's quote.
    pub pool2: PoolQuote,
    /// Absolute price difference as a percentage of pool1's price.
    pub price_diff_percent: f64,
    /// Trade size in non-USD token units.
    pub optimal_trade_size: f64,
    /// Estimated maximum profit in USD.
    pub max_profit_usd: f64,
    /// Profit as a percentage of the USD outlay.
    pub profit_percent: f64,
    /// Qualitative risk bucket.
    pub risk_level: RiskLevel,
    /// Buy-side → sell-side direction.
    pub trade_direction: TradeDirection,
}

/// Analyzer computing cross-pool arbitrage reports via the read-through state.
#[derive(Debug)]
pub struct ArbitrageAnalyzer {
    reader: Arc<PoolStateReader>,
}

impl ArbitrageAnalyzer {
    /// Creates a new [`ArbitrageAnalyzer`].
    #[must_use]
    pub fn new(reader: Arc<PoolStateReader>) -> Self {
        Self { reader }
    }

    /// Analyzes the opportunity between two pools.
    ///
    /// # Errors
    ///
    /// Returns an error when either pool is untracked, fails state resolution, or
    /// does not pair a tracked USD stablecoin.
    pub async fn analyze(
        &self,
        pool1: Address,
        pool2: Address,
    ) -> Result<ArbitrageReport, ArbitrageError> {
        let state1 = self.reader.get_pool_state(&pool1).await?;
        let state2 = self.reader.get_pool_state(&pool2).await?;

        let quote1 = pool_quote(&pool1, &state1)?;
        let quote2 = pool_quote(&pool2, &state2)?;

        let price_diff = (quote1.price_usd - quote2.price_usd).abs();
        let price_diff_percent = if quote1.price_usd == 0.0 {
            0.0
        } else {
            price_diff / quote1.price_usd * 100.0
        };

        let (buy, sell, trade_direction) = if quote1.price_usd <= quote2.price_usd {
            (&quote1, &quote2, TradeDirection::Pool1ToPool2)
        } else {
            (&quote2, &quote1, TradeDirection::Pool2ToPool1)
        };

        let optimal_trade_size = quote1.non_usd_amount.min(quote2.non_usd_amount);
        let max_profit_usd = optimal_trade_size * (sell.price_usd - buy.price_usd);
        let outlay = optimal_trade_size * buy.price_usd;
        let profit_percent = if outlay == 0.0 {
            0.0
        } else {
            max_profit_usd / outlay * 100.0
        };

        let risk_level = assess_risk(price_diff_percent, quote1.liquidity, quote2.liquidity);

        Ok(ArbitrageReport {
            pool1: quote1,
            pool2: quote2,
            price_diff_percent,
            optimal_trade_size,
            max_profit_usd,
            profit_percent,
            risk_level,
            trade_direction,
        })
    }
}

/// Builds a pool's quote: USD-oriented price, active liquidity, and current-range
/// token amounts (tick offset zero).
fn pool_quote(address: &Address, state: &PoolState) -> Result<PoolQuote, ArbitrageError> {
    let usd_is_token0 = is_usd_stable(&state.token0.address);
    let usd_is_token1 = is_usd_stable(&state.token1.address);
    if !usd_is_token0 && !usd_is_token1 {
        return Err(ArbitrageError::NotUsdPair(*address));
    }

    let tick_spacing = positive_tick_spacing(address, state).map_err(ArbitrageError::PoolState)?;
    let current_tick = state.global.current_tick;

    // Raw pool price is token1 per token0; shift into human units before orienting.
    let decimal_shift =
        f64::powi(10.0, i32::from(state.token0.decimals) - i32::from(state.token1.decimals));
    let raw_price = 1.0001_f64.powf(f64::from(current_tick)) * decimal_shift;
    let price_usd = if usd_is_token1 { raw_price } else { 1.0 / raw_price };

    let center = current_tick.div_euclid(tick_spacing) * tick_spacing;
    let liquidity = state
        .ticks
        .iter()
        .filter(|tick| tick.tick <= center)
        .fold(0.0_f64, |sum, tick| {
            sum + tick
                .liquidity_net
                .to_string()
                .parse::<f64>()
                .unwrap_or(0.0)
        });

    let (from, to) = tick_window(current_tick, 0, tick_spacing);
    let ranges = filter_liquidity_ranges(build_liquidity_ranges(&state.ticks), from, to);
    let amounts = range_amounts(&ranges, state.token0.decimals, state.token1.decimals);

    let (amount0, amount1) = amounts.first().map_or((0.0, 0.0), |amount| {
        (
            amount.amount0.to_f64().unwrap_or(0.0),
            amount.amount1.to_f64().unwrap_or(0.0),
        )
    });

    let non_usd_amount = if usd_is_token1 { amount0 } else { amount1 };

    Ok(PoolQuote {
        address: *address,
        price_usd,
        liquidity,
        amount0,
        amount1,
        non_usd_amount,
    })
}

/// Risk bucketing on price divergence and both pools' active liquidity.
fn assess_risk(price_diff_percent: f64, liquidity1: f64, liquidity2: f64) -> RiskLevel {
    if price_diff_percent > 1.0 && liquidity1 > 1000.0 && liquidity2 > 1000.0 {
        RiskLevel::Low
    } else if price_diff_percent > 0.5 && liquidity1 > 500.0 && liquidity2 > 500.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use alloy_primitives::{I256, address};
    use rstest::rstest;
    use tickstate_model::{PoolGlobalState, TickState, TokenMeta, token};

    use super::*;

    const POOL: Address = address!("36696169c63e42cd08ce11f5deebbcebae652050");

    fn usd_pool_state(current_tick: i32) -> PoolState {
        PoolState {
            global: PoolGlobalState::new(100, 60, current_tick),
            ticks: vec![
                TickState::new(-600, I256::try_from(5_000_000i64).unwrap()),
                TickState::new(600, I256::try_from(-5_000_000i64).unwrap()),
            ],
            token0: TokenMeta::new(
                address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c"),
                "WBNB".to_string(),
                18,
            ),
            token1: TokenMeta::new(token::USDT, "USDT".to_string(), 18),
        }
    }

    #[rstest]
    fn test_quote_orients_price_on_usd_token1() {
        let state = usd_pool_state(0);
        let quote = pool_quote(&POOL, &state).unwrap();
        assert!((quote.price_usd - 1.0).abs() < 1e-9);
        assert!(quote.liquidity > 0.0);
        assert!(quote.amount0 > 0.0);
        assert!(quote.amount1 > 0.0);
    }

    #[rstest]
    fn test_quote_inverts_price_when_usd_is_token0() {
        let mut state = usd_pool_state(6932); // ~ price 2.0
        std::mem::swap(&mut state.token0, &mut state.token1);
        let quote = pool_quote(&POOL, &state).unwrap();
        assert!((quote.price_usd - 0.5).abs() < 1e-3);
    }

    #[rstest]
    fn test_quote_rejects_non_usd_pair() {
        let mut state = usd_pool_state(0);
        state.token1 = TokenMeta::new(
            address!("2170ed0880ac9a755fd29b2688956bd959f933f8"),
            "WETH".to_string(),
            18,
        );
        assert!(matches!(
            pool_quote(&POOL, &state),
            Err(ArbitrageError::NotUsdPair(_))
        ));
    }

    #[rstest]
    #[case(2.0, 5000.0, 5000.0, RiskLevel::Low)]
    #[case(0.8, 800.0, 800.0, RiskLevel::Medium)]
    #[case(2.0, 100.0, 5000.0, RiskLevel::High)]
    #[case(0.1, 5000.0, 5000.0, RiskLevel::High)]
    fn test_assess_risk(
        #[case] diff: f64,
        #[case] liquidity1: f64,
        #[case] liquidity2: f64,
        #[case] expected: RiskLevel,
    ) {
        assert_eq!(assess_risk(diff, liquidity1, liquidity2), expected);
    }

    #[rstest]
    fn test_risk_level_renders_upper_case() {
        assert_eq!(RiskLevel::Low.to_string(), "LOW");
        assert_eq!(RiskLevel::High.to_string(), "HIGH");
        assert_eq!(
            TradeDirection::Pool1ToPool2.to_string(),
            "pool1_to_pool2"
        );
    }
}
