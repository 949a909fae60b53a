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

//! Token-amount conversion for liquidity ranges (the V3 invariant, read side).
//!
//! All arithmetic is carried in [`BigDecimal`] so the ~320-bit intermediate products
//! of the Q96 sqrt-price math survive the decimal shift without precision loss.
//! For a range `[tL, tU)` with active liquidity `L` and `√p = 1.0001^(t/2) · 2⁹⁶`:
//!
//! ```text
//! amount0 = L · Q · (√b − √a) / (√a · √b) / 10^decimals0
//! amount1 = L · (√b − √a) / Q / 10^decimals1
//! ```

use alloy_primitives::I256;
use bigdecimal::{BigDecimal, One, num_bigint::BigInt};
use serde::{Deserialize, Serialize};

use crate::{liquidity::RangeLiquidity, tick::serde_i256_dec};

/// Decimal digits carried through every intermediate product.
const PRECISION: u64 = 100;

/// Returns the Q96 scale factor `2⁹⁶` as a [`BigDecimal`].
#[must_use]
pub fn q96() -> BigDecimal {
    BigDecimal::from(BigInt::one() << 96usize)
}

/// Raises `base` to `exp` by squaring, rounding every product to [`PRECISION`] digits.
fn pow_prec(base: &BigDecimal, mut exp: u32) -> BigDecimal {
    let mut result = BigDecimal::one();
    let mut square = base.clone();

    while exp > 0 {
        if exp & 1 == 1 {
            result = (&result * &square).with_prec(PRECISION);
        }
        square = (&square * &square).with_prec(PRECISION);
        exp >>= 1;
    }

    result
}

/// Returns `1.0001^(tick/2) · 2⁹⁶`, the Q96-scaled sqrt price at `tick`.
#[must_use]
pub fn sqrt_ratio_x96(tick: i32) -> BigDecimal {
    let base: BigDecimal = "1.0001".parse().expect("valid decimal literal");
    let ratio = pow_prec(&base, tick.unsigned_abs());
    let sqrt = ratio.sqrt().expect("ratio is positive");
    let sqrt = if tick < 0 { sqrt.inverse() } else { sqrt };
    (sqrt * q96()).with_prec(PRECISION)
}

/// Returns `10^decimals` as a [`BigDecimal`].
fn decimals_factor(decimals: u8) -> BigDecimal {
    BigDecimal::new(BigInt::one(), -i64::from(decimals))
}

/// Token amounts held by one liquidity range, denominated in token units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeAmount {
    /// Lower tick bound (inclusive).
    pub tick_lower: i32,
    /// Upper tick bound (exclusive).
    pub tick_upper: i32,
    /// Active liquidity over the range.
    #[serde(with = "serde_i256_dec")]
    pub liquidity: I256,
    /// Amount of token0 held by the range, shifted by token0 decimals.
    pub amount0: BigDecimal,
    /// Amount of token1 held by the range, shifted by token1 decimals.
    pub amount1: BigDecimal,
}

/// Computes the token amounts of a single range.
#[must_use]
pub fn range_amount(
    liquidity: I256,
    tick_lower: i32,
    tick_upper: i32,
    token0_decimals: u8,
    token1_decimals: u8,
) -> RangeAmount {
    let sqrt_a = sqrt_ratio_x96(tick_lower);
    let sqrt_b = sqrt_ratio_x96(tick_upper);
    let l: BigDecimal = liquidity
        .to_string()
        .parse()
        .expect("I256 display is a valid decimal");
    let q = q96();
    let diff = &sqrt_b - &sqrt_a;

    let amount0 = (&l * &q * &diff / (&sqrt_a * &sqrt_b) / decimals_factor(token0_decimals))
        .with_prec(PRECISION);
    let amount1 = (&l * &diff / &q / decimals_factor(token1_decimals)).with_prec(PRECISION);

    RangeAmount {
        tick_lower,
        tick_upper,
        liquidity,
        amount0,
        amount1,
    }
}

/// Computes token amounts for every range, preserving order.
#[must_use]
pub fn range_amounts(
    ranges: &[RangeLiquidity],
    token0_decimals: u8,
    token1_decimals: u8,
) -> Vec<RangeAmount> {
    ranges
        .iter()
        .map(|range| {
            range_amount(
                range.liquidity,
                range.tick_lower,
                range.tick_upper,
                token0_decimals,
                token1_decimals,
            )
        })
        .collect()
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
