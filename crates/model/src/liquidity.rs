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

//! Prefix-sum liquidity ranges and window selection over stored tick state.
//!
//! Given the ordered ticks `t₀ < t₁ < … < tₙ` of a pool, the active liquidity in the
//! half-open range `[tᵢ, tᵢ₊₁)` is the prefix sum of `liquidity_net` up to and
//! including `tᵢ`. The functions here build those ranges, select the window around
//! the current tick, and optionally split ranges into `tick_spacing`-wide sub-ranges
//! for detailed depth output.

use alloy_primitives::I256;
use serde::{Deserialize, Serialize};

use crate::tick::{TickState, serde_i256_dec};

/// A half-open tick range `[tick_lower, tick_upper)` with its active liquidity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeLiquidity {
    /// Lower tick bound (inclusive).
    pub tick_lower: i32,
    /// Upper tick bound (exclusive).
    pub tick_upper: i32,
    /// Active liquidity over the range.
    #[serde(with = "serde_i256_dec")]
    pub liquidity: I256,
}

/// Computes the depth window `[from, to)` around `current_tick`.
///
/// The center is `current_tick` floored to a multiple of `tick_spacing`, so the
/// window always contains the current tick for any non-negative `tick_offset`:
/// `from = center − offset·spacing`, `to = center + (offset+1)·spacing`.
///
/// # Panics
///
/// Panics if `tick_spacing` is not positive.
#[must_use]
pub fn tick_window(current_tick: i32, tick_offset: i32, tick_spacing: i32) -> (i32, i32) {
    assert!(tick_spacing > 0, "tick_spacing must be positive");
    let center = current_tick.div_euclid(tick_spacing) * tick_spacing;
    (
        center - tick_offset * tick_spacing,
        center + (tick_offset + 1) * tick_spacing,
    )
}

/// Builds the prefix-sum liquidity ranges between consecutive stored ticks.
///
/// `ticks` must be ordered by tick ascending; `n` ticks produce `n − 1` ranges.
#[must_use]
pub fn build_liquidity_ranges(ticks: &[TickState]) -> Vec<RangeLiquidity> {
    let mut ranges = Vec::with_capacity(ticks.len().saturating_sub(1));
    let mut active = I256::ZERO;

    for window in ticks.windows(2) {
        active += window[0].liquidity_net;
        ranges.push(RangeLiquidity {
            tick_lower: window[0].tick,
            tick_upper: window[1].tick,
            liquidity: active,
        });
    }

    ranges
}

/// Keeps the ranges overlapping `[from, to)`, clamped to the window bounds.
#[must_use]
pub fn filter_liquidity_ranges(
    ranges: Vec<RangeLiquidity>,
    from: i32,
    to: i32,
) -> Vec<RangeLiquidity> {
    ranges
        .into_iter()
        .filter(|range| range.tick_upper > from && range.tick_lower < to)
        .map(|mut range| {
            range.tick_lower = range.tick_lower.max(from);
            range.tick_upper = range.tick_upper.min(to);
            range
        })
        .collect()
}

/// Splits each range into `tick_spacing`-wide sub-ranges carrying the same liquidity.
///
/// The final sub-range of an unaligned range is truncated at the range's upper bound.
///
/// # Panics
///
/// Panics if `tick_spacing` is not positive.
#[must_use]
pub fn split_liquidity_ranges(
    ranges: Vec<RangeLiquidity>,
    tick_spacing: i32,
) -> Vec<RangeLiquidity> {
    assert!(tick_spacing > 0, "tick_spacing must be positive");
    let mut out = Vec::with_capacity(ranges.len());

    for range in ranges {
        let mut lower = range.tick_lower;
        while lower < range.tick_upper {
            let upper = range.tick_upper.min(lower.saturating_add(tick_spacing));
            out.push(RangeLiquidity {
                tick_lower: lower,
                tick_upper: upper,
                liquidity: range.liquidity,
            });
            lower = upper;
        }
    }

    out
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn net(value: i64) -> I256 {
        I256::try_from(value).unwrap()
    }

    #[rstest]
    #[case(105, 2, 60, -60, 240)] // spec'd window example
    #[case(105, 0, 60, 60, 120)]
    #[case(0, 1, 10, -10, 20)]
    #[case(-105, 0, 60, -120, -60)]
    #[case(-60, 0, 60, -60, 0)]
    fn test_tick_window(
        #[case] current_tick: i32,
        #[case] tick_offset: i32,
        #[case] tick_spacing: i32,
        #[case] expected_from: i32,
        #[case] expected_to: i32,
    ) {
        let (from, to) = tick_window(current_tick, tick_offset, tick_spacing);
        assert_eq!((from, to), (expected_from, expected_to));
    }

    #[rstest]
    #[case(105, 60)]
    #[case(-105, 60)]
    #[case(-1, 1)]
    #[case(887_271, 200)]
    #[case(-887_272, 10)]
    fn test_tick_window_contains_current_tick(#[case] current_tick: i32, #[case] tick_spacing: i32) {
        for tick_offset in 0..4 {
            let (from, to) = tick_window(current_tick, tick_offset, tick_spacing);
            assert!(from <= current_tick, "from={from} current={current_tick}");
            assert!(current_tick < to, "to={to} current={current_tick}");
        }
    }

    #[rstest]
    fn test_build_liquidity_ranges_prefix_sums() {
        let ticks = vec![
            TickState::new(-120, net(500)),
            TickState::new(-60, net(1000)),
            TickState::new(60, net(-1000)),
            TickState::new(120, net(-500)),
        ];

        let ranges = build_liquidity_ranges(&ticks);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].liquidity, net(500));
        assert_eq!(ranges[1].liquidity, net(1500));
        assert_eq!(ranges[2].liquidity, net(500));
        assert_eq!((ranges[1].tick_lower, ranges[1].tick_upper), (-60, 60));
    }

    #[rstest]
    fn test_build_liquidity_ranges_needs_two_ticks() {
        assert!(build_liquidity_ranges(&[]).is_empty());
        assert!(build_liquidity_ranges(&[TickState::new(0, net(1))]).is_empty());
    }

    #[rstest]
    fn test_filter_clamps_to_window() {
        let ranges = vec![
            RangeLiquidity {
                tick_lower: -600,
                tick_upper: 600,
                liquidity: net(42),
            },
            RangeLiquidity {
                tick_lower: 600,
                tick_upper: 1200,
                liquidity: net(7),
            },
        ];

        let filtered = filter_liquidity_ranges(ranges, -60, 240);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].tick_lower, -60);
        assert_eq!(filtered[0].tick_upper, 240);
        assert_eq!(filtered[0].liquidity, net(42));
    }

    #[rstest]
    fn test_window_filter_split_pipeline() {
        // current_tick = 105, spacing = 60, offset = 2 over a single wide range.
        let ticks = vec![TickState::new(-600, net(1000)), TickState::new(600, net(-1000))];
        let (from, to) = tick_window(105, 2, 60);
        assert_eq!((from, to), (-60, 240));

        let ranges = filter_liquidity_ranges(build_liquidity_ranges(&ticks), from, to);
        let split = split_liquidity_ranges(ranges, 60);

        let bounds: Vec<(i32, i32)> = split.iter().map(|r| (r.tick_lower, r.tick_upper)).collect();
        assert_eq!(
            bounds,
            vec![(-60, 0), (0, 60), (60, 120), (120, 180), (180, 240)]
        );
        assert!(split.iter().all(|r| r.liquidity == net(1000)));
    }

    #[rstest]
    fn test_split_truncates_unaligned_tail() {
        let ranges = vec![RangeLiquidity {
            tick_lower: 0,
            tick_upper: 150,
            liquidity: net(5),
        }];

        let split = split_liquidity_ranges(ranges, 60);
        let bounds: Vec<(i32, i32)> = split.iter().map(|r| (r.tick_lower, r.tick_upper)).collect();
        assert_eq!(bounds, vec![(0, 60), (60, 120), (120, 150)]);
    }
}
