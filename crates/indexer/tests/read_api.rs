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

//! Read-side integration tests: read-through getter, depth queries, arbitrage.

mod common;

use alloy_primitives::{I256, U160};
use common::{LENS, POOL, POOL2, TestEnv, usdt_pair};
use rstest::rstest;
use tickstate_indexer::{
    arbitrage::{ArbitrageAnalyzer, TradeDirection},
    depth::{DepthMode, DepthQuery, DepthResponse, depth_query},
    getter::PoolStateError,
};
use tickstate_model::{PoolGlobalState, PoolSnapshot, TickState};

fn net(value: i64) -> I256 {
    I256::try_from(value).unwrap()
}

fn seed_pool(env: &TestEnv, pool: alloy_primitives::Address, current_tick: i32) {
    env.store
        .set_pool_state(
            &pool,
            &PoolSnapshot {
                global: PoolGlobalState::new(100, 60, current_tick),
                liquidity: 0,
                sqrt_price_x96: U160::from(1u64) << 96,
                ticks: vec![
                    TickState::new(-600, net(1_000_000)),
                    TickState::new(600, net(-1_000_000)),
                ],
            },
        )
        .unwrap();
}

#[rstest]
#[tokio::test]
async fn test_getter_store_hit_and_token_decoration() {
    let env = TestEnv::new(100, vec![usdt_pair(POOL)]);
    seed_pool(&env, POOL, 105);

    let state = env.reader.get_pool_state(&POOL).await.unwrap();
    assert_eq!(state.global.height, 100);
    assert_eq!(state.global.current_tick, 105);
    assert_eq!(state.token0.symbol, "WBNB");
    assert_eq!(state.token1.symbol, "USDT");
    assert_eq!(state.ticks.len(), 2);
}

#[rstest]
#[tokio::test]
async fn test_getter_applies_token_reversal() {
    let mut pair = usdt_pair(POOL);
    pair.tokens_reversed = true;
    let env = TestEnv::new(100, vec![pair]);
    seed_pool(&env, POOL, 0);

    let state = env.reader.get_pool_state(&POOL).await.unwrap();
    assert_eq!(state.token0.symbol, "USDT");
    assert_eq!(state.token1.symbol, "WBNB");
}

#[rstest]
#[tokio::test]
async fn test_getter_miss_materializes_from_lens() {
    let env = TestEnv::new(100, vec![usdt_pair(POOL)]);
    env.rpc
        .stage_snapshot(POOL, 95, 60, 10, &[(-60, 700), (60, -700)])
        .await;

    let state = env.reader.get_pool_state(&POOL).await.unwrap();
    assert_eq!(state.global.height, 95);
    assert_eq!(state.global.tick_spacing, 60);

    // Persisted: the next read is a store hit with the same state.
    assert!(env.store.pool_exists(&POOL).unwrap());
    let again = env.reader.get_pool_state(&POOL).await.unwrap();
    assert_eq!(again, state);
}

#[rstest]
#[tokio::test]
async fn test_getter_rejects_unknown_and_filtered_pairs() {
    let mut filtered = usdt_pair(POOL2);
    filtered.filtered = true;
    let env = TestEnv::new(100, vec![filtered]);

    let unknown = env.reader.get_pool_state(&LENS).await.unwrap_err();
    assert!(matches!(unknown, PoolStateError::PairNotFound(_)));
    assert!(unknown.is_ignorable());

    let filtered = env.reader.get_pool_state(&POOL2).await.unwrap_err();
    assert!(matches!(filtered, PoolStateError::PairFiltered(_)));
}

#[rstest]
#[tokio::test]
async fn test_depth_liquidity_mode_returns_raw_state() {
    let env = TestEnv::new(100, vec![usdt_pair(POOL)]);
    seed_pool(&env, POOL, 105);

    let response = depth_query(
        &env.reader,
        &DepthQuery {
            address: POOL,
            tick_offset: None,
            mode: DepthMode::Liquidity,
        },
    )
    .await
    .unwrap();

    let DepthResponse::Liquidity(state) = response else {
        panic!("expected raw pool state");
    };
    assert_eq!(state.global.current_tick, 105);
}

#[rstest]
#[tokio::test]
async fn test_depth_detail_splits_window_into_spacing_cells() {
    let env = TestEnv::new(100, vec![usdt_pair(POOL)]);
    seed_pool(&env, POOL, 105);

    // current_tick = 105, spacing = 60, offset = 2 → window [-60, 240).
    let response = depth_query(
        &env.reader,
        &DepthQuery {
            address: POOL,
            tick_offset: Some(2),
            mode: DepthMode::TokenAmountDetail,
        },
    )
    .await
    .unwrap();

    let DepthResponse::TokenAmounts(amounts) = response else {
        panic!("expected token amounts");
    };
    let bounds: Vec<(i32, i32)> = amounts
        .iter()
        .map(|amount| (amount.tick_lower, amount.tick_upper))
        .collect();
    assert_eq!(
        bounds,
        vec![(-60, 0), (0, 60), (60, 120), (120, 180), (180, 240)]
    );
    assert!(amounts.iter().all(|amount| amount.liquidity == net(1_000_000)));
}

#[rstest]
#[tokio::test]
async fn test_depth_token_amount_keeps_ranges_whole() {
    let env = TestEnv::new(100, vec![usdt_pair(POOL)]);
    seed_pool(&env, POOL, 105);

    let response = depth_query(
        &env.reader,
        &DepthQuery {
            address: POOL,
            tick_offset: Some(2),
            mode: DepthMode::TokenAmount,
        },
    )
    .await
    .unwrap();

    let DepthResponse::TokenAmounts(amounts) = response else {
        panic!("expected token amounts");
    };
    assert_eq!(amounts.len(), 1);
    assert_eq!((amounts[0].tick_lower, amounts[0].tick_upper), (-60, 240));
}

#[rstest]
#[tokio::test]
async fn test_arbitrage_between_two_usd_pools() {
    let env = TestEnv::new(100, vec![usdt_pair(POOL), usdt_pair(POOL2)]);
    seed_pool(&env, POOL, 0); // price 1.0
    seed_pool(&env, POOL2, 100); // price ~1.01

    let analyzer = ArbitrageAnalyzer::new(env.reader.clone());
    let report = analyzer.analyze(POOL, POOL2).await.unwrap();

    assert!(report.pool1.price_usd < report.pool2.price_usd);
    assert_eq!(report.trade_direction, TradeDirection::Pool1ToPool2);
    assert!(report.price_diff_percent > 0.9 && report.price_diff_percent < 1.1);
    assert!(report.optimal_trade_size > 0.0);
    assert!(report.max_profit_usd > 0.0);
    assert!(report.profit_percent > 0.0);
}

#[rstest]
#[tokio::test]
async fn test_arbitrage_rejects_pools_without_usd_leg() {
    let mut pair = usdt_pair(POOL);
    pair.token1 = tickstate_model::TokenMeta::new(
        alloy_primitives::address!("7130d2a12b9bcbfae4f2634d864a1ee1ce3ead9c"),
        "BTCB".to_string(),
        18,
    );
    let env = TestEnv::new(100, vec![pair, usdt_pair(POOL2)]);
    seed_pool(&env, POOL, 0);
    seed_pool(&env, POOL2, 0);

    let analyzer = ArbitrageAnalyzer::new(env.reader.clone());
    assert!(analyzer.analyze(POOL, POOL2).await.is_err());
}
