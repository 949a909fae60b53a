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

//! Whole-pipeline smoke test: dispatcher → crawler → parser → reactor over a
//! scripted chain.

mod common;

use std::{
    sync::{Arc, atomic::AtomicU64},
    time::Duration,
};

use alloy_primitives::{I256, U160};
use common::{POOL, TestEnv, burn_log, mint_log, receipt, swap_log, usdt_pair};
use rstest::rstest;
use tickstate_indexer::pipeline::{PipelineOptions, spawn_pipeline};
use tickstate_model::{PoolGlobalState, PoolSnapshot};
use tokio_util::sync::CancellationToken;

#[rstest]
#[tokio::test]
async fn test_pipeline_indexes_scripted_blocks() {
    let env = TestEnv::new(102, vec![usdt_pair(POOL)]);

    // Pool tracked from height 99 with an empty tick map.
    env.store
        .set_pool_state(
            &POOL,
            &PoolSnapshot {
                global: PoolGlobalState::new(99, 60, 0),
                liquidity: 0,
                sqrt_price_x96: U160::from(1u64) << 96,
                ticks: vec![],
            },
        )
        .unwrap();

    env.rpc
        .stage_receipts(100, vec![receipt(vec![mint_log(POOL, -60, 60, 1000)])])
        .await;
    env.rpc
        .stage_receipts(101, vec![receipt(vec![burn_log(POOL, -60, 60, 400)])])
        .await;
    env.rpc
        .stage_receipts(102, vec![receipt(vec![swap_log(POOL, 123)])])
        .await;

    let stop = CancellationToken::new();
    let handles = spawn_pipeline(
        env.rpc.clone(),
        env.store.clone(),
        env.reader.clone(),
        Arc::new(AtomicU64::new(0)),
        stop.clone(),
        PipelineOptions {
            crawler_workers: 4,
            queue_size: 16,
            from_height: 100,
        },
    )
    .await
    .unwrap();

    // Wait for the watermark to reach the scripted head, then stop.
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if env.store.finish_height().unwrap() >= 102 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("pipeline did not reach the scripted head");

    stop.cancel();
    handles.join().await.unwrap();

    assert_eq!(env.store.finish_height().unwrap(), 102);
    assert_eq!(env.store.pool_height(&POOL).unwrap(), 102);
    assert_eq!(
        env.store.tick_state(&POOL, -60).unwrap().liquidity_net,
        I256::try_from(600).unwrap()
    );
    assert_eq!(
        env.store.tick_state(&POOL, 60).unwrap().liquidity_net,
        I256::try_from(-600).unwrap()
    );
    assert_eq!(env.store.current_tick(&POOL).unwrap(), 123);
}

#[rstest]
#[tokio::test]
async fn test_pipeline_resumes_from_watermark() {
    let env = TestEnv::new(102, vec![usdt_pair(POOL)]);
    env.store.set_finish_height(101).unwrap();
    env.rpc
        .stage_receipts(102, vec![receipt(vec![swap_log(POOL, 7)])])
        .await;
    env.store
        .set_pool_state(
            &POOL,
            &PoolSnapshot {
                global: PoolGlobalState::new(99, 60, 0),
                liquidity: 0,
                sqrt_price_x96: U160::from(1u64) << 96,
                ticks: vec![],
            },
        )
        .unwrap();

    let stop = CancellationToken::new();
    let handles = spawn_pipeline(
        env.rpc.clone(),
        env.store.clone(),
        env.reader.clone(),
        Arc::new(AtomicU64::new(0)),
        stop.clone(),
        PipelineOptions {
            crawler_workers: 2,
            queue_size: 16,
            from_height: 0, // resume from the watermark
        },
    )
    .await
    .unwrap();

    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if env.store.finish_height().unwrap() >= 102 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("pipeline did not resume from the watermark");

    stop.cancel();
    handles.join().await.unwrap();

    assert_eq!(env.store.current_tick(&POOL).unwrap(), 7);
    assert_eq!(env.store.pool_height(&POOL).unwrap(), 102);
}
