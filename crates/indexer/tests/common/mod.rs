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

//! Shared test harness: a scripted chain RPC, pair fixtures, and log builders.

#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc, time::Duration};

use alloy_primitives::{Address, B256, Bytes, I256, U256, address, aliases::I24, aliases::U160};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use tickstate_indexer::{
    getter::PoolStateReader,
    lens::{LensClient, LensPoolState, LensTick},
    pairs::{StaticPairSource, TtlPairCache},
    pipeline::parser::{
        BURN_EVENT_SIGNATURE, MINT_EVENT_SIGNATURE, SWAP_EVENT_SIGNATURE,
    },
    rpc::{
        EvmRpc, RpcClientError,
        types::{Log, TransactionReceipt},
    },
    store::SafeStore,
};
use tickstate_model::{PROTOCOL_ID_V3, Pair, TokenMeta, token};
use tokio::sync::Mutex;

pub const POOL: Address = address!("36696169c63e42cd08ce11f5deebbcebae652050");
pub const POOL2: Address = address!("172fcd41e0913e95784454622d1c3724f546f849");
pub const LENS: Address = address!("2511107146bb1908434e92ff7d985c4b7e2fb08a");
pub const WBNB: Address = address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c");

/// Scripted chain RPC: fixed head, receipts by height, lens snapshots by pool.
pub struct MockRpc {
    pub head: u64,
    pub receipts: Mutex<HashMap<u64, Vec<TransactionReceipt>>>,
    pub snapshots: Mutex<HashMap<Address, Bytes>>,
}

impl MockRpc {
    pub fn new(head: u64) -> Self {
        Self {
            head,
            receipts: Mutex::new(HashMap::new()),
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    pub async fn stage_receipts(&self, height: u64, receipts: Vec<TransactionReceipt>) {
        self.receipts.lock().await.insert(height, receipts);
    }

    pub async fn stage_snapshot(
        &self,
        pool: Address,
        height: u64,
        tick_spacing: i32,
        tick: i32,
        ticks: &[(i32, i128)],
    ) {
        let encoded = encode_lens_return(height, tick_spacing, tick, ticks);
        self.snapshots.lock().await.insert(pool, encoded);
    }
}

#[async_trait]
impl EvmRpc for MockRpc {
    async fn block_number(&self) -> Result<u64, RpcClientError> {
        Ok(self.head)
    }

    async fn block_receipts(
        &self,
        height: u64,
    ) -> Result<Option<Vec<TransactionReceipt>>, RpcClientError> {
        Ok(Some(
            self.receipts
                .lock()
                .await
                .get(&height)
                .cloned()
                .unwrap_or_default(),
        ))
    }

    async fn call_contract(
        &self,
        _to: Address,
        data: Bytes,
    ) -> Result<Option<Bytes>, RpcClientError> {
        // The lens call embeds the pool address as its only (padded) argument.
        if data.len() < 36 {
            return Ok(None);
        }
        let pool = Address::from_slice(&data[16..36]);
        Ok(self.snapshots.lock().await.get(&pool).cloned())
    }
}

/// ABI-encodes a `getAllTicks` return tuple.
pub fn encode_lens_return(
    height: u64,
    tick_spacing: i32,
    tick: i32,
    ticks: &[(i32, i128)],
) -> Bytes {
    let state = LensPoolState {
        height: U256::from(height),
        tickSpacing: I24::try_from(tick_spacing).unwrap(),
        tick: I24::try_from(tick).unwrap(),
        liquidity: 1_000_000,
        sqrtPriceX96: U160::from(1u64) << 96,
    };
    let lens_ticks: Vec<LensTick> = ticks
        .iter()
        .map(|(index, net)| LensTick {
            index: I24::try_from(*index).unwrap(),
            liquidityGross: net.unsigned_abs(),
            liquidityNet: *net,
        })
        .collect();
    Bytes::from((state, lens_ticks).abi_encode_params())
}

pub fn usdt_pair(pool: Address) -> Pair {
    Pair {
        address: pool,
        token0: TokenMeta::new(WBNB, "WBNB".to_string(), 18),
        token1: TokenMeta::new(token::USDT, "USDT".to_string(), 18),
        tokens_reversed: false,
        protocol_id: PROTOCOL_ID_V3,
        filtered: false,
    }
}

/// Full read-side environment over a temp store.
pub struct TestEnv {
    pub store: Arc<SafeStore>,
    pub reader: Arc<PoolStateReader>,
    pub rpc: Arc<MockRpc>,
    _dir: tempfile::TempDir,
}

impl TestEnv {
    pub fn new(head: u64, pairs: Vec<Pair>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SafeStore::open(dir.path()).unwrap());
        let rpc = Arc::new(MockRpc::new(head));
        let lens = Arc::new(LensClient::new(rpc.clone(), LENS));
        let pairs = Arc::new(TtlPairCache::new(
            Arc::new(StaticPairSource::new(pairs)),
            Duration::from_secs(24 * 60 * 60),
        ));
        let reader = Arc::new(PoolStateReader::new(store.clone(), lens, pairs));
        Self {
            store,
            reader,
            rpc,
            _dir: dir,
        }
    }
}

fn topic_from_tick(tick: i32) -> B256 {
    let mut bytes = if tick < 0 { [0xffu8; 32] } else { [0u8; 32] };
    bytes[28..32].copy_from_slice(&tick.to_be_bytes());
    B256::from(bytes)
}

fn words(values: &[U256]) -> Bytes {
    let mut data = Vec::with_capacity(values.len() * 32);
    for value in values {
        data.extend_from_slice(&value.to_be_bytes::<32>());
    }
    Bytes::from(data)
}

fn signed_word(value: i64) -> U256 {
    U256::from_be_bytes(I256::try_from(value).unwrap().to_be_bytes::<32>())
}

pub fn mint_log(pool: Address, tick_lower: i32, tick_upper: i32, amount: u64) -> Log {
    Log {
        address: pool,
        topics: vec![
            MINT_EVENT_SIGNATURE,
            B256::ZERO,
            topic_from_tick(tick_lower),
            topic_from_tick(tick_upper),
        ],
        data: words(&[
            U256::ZERO,
            U256::from(amount),
            U256::from(1u8),
            U256::from(2u8),
        ]),
    }
}

pub fn burn_log(pool: Address, tick_lower: i32, tick_upper: i32, amount: u64) -> Log {
    Log {
        address: pool,
        topics: vec![
            BURN_EVENT_SIGNATURE,
            B256::ZERO,
            topic_from_tick(tick_lower),
            topic_from_tick(tick_upper),
        ],
        data: words(&[U256::from(amount), U256::from(1u8), U256::from(2u8)]),
    }
}

pub fn swap_log(pool: Address, tick: i32) -> Log {
    Log {
        address: pool,
        topics: vec![SWAP_EVENT_SIGNATURE, B256::ZERO, B256::ZERO],
        data: words(&[
            signed_word(-5),
            signed_word(5),
            U256::from(1u8) << 96,
            U256::from(1_000u64),
            signed_word(i64::from(tick)),
        ]),
    }
}

pub fn receipt(logs: Vec<Log>) -> TransactionReceipt {
    TransactionReceipt {
        status: Some(1),
        logs,
    }
}
