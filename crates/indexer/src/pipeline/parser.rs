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

//! Log decoding: block receipts → typed pool events.
//!
//! Pure and infallible per block: failed transactions are skipped, logs whose
//! `topics[0]` is not a tracked signature are ignored, and malformed logs (wrong
//! topic or data arity) are dropped silently without aborting the block. Output
//! preserves the within-block order of the source logs.

use alloy_primitives::{B256, U256, b256};
use tickstate_model::{BlockEvents, PoolEvent};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::rpc::types::{BlockReceipts, Log};

/// `keccak256("Mint(address,address,int24,int24,uint128,uint256,uint256)")`.
pub const MINT_EVENT_SIGNATURE: B256 =
    b256!("7a53080ba414158be7ec69b987b5fb7d07dee101fe85488f0853ae16239d0bde");

/// `keccak256("Burn(address,int24,int24,uint128,uint256,uint256)")`.
pub const BURN_EVENT_SIGNATURE: B256 =
    b256!("0c396cd989a39f4459b5fa1aed6a9a8dcdbc45908acfd67e028cd568da98982c");

/// `keccak256("Swap(address,address,int256,int256,uint160,uint128,int24)")`.
pub const SWAP_EVENT_SIGNATURE: B256 =
    b256!("c42079f94a6350d7e6235f29174924f928cc2ac818eb64fed8004e115fbcca67");

const WORD: usize = 32;

const MINT_TOPIC_COUNT: usize = 4;
const MINT_DATA_WORDS: usize = 4; // sender, amount, amount0, amount1
const BURN_TOPIC_COUNT: usize = 4;
const BURN_DATA_WORDS: usize = 3; // amount, amount0, amount1
const SWAP_TOPIC_COUNT: usize = 3;
const SWAP_DATA_WORDS: usize = 5; // amount0, amount1, sqrtPriceX96, liquidity, tick

/// Parses one block of receipts into its pool events.
#[must_use]
pub fn parse_block(block: &BlockReceipts) -> BlockEvents {
    let mut events = Vec::new();

    if let Some(receipts) = &block.receipts {
        for receipt in receipts {
            if !receipt.is_success() {
                continue;
            }
            for log in &receipt.logs {
                if let Some(event) = parse_log(log) {
                    events.push(event);
                }
            }
        }
    }

    BlockEvents::new(block.height, events)
}

/// Decodes a single log, returning `None` for untracked or malformed logs.
#[must_use]
pub fn parse_log(log: &Log) -> Option<PoolEvent> {
    let topic0 = *log.topics.first()?;
    if topic0 == MINT_EVENT_SIGNATURE {
        parse_mint(log)
    } else if topic0 == BURN_EVENT_SIGNATURE {
        parse_burn(log)
    } else if topic0 == SWAP_EVENT_SIGNATURE {
        parse_swap(log)
    } else {
        None
    }
}

fn parse_mint(log: &Log) -> Option<PoolEvent> {
    if log.topics.len() != MINT_TOPIC_COUNT || log.data.len() != MINT_DATA_WORDS * WORD {
        return None;
    }

    Some(PoolEvent::Mint {
        address: log.address,
        tick_lower: tick_from_topic(&log.topics[2]),
        tick_upper: tick_from_topic(&log.topics[3]),
        amount: word_u256(&log.data, 1),
    })
}

fn parse_burn(log: &Log) -> Option<PoolEvent> {
    if log.topics.len() != BURN_TOPIC_COUNT || log.data.len() != BURN_DATA_WORDS * WORD {
        return None;
    }

    Some(PoolEvent::Burn {
        address: log.address,
        tick_lower: tick_from_topic(&log.topics[2]),
        tick_upper: tick_from_topic(&log.topics[3]),
        amount: word_u256(&log.data, 0),
    })
}

fn parse_swap(log: &Log) -> Option<PoolEvent> {
    if log.topics.len() != SWAP_TOPIC_COUNT || log.data.len() != SWAP_DATA_WORDS * WORD {
        return None;
    }

    Some(PoolEvent::Swap {
        address: log.address,
        tick: tick_from_word(&log.data, 4),
    })
}

/// Extracts a sign-extended `int24` from a 32-byte topic.
fn tick_from_topic(topic: &B256) -> i32 {
    let bytes: [u8; 4] = topic[28..32].try_into().expect("topic is 32 bytes");
    i32::from_be_bytes(bytes)
}

/// Extracts a sign-extended `int24` from data word `index`.
fn tick_from_word(data: &[u8], index: usize) -> i32 {
    let start = index * WORD;
    let bytes: [u8; 4] = data[start + 28..start + 32]
        .try_into()
        .expect("arity checked");
    i32::from_be_bytes(bytes)
}

/// Extracts an unsigned 256-bit quantity from data word `index`.
fn word_u256(data: &[u8], index: usize) -> U256 {
    let start = index * WORD;
    U256::from_be_slice(&data[start..start + WORD])
}

/// Spawns the parser task: one cooperative consumer turning receipt blocks into
/// event blocks, preserving stream order.
#[must_use]
pub fn spawn_parser(
    mut input: mpsc::Receiver<BlockReceipts>,
    output: mpsc::Sender<BlockEvents>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(block) = input.recv().await {
            let events = parse_block(&block);
            if output.send(events).await.is_err() {
                tracing::debug!("Parser output closed");
                return;
            }
        }
        tracing::info!("Parser input drained");
    })
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
