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

//! Parallel block-receipt fetcher.
//!
//! A fixed pool of workers pulls heights from the input channel, fetches each
//! block's receipts with the retry policy, and commits the result through the
//! sequencer so the output channel stays in ascending block order. When the input
//! channel closes and all in-flight fetches drain, the output channel closes.

use std::sync::Arc;

use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
};

use crate::{
    pipeline::sequencer::Sequencer,
    rpc::{EvmRpc, retry::with_retry, types::BlockReceipts},
};

/// Default number of fetch workers.
pub const DEFAULT_CRAWLER_WORKERS: usize = 10;

/// Worker pool fetching block receipts by height.
pub struct ReceiptCrawler {
    rpc: Arc<dyn EvmRpc>,
    workers: usize,
}

impl std::fmt::Debug for ReceiptCrawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptCrawler")
            .field("workers", &self.workers)
            .finish()
    }
}

impl ReceiptCrawler {
    /// Creates a crawler with the given worker-pool size.
    #[must_use]
    pub fn new(rpc: Arc<dyn EvmRpc>, workers: usize) -> Self {
        Self {
            rpc,
            workers: workers.max(1),
        }
    }

    /// Spawns the worker pool.
    ///
    /// The returned handle resolves when the input channel has closed and every
    /// worker has finished; the output channel closes at that point.
    #[must_use]
    pub fn spawn(
        self,
        input: mpsc::Receiver<u64>,
        sequencer: Arc<Sequencer>,
        output: mpsc::Sender<BlockReceipts>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let input = Arc::new(Mutex::new(input));
            let mut workers = Vec::with_capacity(self.workers);

            for worker_id in 0..self.workers {
                let input = input.clone();
                let rpc = self.rpc.clone();
                let sequencer = sequencer.clone();
                let output = output.clone();

                workers.push(tokio::spawn(async move {
                    loop {
                        let height = { input.lock().await.recv().await };
                        let Some(height) = height else { break };

                        let block = fetch_block(rpc.as_ref(), height).await;
                        if sequencer.commit(block, &output).await.is_err() {
                            tracing::debug!("Crawler worker {worker_id} output closed");
                            break;
                        }
                    }
                }));
            }
            drop(output);

            for worker in workers {
                if let Err(join_error) = worker.await {
                    if join_error.is_panic() {
                        std::panic::resume_unwind(join_error.into_panic());
                    }
                }
            }
            tracing::info!("All crawler workers finished");
        })
    }
}

/// Fetches one block's receipts, retrying attempt groups until the node either
/// answers or fails with a classified non-retryable error ("no data").
async fn fetch_block(rpc: &dyn EvmRpc, height: u64) -> BlockReceipts {
    loop {
        match with_retry(|| rpc.block_receipts(height)).await {
            Ok(receipts) => return BlockReceipts { height, receipts },
            Err(error) if error.is_no_data() => {
                tracing::warn!("No receipt data for block {height}: {error}");
                return BlockReceipts {
                    height,
                    receipts: None,
                };
            }
            // A dropped height would stall the sequencer forever; keep trying.
            Err(error) => {
                tracing::error!("Fetching receipts for block {height} failed: {error}, retrying");
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use alloy_primitives::{Address, Bytes};
    use async_trait::async_trait;
    use rstest::rstest;

    use super::*;
    use crate::rpc::{RpcClientError, types::TransactionReceipt};

    struct ScriptedRpc {
        transient_failures: AtomicU32,
    }

    #[async_trait]
    impl EvmRpc for ScriptedRpc {
        async fn block_number(&self) -> Result<u64, RpcClientError> {
            Ok(0)
        }

        async fn block_receipts(
            &self,
            height: u64,
        ) -> Result<Option<Vec<TransactionReceipt>>, RpcClientError> {
            // Height 7 fails twice before succeeding.
            if height == 7 && self.transient_failures.fetch_add(1, Ordering::SeqCst) < 2 {
                return Err(RpcClientError::Transport("flaky".into()));
            }
            Ok(Some(Vec::new()))
        }

        async fn call_contract(
            &self,
            _to: Address,
            _data: Bytes,
        ) -> Result<Option<Bytes>, RpcClientError> {
            Ok(None)
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_crawler_outputs_contiguous_ascending_heights() {
        let rpc = Arc::new(ScriptedRpc {
            transient_failures: AtomicU32::new(0),
        });
        let crawler = ReceiptCrawler::new(rpc, 4);
        let sequencer = Arc::new(Sequencer::starting_at(5));

        let (height_tx, height_rx) = mpsc::channel(16);
        let (block_tx, mut block_rx) = mpsc::channel(16);

        let handle = crawler.spawn(height_rx, sequencer, block_tx);

        for height in 5..=12u64 {
            height_tx.send(height).await.unwrap();
        }
        drop(height_tx);

        let mut heights = Vec::new();
        while let Some(block) = block_rx.recv().await {
            heights.push(block.height);
        }
        handle.await.unwrap();

        assert_eq!(heights, (5..=12u64).collect::<Vec<_>>());
    }
}
