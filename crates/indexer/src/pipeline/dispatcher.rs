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

//! Height dispatcher: turns the chain head into a contiguous monotonic height
//! stream for the crawler.
//!
//! The head is observed through the WebSocket subscription gauge (see
//! [`crate::rpc::ws::HeadTracker`]); when the stream catches up it sleeps briefly
//! and re-checks. Stop is cooperative: the current batch stops at the next height
//! boundary and the crawler input channel closes.
//!
//! Re-orgs are not rolled back: once a height has been dispatched and applied it is
//! treated as permanent, and the stream only moves forward.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    error::IndexerError,
    rpc::{EvmRpc, retry::with_retry},
    store::SafeStore,
};

const HEAD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Dispatches the contiguous height stream `from_height, from_height+1, …, head`.
pub struct HeightDispatcher {
    rpc: Arc<dyn EvmRpc>,
    store: Arc<SafeStore>,
    head: Arc<AtomicU64>,
    stop: CancellationToken,
}

impl std::fmt::Debug for HeightDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeightDispatcher")
            .field("head", &self.head.load(Ordering::Relaxed))
            .finish()
    }
}

impl HeightDispatcher {
    /// Creates a dispatcher reading the chain head from `head`.
    #[must_use]
    pub fn new(
        rpc: Arc<dyn EvmRpc>,
        store: Arc<SafeStore>,
        head: Arc<AtomicU64>,
        stop: CancellationToken,
    ) -> Self {
        Self {
            rpc,
            store,
            head,
            stop,
        }
    }

    /// Resolves the height to start dispatching from, in priority order: the
    /// configured value if non-zero, else the persisted watermark plus one, else
    /// the current chain head.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read or the head query fails.
    pub async fn resolve_from_height(&self, configured: u64) -> Result<u64, IndexerError> {
        if configured != 0 {
            return Ok(configured);
        }

        let finish_height = self.store.finish_height()?;
        if finish_height != 0 {
            return Ok(finish_height + 1);
        }

        let head = with_retry(|| self.rpc.block_number()).await?;
        Ok(head)
    }

    /// Spawns the dispatch loop, seeding the head gauge from `eth_blockNumber`
    /// first. The crawler input closes when the loop exits.
    #[must_use]
    pub fn spawn(self, from_height: u64, output: mpsc::Sender<u64>) -> JoinHandle<()> {
        tokio::spawn(async move {
            match with_retry(|| self.rpc.block_number()).await {
                Ok(head) => {
                    self.head.fetch_max(head, Ordering::Relaxed);
                }
                Err(error) => {
                    tracing::error!("Initial head query failed: {error}");
                }
            }

            tracing::info!("Dispatching heights from {from_height}");
            let mut current = from_height;

            loop {
                let head = self.head.load(Ordering::Relaxed);

                if head < current {
                    if self.stop.is_cancelled() {
                        break;
                    }
                    tokio::time::sleep(HEAD_POLL_INTERVAL).await;
                    continue;
                }

                for height in current..=head {
                    if self.stop.is_cancelled() {
                        tracing::info!("Dispatch interrupted, next height {height}");
                        return;
                    }
                    if output.send(height).await.is_err() {
                        tracing::warn!("Crawler input closed, stopping dispatch");
                        return;
                    }
                }

                current = head + 1;
            }

            tracing::info!("Dispatch stopped, next height {current}");
        })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, Bytes};
    use async_trait::async_trait;
    use rstest::rstest;

    use super::*;
    use crate::rpc::{RpcClientError, types::TransactionReceipt};

    struct FixedHeadRpc {
        head: u64,
    }

    #[async_trait]
    impl EvmRpc for FixedHeadRpc {
        async fn block_number(&self) -> Result<u64, RpcClientError> {
            Ok(self.head)
        }

        async fn block_receipts(
            &self,
            _height: u64,
        ) -> Result<Option<Vec<TransactionReceipt>>, RpcClientError> {
            Ok(None)
        }

        async fn call_contract(
            &self,
            _to: Address,
            _data: Bytes,
        ) -> Result<Option<Bytes>, RpcClientError> {
            Ok(None)
        }
    }

    fn temp_store() -> (Arc<SafeStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SafeStore::open(dir.path()).unwrap());
        (store, dir)
    }

    fn dispatcher(head: u64, store: Arc<SafeStore>) -> HeightDispatcher {
        HeightDispatcher::new(
            Arc::new(FixedHeadRpc { head }),
            store,
            Arc::new(AtomicU64::new(0)),
            CancellationToken::new(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn test_from_height_prefers_configured_value() {
        let (store, _dir) = temp_store();
        store.set_finish_height(500).unwrap();

        let dispatcher = dispatcher(900, store);
        assert_eq!(dispatcher.resolve_from_height(123).await.unwrap(), 123);
    }

    #[rstest]
    #[tokio::test]
    async fn test_from_height_resumes_after_watermark() {
        let (store, _dir) = temp_store();
        store.set_finish_height(500).unwrap();

        let dispatcher = dispatcher(900, store);
        assert_eq!(dispatcher.resolve_from_height(0).await.unwrap(), 501);
    }

    #[rstest]
    #[tokio::test]
    async fn test_from_height_falls_back_to_chain_head() {
        let (store, _dir) = temp_store();
        let dispatcher = dispatcher(900, store);
        assert_eq!(dispatcher.resolve_from_height(0).await.unwrap(), 900);
    }

    #[rstest]
    #[tokio::test]
    async fn test_dispatch_emits_contiguous_range_and_follows_head() {
        let (store, _dir) = temp_store();
        let head = Arc::new(AtomicU64::new(0));
        let stop = CancellationToken::new();
        let dispatcher = HeightDispatcher::new(
            Arc::new(FixedHeadRpc { head: 105 }),
            store,
            head.clone(),
            stop.clone(),
        );

        let (tx, mut rx) = mpsc::channel(64);
        let handle = dispatcher.spawn(100, tx);

        let mut received = Vec::new();
        for _ in 0..6 {
            received.push(rx.recv().await.unwrap());
        }
        assert_eq!(received, vec![100, 101, 102, 103, 104, 105]);

        // Advance the head gauge; the dispatcher picks up the new range.
        head.store(107, Ordering::Relaxed);
        assert_eq!(rx.recv().await, Some(106));
        assert_eq!(rx.recv().await, Some(107));

        // Cooperative stop: the loop exits and the channel closes.
        stop.cancel();
        assert_eq!(rx.recv().await, None);
        handle.await.unwrap();
    }
}
