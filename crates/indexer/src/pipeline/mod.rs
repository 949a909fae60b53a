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

//! Pipeline assembly.
//!
//! Stages hand off through bounded channels; a closed channel is the finish signal
//! propagating downstream. Stage ownership forms a one-direction chain built at
//! startup: the dispatcher owns the crawler input, the crawler owns the sequencer
//! gate and the parser input, the parser owns the reactor input. Cancellation is a
//! single shared token observed by the dispatcher; everything downstream drains
//! naturally on channel close.

use std::sync::{Arc, atomic::AtomicU64};

use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    error::IndexerError,
    getter::PoolStateReader,
    pipeline::{
        crawler::ReceiptCrawler, dispatcher::HeightDispatcher, parser::spawn_parser,
        reactor::EventReactor, sequencer::Sequencer,
    },
    rpc::EvmRpc,
    store::SafeStore,
};

pub mod crawler;
pub mod dispatcher;
pub mod parser;
pub mod reactor;
pub mod sequencer;

/// Join handles of the four pipeline stages, in upstream-to-downstream order.
#[derive(Debug)]
pub struct PipelineHandles {
    pub dispatcher: JoinHandle<()>,
    pub crawler: JoinHandle<()>,
    pub parser: JoinHandle<()>,
    pub reactor: JoinHandle<Result<(), IndexerError>>,
}

impl PipelineHandles {
    /// Waits for every stage to finish, returning the reactor's outcome.
    ///
    /// # Errors
    ///
    /// Returns the reactor's fatal error, if any.
    ///
    /// # Panics
    ///
    /// Resumes the panic of any stage that hit a fatal invariant violation (such as
    /// a duplicate sequencer commit).
    pub async fn join(self) -> Result<(), IndexerError> {
        for handle in [self.dispatcher, self.crawler, self.parser] {
            if let Err(join_error) = handle.await {
                if join_error.is_panic() {
                    std::panic::resume_unwind(join_error.into_panic());
                }
            }
        }

        match self.reactor.await {
            Ok(result) => result,
            Err(join_error) if join_error.is_panic() => {
                std::panic::resume_unwind(join_error.into_panic())
            }
            Err(join_error) => {
                tracing::error!("Reactor task aborted: {join_error}");
                Ok(())
            }
        }
    }
}

/// Sizing parameters of the pipeline stages.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Crawler worker-pool size.
    pub crawler_workers: usize,
    /// Capacity of each handoff channel.
    pub queue_size: usize,
    /// Configured start height; zero means "resume from the watermark".
    pub from_height: u64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            crawler_workers: crawler::DEFAULT_CRAWLER_WORKERS,
            queue_size: 100,
            from_height: 0,
        }
    }
}

/// Builds and spawns the full pipeline.
///
/// # Errors
///
/// Returns an error if resolving the start height fails.
pub async fn spawn_pipeline(
    rpc: Arc<dyn EvmRpc>,
    store: Arc<SafeStore>,
    reader: Arc<PoolStateReader>,
    head: Arc<AtomicU64>,
    stop: CancellationToken,
    options: PipelineOptions,
) -> Result<PipelineHandles, IndexerError> {
    let dispatcher = HeightDispatcher::new(rpc.clone(), store.clone(), head, stop);
    let from_height = dispatcher.resolve_from_height(options.from_height).await?;

    let (height_tx, height_rx) = mpsc::channel::<u64>(options.queue_size);
    let (receipt_tx, receipt_rx) = mpsc::channel(options.queue_size);
    let (event_tx, event_rx) = mpsc::channel(options.queue_size);

    let sequencer = Arc::new(Sequencer::starting_at(from_height));

    let dispatcher = dispatcher.spawn(from_height, height_tx);
    let crawler =
        ReceiptCrawler::new(rpc, options.crawler_workers).spawn(height_rx, sequencer, receipt_tx);
    let parser = spawn_parser(receipt_rx, event_tx);
    let reactor = EventReactor::new(store, reader).spawn(event_rx);

    Ok(PipelineHandles {
        dispatcher,
        crawler,
        parser,
        reactor,
    })
}
