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

//! Indexer node entrypoint: config, logging, wiring, and graceful shutdown.

use std::{path::PathBuf, sync::Arc, time::Duration};

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use tickstate_indexer::{
    config::IndexerConfig,
    getter::PoolStateReader,
    lens::LensClient,
    pairs::{PairSource, StaticPairSource, TtlPairCache},
    pipeline::{PipelineOptions, spawn_pipeline},
    rpc::{EvmRpc, http::EthHttpClient, ws::HeadTracker},
    store::{SafeStore, TickStore},
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tickstate-node", about = "Tick-level liquidity indexer node")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the indexing pipeline (the default).
    Run,
    /// Dump the store: one pool's state as JSON, or every raw entry as hex.
    Dump {
        /// Pool address to dump; omit for a raw full-database dump.
        #[arg(long)]
        pool: Option<Address>,
    },
}

/// Completes when SIGTERM or SIGINT is received.
async fn shutdown_signal() {
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("failed to install SIGTERM handler");
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown"),
    }
}

fn load_config(path: &PathBuf) -> anyhow::Result<IndexerConfig> {
    if path.exists() {
        IndexerConfig::load(path)
    } else {
        tracing::warn!("Config file {} not found, using defaults", path.display());
        Ok(IndexerConfig::default())
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn dump_store(config: &IndexerConfig, pool: Option<Address>) -> anyhow::Result<()> {
    let store = TickStore::open(&config.store.path)?;

    match pool {
        Some(address) => {
            let (global, ticks) = store.pool_state(&address)?;
            let payload = serde_json::json!({ "global": global, "ticks": ticks });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        None => {
            for (key, value) in store.dump_entries()? {
                println!("{}:{}", hex_string(&key), hex_string(&value));
            }
        }
    }

    Ok(())
}

async fn run_node(config: IndexerConfig) -> anyhow::Result<()> {
    tracing::info!(
        "Starting tickstate node (store: {}, rpc: {})",
        config.store.path.display(),
        config.chain.http_endpoint,
    );

    let store = Arc::new(SafeStore::open(&config.store.path)?);
    let rpc: Arc<dyn EvmRpc> = Arc::new(EthHttpClient::new(config.chain.http_endpoint.clone()));

    let pair_source: Arc<dyn PairSource> = match &config.pairs_file {
        Some(path) => {
            let source = StaticPairSource::from_json_file(path)?;
            tracing::info!("Loaded {} pairs from {}", source.len(), path.display());
            Arc::new(source)
        }
        None => {
            tracing::warn!("No pairs file configured, every event will be ignored");
            Arc::new(StaticPairSource::default())
        }
    };
    let pairs = Arc::new(TtlPairCache::new(
        pair_source,
        Duration::from_secs(config.pair_cache_ttl_secs),
    ));

    let lens = Arc::new(LensClient::new(rpc.clone(), config.lens_address));
    let reader = Arc::new(PoolStateReader::new(store.clone(), lens, pairs));

    let cancel = CancellationToken::new();
    let head_tracker = HeadTracker::spawn(config.chain.ws_endpoint.clone(), cancel.clone());

    let handles = spawn_pipeline(
        rpc,
        store.clone(),
        reader,
        head_tracker.head_gauge(),
        cancel.clone(),
        PipelineOptions {
            crawler_workers: config.crawler.workers,
            queue_size: config.crawler.queue_size,
            from_height: config.from_height,
        },
    )
    .await?;

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_cancel.cancel();
    });

    let result = handles.join().await;
    cancel.cancel();
    head_tracker.join().await;

    match store.finish_height() {
        Ok(height) => tracing::info!("Stopped at finish height {height}"),
        Err(error) => tracing::error!("Failed reading final watermark: {error}"),
    }

    result.map_err(Into::into)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_node(config).await,
        Command::Dump { pool } => dump_store(&config, pool),
    }
}
