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

use std::path::{Path, PathBuf};

use alloy_primitives::{Address, address};
use serde::{Deserialize, Serialize};

use crate::pipeline::crawler::DEFAULT_CRAWLER_WORKERS;

/// Default lens contract deployment.
pub const DEFAULT_LENS_ADDRESS: Address = address!("2511107146bb1908434e92ff7d985c4b7e2fb08a");

/// Chain endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// HTTP JSON-RPC endpoint.
    pub http_endpoint: String,
    /// WebSocket endpoint for the head subscription.
    pub ws_endpoint: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            http_endpoint: "https://bsc-dataseed.binance.org".to_string(),
            ws_endpoint: "wss://bsc-rpc.publicnode.com".to_string(),
        }
    }
}

/// Persistent store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory of the embedded key-value database.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/tickstate"),
        }
    }
}

/// Crawler sizing configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Worker-pool size.
    pub workers: usize,
    /// Capacity of each pipeline handoff channel.
    pub queue_size: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_CRAWLER_WORKERS,
            queue_size: 100,
        }
    }
}

/// Top-level indexer configuration, loaded once at startup and passed by handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Chain endpoints.
    pub chain: ChainConfig,
    /// Store location.
    pub store: StoreConfig,
    /// Crawler sizing.
    pub crawler: CrawlerConfig,
    /// Start height; zero resumes from the persisted watermark (or the chain head
    /// when no watermark exists).
    pub from_height: u64,
    /// Snapshot lens contract address.
    pub lens_address: Address,
    /// JSON file holding the pair metadata records, if any.
    pub pairs_file: Option<PathBuf>,
    /// Lifetime of L1 pair-cache entries, in seconds.
    pub pair_cache_ttl_secs: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            store: StoreConfig::default(),
            crawler: CrawlerConfig::default(),
            from_height: 0,
            lens_address: DEFAULT_LENS_ADDRESS,
            pairs_file: None,
            pair_cache_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl IndexerConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
