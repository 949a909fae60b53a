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

//! RPC clients for chain communication.
//!
//! [`http::EthHttpClient`] speaks JSON-RPC over HTTP for block numbers, block
//! receipts, and contract calls; [`ws::HeadTracker`] maintains a long-lived
//! `newHeads` subscription over WebSocket. Transient failures are retried inside
//! [`retry::with_retry`] with a fixed delay under an overall per-call deadline;
//! non-retryable node errors are classified and surfaced as "no data".

pub mod http;
pub mod retry;
pub mod types;
pub mod ws;

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use thiserror::Error;

use self::types::TransactionReceipt;

/// Represents errors that can occur when talking to a chain RPC endpoint.
#[derive(Debug, Error)]
pub enum RpcClientError {
    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success HTTP status.
    #[error("http status {0}")]
    HttpStatus(u16),
    /// The node returned a JSON-RPC error object.
    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },
    /// The response payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// The overall per-call deadline elapsed while retrying.
    #[error("deadline exceeded after {0}")]
    DeadlineExceeded(String),
    /// The subscription stream ended.
    #[error("subscription closed")]
    SubscriptionClosed,
}

impl RpcClientError {
    /// Returns `true` if the error is transient and the call should be retried.
    ///
    /// Execution reverts, out-of-gas results, and payload decode failures are
    /// permanent for a given call and are never retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::HttpStatus(_) | Self::SubscriptionClosed => true,
            Self::Decode(_) | Self::DeadlineExceeded(_) => false,
            Self::Node { message, .. } => {
                !message.contains("execution reverted") && !message.contains("out of gas")
            }
        }
    }

    /// Returns `true` if the error is the non-retryable kind that callers surface
    /// as "no data" rather than a failure (spec'd reverted / out-of-gas / decode).
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        match self {
            Self::Decode(_) => true,
            Self::Node { message, .. } => {
                message.contains("execution reverted") || message.contains("out of gas")
            }
            _ => false,
        }
    }
}

/// Chain RPC operations consumed by the pipeline and the snapshot lens.
///
/// Implementations perform a single attempt per call; retry policy lives in
/// [`retry::with_retry`] at the call sites.
#[async_trait]
pub trait EvmRpc: Send + Sync {
    /// Returns the current chain head height.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn block_number(&self) -> Result<u64, RpcClientError>;

    /// Returns all transaction receipts of the block at `height`, or `None` when
    /// the node has no data for that height.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn block_receipts(
        &self,
        height: u64,
    ) -> Result<Option<Vec<TransactionReceipt>>, RpcClientError>;

    /// Executes a read-only contract call against the latest state, returning the
    /// raw return data, or `None` when the call reverted or ran out of gas.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn call_contract(&self, to: Address, data: Bytes) -> Result<Option<Bytes>, RpcClientError>;
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
