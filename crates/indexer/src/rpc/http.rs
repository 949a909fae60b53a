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

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::rpc::{
    EvmRpc, RpcClientError,
    types::{JsonRpcResponse, TransactionReceipt, from_str_hex_to_u64},
};

/// JSON-RPC over HTTP client for a single chain endpoint.
///
/// Each method performs one attempt; call sites wrap them in
/// [`crate::rpc::retry::with_retry`] according to the component's retry policy.
#[derive(Debug)]
pub struct EthHttpClient {
    client: reqwest::Client,
    endpoint: String,
    request_id: AtomicU64,
}

impl EthHttpClient {
    /// Creates a new [`EthHttpClient`] for the given HTTP endpoint.
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            request_id: AtomicU64::new(1),
        }
    }

    /// Executes one JSON-RPC request, returning the raw `result` field (which may
    /// be absent when the node reports `null`).
    async fn request<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<R>, RpcClientError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcClientError::HttpStatus(status.as_u16()));
        }

        let envelope: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| RpcClientError::Decode(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(RpcClientError::Node {
                code: error.code,
                message: error.message,
            });
        }

        Ok(envelope.result)
    }
}

#[async_trait]
impl EvmRpc for EthHttpClient {
    async fn block_number(&self) -> Result<u64, RpcClientError> {
        let raw: String = self
            .request("eth_blockNumber", serde_json::json!([]))
            .await?
            .ok_or_else(|| RpcClientError::Decode("eth_blockNumber returned null".into()))?;
        from_str_hex_to_u64(&raw).map_err(|e| RpcClientError::Decode(e.to_string()))
    }

    async fn block_receipts(
        &self,
        height: u64,
    ) -> Result<Option<Vec<TransactionReceipt>>, RpcClientError> {
        self.request(
            "eth_getBlockReceipts",
            serde_json::json!([format!("0x{height:x}")]),
        )
        .await
    }

    async fn call_contract(
        &self,
        to: Address,
        data: Bytes,
    ) -> Result<Option<Bytes>, RpcClientError> {
        let result = self
            .request::<_, Bytes>(
                "eth_call",
                serde_json::json!([{ "to": to, "data": data }, "latest"]),
            )
            .await;

        match result {
            Ok(bytes) => Ok(bytes),
            // Reverted / out-of-gas calls carry no data for the caller.
            Err(error) if error.is_no_data() => {
                tracing::debug!("eth_call to {to} returned no data: {error}");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }
}
