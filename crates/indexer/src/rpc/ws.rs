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

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::rpc::{RpcClientError, types::BlockHeader};

const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct SubscriptionParams {
    result: BlockHeader,
}

#[derive(Debug, Deserialize)]
struct SubscriptionMessage {
    method: Option<String>,
    params: Option<SubscriptionParams>,
}

/// Long-lived `newHeads` subscription publishing the latest head height.
///
/// The tracker owns a background task that connects to the WebSocket endpoint,
/// subscribes, and bumps an atomic head gauge on every header. On any stream error
/// it unsubscribes by dropping the connection and reconnects with a fixed backoff,
/// forever, until cancelled.
#[derive(Debug)]
pub struct HeadTracker {
    head: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl HeadTracker {
    /// Spawns the subscription task against `ws_endpoint`.
    #[must_use]
    pub fn spawn(ws_endpoint: String, cancel: CancellationToken) -> Self {
        let head = Arc::new(AtomicU64::new(0));
        let gauge = head.clone();

        let task = tokio::spawn(async move {
            loop {
                if cancel.is_cancelled() {
                    break;
                }

                match run_subscription(&ws_endpoint, &gauge, &cancel).await {
                    Ok(()) => break, // cancelled
                    Err(error) => {
                        tracing::error!("Head subscription error: {error}, reconnecting");
                        tokio::select! {
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(RECONNECT_BACKOFF) => {}
                        }
                    }
                }
            }
            tracing::debug!("Head tracker stopped");
        });

        Self { head, task }
    }

    /// Returns the shared head gauge updated by the subscription.
    #[must_use]
    pub fn head_gauge(&self) -> Arc<AtomicU64> {
        self.head.clone()
    }

    /// Waits for the subscription task to finish (after cancellation).
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

async fn run_subscription(
    ws_endpoint: &str,
    head: &AtomicU64,
    cancel: &CancellationToken,
) -> Result<(), RpcClientError> {
    let (mut stream, _) = tokio_tungstenite::connect_async(ws_endpoint)
        .await
        .map_err(|e| RpcClientError::Transport(e.to_string()))?;

    let subscribe = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_subscribe",
        "params": ["newHeads"],
    });
    stream
        .send(Message::text(subscribe.to_string()))
        .await
        .map_err(|e| RpcClientError::Transport(e.to_string()))?;

    tracing::info!("Subscribed to newHeads on {ws_endpoint}");

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                let _ = stream.close(None).await;
                return Ok(());
            }
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if let Some(number) = parse_head_number(&text) {
                        head.fetch_max(number, Ordering::Relaxed);
                        tracing::debug!("Observed chain head {number}");
                    }
                }
                Some(Ok(_)) => {} // pings and pongs are handled by the transport
                Some(Err(error)) => return Err(RpcClientError::Transport(error.to_string())),
                None => return Err(RpcClientError::SubscriptionClosed),
            }
        }
    }
}

fn parse_head_number(text: &str) -> Option<u64> {
    let message: SubscriptionMessage = serde_json::from_str(text).ok()?;
    if message.method.as_deref() != Some("eth_subscription") {
        return None;
    }
    Some(message.params?.result.number)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_parse_head_number_from_notification() {
        let text = r#"{
            "jsonrpc": "2.0",
            "method": "eth_subscription",
            "params": {
                "subscription": "0x9cef478923ff08bf67fde6c64013158d",
                "result": {"number": "0x1b4", "hash": "0xdead"}
            }
        }"#;
        assert_eq!(parse_head_number(text), Some(436));
    }

    #[rstest]
    fn test_parse_head_number_ignores_confirmations() {
        let confirmation = r#"{"jsonrpc": "2.0", "id": 1, "result": "0x9cef478923ff08bf"}"#;
        assert_eq!(parse_head_number(confirmation), None);
        assert_eq!(parse_head_number("not json"), None);
    }
}
