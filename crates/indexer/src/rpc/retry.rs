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

//! Retry policy for chain RPC calls: infinite attempts with a fixed delay, bounded
//! by an overall per-call deadline. Errors are classified at the call site; only
//! retryable ones re-enter the loop.

use std::{future::Future, time::Duration};

use crate::rpc::RpcClientError;

/// Delay between attempts.
pub const RETRY_DELAY: Duration = Duration::from_micros(100);

/// Overall deadline for one attempt group.
pub const CALL_DEADLINE: Duration = Duration::from_secs(300);

/// Retries `operation` until it succeeds, fails with a non-retryable error, or the
/// [`CALL_DEADLINE`] elapses.
///
/// # Errors
///
/// Returns the first non-retryable error, or [`RpcClientError::DeadlineExceeded`]
/// when the deadline elapses while retrying.
pub async fn with_retry<T, F, Fut>(operation: F) -> Result<T, RpcClientError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, RpcClientError>>,
{
    let attempts = async {
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() => {
                    tracing::debug!("Retrying RPC call after transient error: {error}");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(error) => return Err(error),
            }
        }
    };

    match tokio::time::timeout(CALL_DEADLINE, attempts).await {
        Ok(result) => result,
        Err(_) => Err(RpcClientError::DeadlineExceeded(format!(
            "{}s",
            CALL_DEADLINE.as_secs()
        ))),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
