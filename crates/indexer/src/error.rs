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

use thiserror::Error;

use crate::{getter::PoolStateError, rpc::RpcClientError, store::StoreError};

/// Top-level error of the indexing runtime.
///
/// Anything surfacing here is fatal for the pipeline: store failures, RPC failures
/// that outlived their retry budget, and pool-state failures outside the ignorable
/// classification. The finish-height watermark guarantees a safe resume after
/// process exit.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// Persistent store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Chain RPC failure.
    #[error(transparent)]
    Rpc(#[from] RpcClientError),
    /// Pool-state resolution failure.
    #[error(transparent)]
    PoolState(#[from] PoolStateError),
}
