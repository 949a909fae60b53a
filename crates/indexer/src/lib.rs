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

//! Core indexing runtime for concentrated-liquidity AMM pools.
//!
//! The crate assembles a block-ordered event-reactor pipeline over a persistent
//! per-pool tick store:
//!
//! ```text
//! Dispatcher ──height──► Crawler ──receipts──► Parser ──events──► Reactor ──► Store
//!     ▲ (chain head subscription)      (N workers, resequenced)               │
//!     └────────────────── Store (finish-height watermark) ◄──── read API ─────┘
//! ```
//!
//! The read side (`getter`, `depth`, `arbitrage`) is exposed as a library interface
//! for an external HTTP collaborator; no server lives here.

pub mod arbitrage;
pub mod config;
pub mod depth;
pub mod error;
pub mod getter;
pub mod lens;
pub mod pairs;
pub mod pipeline;
pub mod reporting;
pub mod rpc;
pub mod store;
