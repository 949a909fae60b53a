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

//! Out-of-order producers → in-order consumer gate.
//!
//! Parallel crawler workers finish in arbitrary order; the sequencer blocks each
//! committer until every lower sequence has been delivered, restoring a gap-free
//! ascending stream. A missing sequence stalls the pipeline by design: producers
//! guarantee that every dispatched height eventually commits exactly once.

use tokio::sync::{mpsc, watch};

use crate::rpc::types::BlockReceipts;

/// Items that carry a pipeline sequence (the block height).
pub trait Sequenced {
    /// Returns the item's sequence number.
    fn sequence(&self) -> u64;
}

impl Sequenced for BlockReceipts {
    fn sequence(&self) -> u64 {
        self.height
    }
}

impl Sequenced for u64 {
    fn sequence(&self) -> u64 {
        *self
    }
}

/// Restores ascending contiguous order across concurrent committers.
///
/// Constructed with the first expected sequence; [`Sequencer::commit`] suspends
/// until the item's sequence is next, forwards it, then wakes the other waiters.
#[derive(Debug)]
pub struct Sequencer {
    next: watch::Sender<u64>,
}

impl Sequencer {
    /// Creates a sequencer whose first accepted sequence is `from_sequence`.
    #[must_use]
    pub fn starting_at(from_sequence: u64) -> Self {
        Self {
            next: watch::Sender::new(from_sequence),
        }
    }

    /// Commits `item`, blocking until all lower sequences have been forwarded, then
    /// sends it to `out` and advances the gate.
    ///
    /// # Errors
    ///
    /// Returns an error if the output channel is closed.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate commit (a sequence at or below one already delivered),
    /// which is a fatal pipeline invariant violation.
    pub async fn commit<T: Sequenced>(
        &self,
        item: T,
        out: &mpsc::Sender<T>,
    ) -> Result<(), mpsc::error::SendError<T>> {
        let sequence = item.sequence();
        let mut gate = self.next.subscribe();

        assert!(
            sequence >= *gate.borrow_and_update(),
            "duplicate sequencer commit for sequence {sequence}",
        );

        gate.wait_for(|next| *next == sequence)
            .await
            .expect("sequencer gate dropped");

        out.send(item).await?;

        self.next.send_modify(|next| {
            assert_eq!(
                *next, sequence,
                "duplicate sequencer commit for sequence {sequence}",
            );
            *next += 1;
        });

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
