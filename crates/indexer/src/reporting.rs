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

//! Progress reporting for the indexing stream.

use std::time::Instant;

/// Formats a number with comma separators for better readability.
/// Example: 1234567 -> "1,234,567".
fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let chars: Vec<char> = digits.chars().collect();
    let mut result = String::with_capacity(chars.len() + chars.len() / 3);

    for (i, ch) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*ch);
    }

    result
}

/// Tracks throughput of the block-event stream and logs progress periodically.
///
/// Progress lines are emitted at block-count thresholds, rate-limited to at most
/// one per second.
#[derive(Debug)]
pub struct BlockSyncReporter {
    start_time: Instant,
    last_progress_time: Instant,
    blocks_processed: u64,
    blocks_since_last_report: u64,
    progress_update_interval: u64,
    next_progress_threshold: u64,
}

impl BlockSyncReporter {
    /// Creates a reporter starting at `from_block`, reporting every
    /// `update_interval` blocks.
    #[must_use]
    pub fn new(from_block: u64, update_interval: u64) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_progress_time: now,
            blocks_processed: 0,
            blocks_since_last_report: 0,
            progress_update_interval: update_interval,
            next_progress_threshold: from_block + update_interval,
        }
    }

    /// Records one processed block.
    pub fn update(&mut self) {
        self.blocks_processed += 1;
        self.blocks_since_last_report += 1;
    }

    /// Returns `true` when the threshold is reached and at least a second has
    /// passed since the last progress line.
    #[must_use]
    pub fn should_log_progress(&self, block_number: u64) -> bool {
        block_number >= self.next_progress_threshold
            && self.last_progress_time.elapsed().as_secs_f64() >= 1.0
    }

    /// Logs current throughput and advances the reporting threshold.
    pub fn log_progress(&mut self, block_number: u64) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let interval_elapsed = self.last_progress_time.elapsed().as_secs_f64();

        let avg_rate = if elapsed > 0.0 {
            self.blocks_processed as f64 / elapsed
        } else {
            0.0
        };
        let interval_rate = if interval_elapsed > 0.0 {
            self.blocks_since_last_report as f64 / interval_elapsed
        } else {
            0.0
        };

        tracing::info!(
            "Processed {} blocks up to {} ({avg_rate:.1} blocks/s avg, {interval_rate:.1} blocks/s current)",
            format_number(self.blocks_processed),
            format_number(block_number),
        );

        self.blocks_since_last_report = 0;
        self.last_progress_time = Instant::now();
        self.next_progress_threshold = block_number + self.progress_update_interval;
    }

    /// Logs the final totals when the stream ends.
    pub fn log_final_stats(&self) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let avg_rate = if elapsed > 0.0 {
            self.blocks_processed as f64 / elapsed
        } else {
            0.0
        };
        tracing::info!(
            "Stream finished: {} blocks in {elapsed:.1}s ({avg_rate:.1} blocks/s)",
            format_number(self.blocks_processed),
        );
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
