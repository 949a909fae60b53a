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

//! Wire types for JSON-RPC payloads and the pipeline's block-receipt wrapper.

use alloy_primitives::{Address, B256, Bytes};
use serde::{Deserialize, Deserializer};

/// JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// JSON-RPC response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
}

/// Converts a `0x`-prefixed hexadecimal quantity to `u64`.
///
/// # Errors
///
/// Returns a `std::num::ParseIntError` if the input is not valid hexadecimal or
/// overflows a `u64`.
pub fn from_str_hex_to_u64(hex_string: &str) -> Result<u64, std::num::ParseIntError> {
    let without_prefix = hex_string
        .strip_prefix("0x")
        .or_else(|| hex_string.strip_prefix("0X"))
        .unwrap_or(hex_string);
    u64::from_str_radix(without_prefix, 16)
}

/// Custom deserializer for hex quantities.
///
/// # Errors
///
/// Returns an error if parsing the hex string fails.
pub fn deserialize_hex_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let hex_string = String::deserialize(deserializer)?;
    from_str_hex_to_u64(&hex_string).map_err(serde::de::Error::custom)
}

/// Custom deserializer for optional hex quantities; absent or `null` maps to `None`.
///
/// # Errors
///
/// Returns an error if a present value is not valid hexadecimal.
pub fn deserialize_opt_hex_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(hex_string) => from_str_hex_to_u64(&hex_string)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// A single log entry of a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Log {
    /// Address of the contract that emitted the log.
    pub address: Address,
    /// Indexed topics; `topics[0]` carries the event signature hash.
    #[serde(default)]
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed event data.
    #[serde(default)]
    pub data: Bytes,
}

/// A transaction receipt, reduced to the fields the parser consumes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Post-execution status; `1` means success.
    #[serde(default, deserialize_with = "deserialize_opt_hex_u64")]
    pub status: Option<u64>,
    /// Logs emitted by the transaction, in emission order.
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    /// Returns `true` if the transaction executed successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Some(1)
    }
}

/// A block header, reduced to the height the dispatcher tracks.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockHeader {
    /// The block height.
    #[serde(deserialize_with = "deserialize_hex_u64")]
    pub number: u64,
}

/// All receipts of one block, carrying pipeline order.
///
/// `receipts` is `None` when the node reported "no data" for the height via a
/// classified non-retryable error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockReceipts {
    /// The block height the receipts belong to.
    pub height: u64,
    /// The block's receipts in transaction order, if available.
    pub receipts: Option<Vec<TransactionReceipt>>,
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0x0", 0)]
    #[case("0x1", 1)]
    #[case("0x1581b7e", 22_551_422)]
    #[case("ff", 255)]
    fn test_from_str_hex_to_u64(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(from_str_hex_to_u64(input).unwrap(), expected);
    }

    #[rstest]
    fn test_from_str_hex_rejects_garbage() {
        assert!(from_str_hex_to_u64("0xzz").is_err());
        assert!(from_str_hex_to_u64("0x10000000000000000").is_err());
    }

    #[rstest]
    fn test_receipt_deserializes_from_rpc_json() {
        let json = r#"{
            "status": "0x1",
            "transactionHash": "0xabc0000000000000000000000000000000000000000000000000000000000000",
            "logs": [{
                "address": "0x36696169c63e42cd08ce11f5deebbcebae652050",
                "topics": ["0xc42079f94a6350d7e6235f29174924f928cc2ac818eb64fed8004e115fbcca67"],
                "data": "0x00"
            }]
        }"#;

        let receipt: TransactionReceipt = serde_json::from_str(json).unwrap();
        assert!(receipt.is_success());
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(receipt.logs[0].topics.len(), 1);
    }

    #[rstest]
    fn test_failed_receipt_status() {
        let receipt: TransactionReceipt = serde_json::from_str(r#"{"status": "0x0"}"#).unwrap();
        assert!(!receipt.is_success());

        let missing: TransactionReceipt = serde_json::from_str("{}").unwrap();
        assert!(!missing.is_success());
    }

    #[rstest]
    fn test_block_header_number() {
        let header: BlockHeader = serde_json::from_str(r#"{"number": "0x10"}"#).unwrap();
        assert_eq!(header.number, 16);
    }
}
