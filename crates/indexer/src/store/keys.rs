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

//! Key encoding for the persistent tick store.
//!
//! Every logical key starts with a 2-byte namespace tag. Tick-state keys append the
//! 20-byte pool address and an order-preserving big-endian `int32` so that
//! lexicographic byte order equals numeric tick order across negative and positive
//! ticks.

use alloy_primitives::Address;

/// Namespace tag of the global finish-height watermark.
pub const NS_FINISH_HEIGHT: [u8; 2] = *b"1:";
/// Namespace tag of per-(pool, tick) net-liquidity state.
pub const NS_TICK_STATE: [u8; 2] = *b"2:";
/// Namespace tag of per-pool current tick.
pub const NS_CURRENT_TICK: [u8; 2] = *b"3:";
/// Namespace tag of per-pool tick spacing.
pub const NS_TICK_SPACING: [u8; 2] = *b"4:";
/// Namespace tag of per-pool applied-height watermark.
pub const NS_POOL_HEIGHT: [u8; 2] = *b"5:";

/// Length of a per-pool key: tag ∥ address.
pub const POOL_KEY_LEN: usize = 22;
/// Length of a tick-state key: tag ∥ address ∥ ordered int32.
pub const TICK_STATE_KEY_LEN: usize = 26;

/// Maps `tick` onto `u32` so that big-endian byte order preserves numeric order.
#[must_use]
pub fn ordered_tick_bytes(tick: i32) -> [u8; 4] {
    (tick as u32).wrapping_add(0x8000_0000).to_be_bytes()
}

/// Inverse of [`ordered_tick_bytes`].
#[must_use]
pub fn tick_from_ordered_bytes(bytes: [u8; 4]) -> i32 {
    u32::from_be_bytes(bytes).wrapping_sub(0x8000_0000) as i32
}

fn pool_key(tag: [u8; 2], address: &Address) -> [u8; POOL_KEY_LEN] {
    let mut key = [0u8; POOL_KEY_LEN];
    key[..2].copy_from_slice(&tag);
    key[2..].copy_from_slice(address.as_slice());
    key
}

/// Key of the global finish-height watermark.
#[must_use]
pub fn finish_height_key() -> [u8; 2] {
    NS_FINISH_HEIGHT
}

/// Key of a pool's current tick.
#[must_use]
pub fn current_tick_key(address: &Address) -> [u8; POOL_KEY_LEN] {
    pool_key(NS_CURRENT_TICK, address)
}

/// Key of a pool's tick spacing.
#[must_use]
pub fn tick_spacing_key(address: &Address) -> [u8; POOL_KEY_LEN] {
    pool_key(NS_TICK_SPACING, address)
}

/// Key of a pool's applied-height watermark.
#[must_use]
pub fn pool_height_key(address: &Address) -> [u8; POOL_KEY_LEN] {
    pool_key(NS_POOL_HEIGHT, address)
}

/// Key of one pool tick's net-liquidity state.
#[must_use]
pub fn tick_state_key(address: &Address, tick: i32) -> [u8; TICK_STATE_KEY_LEN] {
    let mut key = [0u8; TICK_STATE_KEY_LEN];
    key[..2].copy_from_slice(&NS_TICK_STATE);
    key[2..22].copy_from_slice(address.as_slice());
    key[22..].copy_from_slice(&ordered_tick_bytes(tick));
    key
}

/// Decodes a tick-state key into its pool address and tick.
///
/// Returns `None` if `key` does not carry the tick-state namespace tag or has the
/// wrong length.
#[must_use]
pub fn decode_tick_state_key(key: &[u8]) -> Option<(Address, i32)> {
    if key.len() != TICK_STATE_KEY_LEN || key[..2] != NS_TICK_STATE {
        return None;
    }

    let address = Address::from_slice(&key[2..22]);
    let mut tick_bytes = [0u8; 4];
    tick_bytes.copy_from_slice(&key[22..]);
    Some((address, tick_from_ordered_bytes(tick_bytes)))
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use rstest::rstest;
    use tickstate_model::{MAX_TICK, MIN_TICK};

    use super::*;

    const POOL: Address = address!("36696169c63e42cd08ce11f5deebbcebae652050");

    #[rstest]
    #[case(-1, 0)]
    #[case(0, 1)]
    #[case(-1, 1)]
    #[case(MIN_TICK, MAX_TICK)]
    #[case(MIN_TICK, MIN_TICK + 1)]
    #[case(MAX_TICK - 1, MAX_TICK)]
    fn test_key_order_matches_tick_order(#[case] lower: i32, #[case] higher: i32) {
        let lower_key = tick_state_key(&POOL, lower);
        let higher_key = tick_state_key(&POOL, higher);
        assert!(lower_key < higher_key, "key order broken for {lower} < {higher}");
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(1)]
    #[case(MIN_TICK)]
    #[case(MAX_TICK)]
    fn test_ordered_tick_bytes_round_trip(#[case] tick: i32) {
        assert_eq!(tick_from_ordered_bytes(ordered_tick_bytes(tick)), tick);
    }

    #[rstest]
    fn test_decode_tick_state_key() {
        let key = tick_state_key(&POOL, -887_272);
        assert_eq!(decode_tick_state_key(&key), Some((POOL, -887_272)));

        assert_eq!(decode_tick_state_key(&current_tick_key(&POOL)), None);
        assert_eq!(decode_tick_state_key(b"2:short"), None);
    }

    #[rstest]
    fn test_namespaces_are_disjoint() {
        let keys = [
            current_tick_key(&POOL),
            tick_spacing_key(&POOL),
            pool_height_key(&POOL),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
