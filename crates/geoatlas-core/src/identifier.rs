//! Reversible identifier codec for region-sharded datasets.
//!
//! A synthetic identifier packs a region code and the external (source)
//! identifier of an entity into one signed 64-bit value, so every shard of a
//! world-wide dataset keeps globally unique identifiers while the original
//! identifier and region stay recoverable.
//!
//! ## Layout
//!
//! ```text
//!  63                                        12 11          0
//! +--------------------------------------------+-------------+
//! |          external identifier (52 bits)     | region (12) |
//! +--------------------------------------------+-------------+
//! ```
//!
//! The packed word is unsigned. It is folded into the signed range
//! explicitly: words below 2^63 map to themselves, words at or above 2^63
//! map to `i64::MIN + (word - 2^63)`. Decoding unfolds the same way, so
//! every `i64` (including `i64::MIN` and `-1`) decodes to a non-negative
//! region and a non-negative external identifier.
//!
//! ## Boundary values
//!
//! | synthetic    | region | external id  |
//! |--------------|--------|--------------|
//! | `0`          | 0      | 0            |
//! | `i64::MAX`   | 4095   | 2^51 - 1     |
//! | `i64::MIN`   | 0      | 2^51         |
//! | `-1`         | 4095   | 2^52 - 1     |

use serde::{Deserialize, Serialize};

use crate::errors::{GeoAtlasError, Result};

/// Width of the low-order region segment
pub const REGION_BITS: u32 = 12;

/// Width of the high-order external identifier segment
pub const EXTERNAL_ID_BITS: u32 = 64 - REGION_BITS;

/// Largest encodable region code (4095)
pub const MAX_REGION_CODE: u16 = ((1u32 << REGION_BITS) - 1) as u16;

/// Largest encodable external identifier (2^52 - 1)
pub const MAX_EXTERNAL_ID: u64 = (1u64 << EXTERNAL_ID_BITS) - 1;

const REGION_MASK: u64 = MAX_REGION_CODE as u64;
const SIGN_OFFSET: u64 = 1u64 << 63;

/// Region code and external identifier recovered from a synthetic identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardedIdentifier {
    pub region: u16,
    pub external_id: u64,
}

/// Pack `region` and `external_id` into a synthetic identifier.
///
/// # Errors
///
/// `Range` when `region` exceeds [`MAX_REGION_CODE`] or `external_id`
/// exceeds [`MAX_EXTERNAL_ID`].
pub fn encode(region: u16, external_id: u64) -> Result<i64> {
    if region > MAX_REGION_CODE {
        return Err(GeoAtlasError::Range {
            operand: "region code",
            value: u64::from(region),
            bits: REGION_BITS,
            max: REGION_MASK,
        });
    }
    if external_id > MAX_EXTERNAL_ID {
        return Err(GeoAtlasError::Range {
            operand: "external identifier",
            value: external_id,
            bits: EXTERNAL_ID_BITS,
            max: MAX_EXTERNAL_ID,
        });
    }
    let word = (external_id << REGION_BITS) | u64::from(region);
    Ok(fold(word))
}

/// Region code of a synthetic identifier. Total: every `i64` decodes.
pub fn decode_region(synthetic: i64) -> u16 {
    (unfold(synthetic) & REGION_MASK) as u16
}

/// External identifier of a synthetic identifier. Total: every `i64` decodes.
pub fn decode_external_id(synthetic: i64) -> u64 {
    unfold(synthetic) >> REGION_BITS
}

/// Region and external identifier of a synthetic identifier. Total.
pub fn decode(synthetic: i64) -> ShardedIdentifier {
    ShardedIdentifier {
        region: decode_region(synthetic),
        external_id: decode_external_id(synthetic),
    }
}

fn fold(word: u64) -> i64 {
    if word < SIGN_OFFSET {
        word as i64
    } else {
        // word - SIGN_OFFSET is in [0, 2^63 - 1]
        i64::MIN + (word - SIGN_OFFSET) as i64
    }
}

fn unfold(synthetic: i64) -> u64 {
    if synthetic >= 0 {
        synthetic as u64
    } else {
        // synthetic - i64::MIN is in [0, 2^63 - 1]
        (synthetic - i64::MIN) as u64 + SIGN_OFFSET
    }
}
