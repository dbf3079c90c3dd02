//! LaboonHash: the ledger's toy hash function.
//!
//! This is NOT a cryptographic hash. It exists to make proof-of-work easy to
//! follow by hand and must never be used to protect real data.

use crate::error::{LaboonError, Result};

/// A 32-bit hash value. Arithmetic on it wraps, and the wraparound is part
/// of the definition.
pub type Hash = i32;

/// Nonces share the hash width so that they render the same way.
pub type Nonce = i32;

/// `prev_hash` of the first block in every chain.
pub const GENESIS_HASH: Hash = 0;

/// Width of a rendered hash or nonce.
pub const HEX_WIDTH: usize = 8;

const SEED: i32 = 10_000_000;

/// Hashes `data` one UTF-16 code unit at a time: `n = n * c + c`, wrapping
/// on every step.
///
/// ```
/// assert_eq!(rust_laboon::laboon_hash("boo"), 0x551f_da32);
/// ```
pub fn laboon_hash(data: &str) -> Hash {
    data.encode_utf16().fold(SEED, |n, unit| {
        let c = i32::from(unit);
        n.wrapping_mul(c).wrapping_add(c)
    })
}

/// Eight lowercase hex digits. Negative values render as two's complement.
pub fn to_hex(value: i32) -> String {
    hex::encode(value.to_be_bytes())
}

/// Eight uppercase hex digits, as used in block records.
pub fn to_hex_upper(value: i32) -> String {
    hex::encode_upper(value.to_be_bytes())
}

/// Parses exactly eight hex digits, in either case, back into a value.
pub fn from_hex(text: &str) -> Result<i32> {
    if text.len() != HEX_WIDTH {
        return Err(LaboonError::HashError(format!(
            "期望 {} 位十六进制, 实际为 {:?}",
            HEX_WIDTH, text
        )));
    }
    let mut bytes = [0u8; 4];
    hex::decode_to_slice(text, &mut bytes)?;
    Ok(i32::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boo_vector() {
        assert_eq!(laboon_hash("boo"), 1428150834);
        assert_eq!(to_hex(laboon_hash("boo")), "551fda32");
    }

    #[test]
    fn test_empty_input_is_seed() {
        assert_eq!(laboon_hash(""), 10_000_000);
        assert_eq!(to_hex(laboon_hash("")), "00989680");
    }

    #[test]
    fn test_wraps_to_negative() {
        assert_eq!(laboon_hash("what"), -996011160);
        assert_eq!(to_hex_upper(laboon_hash("what")), "C4A21368");
    }

    #[test]
    fn test_non_ascii_uses_utf16_units() {
        assert_eq!(laboon_hash("héllo"), -1588145885);
        assert_eq!(laboon_hash("日本"), 964567944);
        // 代理对按两个码元分别参与计算
        assert_eq!(laboon_hash("😀"), -323173376);
    }

    #[test]
    fn test_hex_rendering() {
        assert_eq!(to_hex(0), "00000000");
        assert_eq!(to_hex(-1), "ffffffff");
        assert_eq!(to_hex_upper(-1), "FFFFFFFF");
        assert_eq!(to_hex_upper(11), "0000000B");
        assert_eq!(to_hex_upper(i32::MIN), "80000000");
    }

    #[test]
    fn test_from_hex() -> Result<()> {
        assert_eq!(from_hex("001AA59C")?, 1746332);
        assert_eq!(from_hex("000e854a")?, 951626);
        assert_eq!(from_hex("FFFFFFFF")?, -1);
        Ok(())
    }

    #[test]
    fn test_from_hex_rejects_malformed() {
        assert!(matches!(from_hex("1AA59C"), Err(LaboonError::HashError(_))));
        assert!(matches!(from_hex("0000000G"), Err(LaboonError::HashError(_))));
        assert!(matches!(from_hex("000000000"), Err(LaboonError::HashError(_))));
    }

    proptest! {
        #[test]
        fn prop_hash_is_deterministic(data in ".*") {
            prop_assert_eq!(laboon_hash(&data), laboon_hash(&data));
        }

        #[test]
        fn prop_matches_masked_u64_arithmetic(data in ".{0,64}") {
            let mut n: u64 = 10_000_000;
            for unit in data.encode_utf16() {
                let c = u64::from(unit);
                n = (n * c + c) & 0xffff_ffff;
            }
            prop_assert_eq!(laboon_hash(&data), n as u32 as i32);
        }

        #[test]
        fn prop_hex_parses_back(value in any::<i32>()) {
            prop_assert_eq!(from_hex(&to_hex(value)).unwrap(), value);
            prop_assert_eq!(from_hex(&to_hex_upper(value)).unwrap(), value);
        }
    }
}
