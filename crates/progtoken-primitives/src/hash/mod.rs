//! Hash function primitives.
//!
//! Provides Blake2b-224 and Blake2b-256, the two digests the ledger uses
//! for script/key hashes and for transaction/datum hashes respectively.

use blake2::digest::consts::{U28, U32};
use blake2::{Blake2b, Digest};

type Blake2b224 = Blake2b<U28>;
type Blake2b256 = Blake2b<U32>;

/// Compute the Blake2b-224 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 28-byte digest.
pub fn blake2b_224(data: &[u8]) -> [u8; 28] {
    let mut hasher = Blake2b224::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 28];
    output.copy_from_slice(&result);
    output
}

/// Compute the Blake2b-256 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte digest.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute a script hash: `Blake2b-224(language_tag || script_bytes)`.
///
/// The language tag is 0 for native scripts and 1, 2, 3 for Plutus V1,
/// V2 and V3. `script_bytes` is the script as it appears in a witness set
/// (for Plutus scripts, the CBOR byte string wrapping the flat program).
pub fn script_hash(language_tag: u8, script_bytes: &[u8]) -> [u8; 28] {
    let mut preimage = Vec::with_capacity(script_bytes.len() + 1);
    preimage.push(language_tag);
    preimage.extend_from_slice(script_bytes);
    blake2b_224(&preimage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2b_224_empty() {
        assert_eq!(
            hex::encode(blake2b_224(b"")),
            "836cc68931c2e4e3e838602eca1902591d216837bafddfe6f0c8cb07"
        );
    }

    #[test]
    fn blake2b_256_empty() {
        assert_eq!(
            hex::encode(blake2b_256(b"")),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn script_hash_prefixes_language_tag() {
        let script = [0x46, 0x01, 0x00, 0x00, 0x22, 0x49, 0x9f];
        let mut preimage = vec![3u8];
        preimage.extend_from_slice(&script);
        assert_eq!(script_hash(3, &script), blake2b_224(&preimage));
        assert_ne!(script_hash(3, &script), script_hash(2, &script));
    }
}
