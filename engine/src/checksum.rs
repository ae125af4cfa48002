//! Deterministic content hashing used for integrity checks everywhere.

use sha3::{Digest, Sha3_512};

/// Number of bytes in a checksum (SHA3-512).
pub const CHECKSUM_BYTES: usize = 64;

/// Compute the SHA3-512 checksum of the given bytes.
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_BYTES] {
    let digest = Sha3_512::digest(data);
    let mut out = [0u8; CHECKSUM_BYTES];
    out.copy_from_slice(&digest);
    out
}

/// Check that `expected` matches the recomputed checksum of `data`.
///
/// The comparison is length- and byte-exact; a stored checksum is never
/// trusted without being re-derived.
pub fn verify(data: &[u8], expected: &[u8]) -> bool {
    let actual = checksum(data);
    expected.len() == actual.len() && expected == actual
}
