//! Domain-separated hashing over SHA-256 (RFC 6962 prefixes)

use sha2::{Digest, Sha256};

use crate::Hash32;

const DOMAIN_LEAF: u8 = 0x00;
const DOMAIN_INTERNAL: u8 = 0x01;

/// Leaf hash of a certificate blob
/// leaf = H(0x00 || blob)
pub fn leaf_hash(blob: &[u8]) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update([DOMAIN_LEAF]);
    hasher.update(blob);
    hasher.finalize().into()
}

/// Internal node hash
/// node = H(0x01 || left || right)
pub fn pair_hash(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut data = [0u8; 1 + 32 + 32];
    data[0] = DOMAIN_INTERNAL;
    data[1..33].copy_from_slice(left);
    data[33..].copy_from_slice(right);
    Sha256::digest(data).into()
}
