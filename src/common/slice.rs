use num_bigint::{BigInt, Sign};

/// Serialises the magnitudes of the given integers as big-endian byte vectors.
pub fn bigints_to_bytes(bigints: &[&BigInt]) -> Vec<Vec<u8>> {
    bigints.iter().map(|b| b.to_bytes_be().1).collect()
}

/// Reconstructs non-negative integers from big-endian byte vectors.
pub fn multi_bytes_to_bigints(bytes: &[Vec<u8>]) -> Vec<BigInt> {
    bytes.iter().map(|b| BigInt::from_bytes_be(Sign::Plus, b)).collect()
}

pub fn non_empty_bytes(bz: &[u8]) -> bool {
    !bz.is_empty()
}

pub fn non_empty_multi_bytes(bzs: &[Vec<u8>], expect_len: Option<usize>) -> bool {
    if let Some(len) = expect_len {
        if bzs.len() != len {
            return false;
        }
    }
    bzs.iter().all(|bz| non_empty_bytes(bz))
}
