// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::{BigInt, Sign};
use sha2::{Digest, Sha512_256};

const HASH_INPUT_DELIMITER: u8 = b'$';

/// Frames the inputs with a count prefix, per-input delimiters and length
/// suffixes so that the digest is stable against re-partitioning of the
/// concatenated bytes.
fn prepare_hash_data(inputs: &[&[u8]]) -> Option<Vec<u8>> {
    if inputs.is_empty() {
        return None;
    }

    let input_len = inputs.len();
    let mut bz_size = 0;
    for bz in inputs {
        bz_size += bz.len();
    }

    let data_cap = 8 + bz_size + input_len + (input_len * 8);
    let mut data = Vec::with_capacity(data_cap);

    data.extend_from_slice(&u64::try_from(input_len).unwrap_or(u64::MAX).to_le_bytes());

    for bz in inputs {
        data.extend_from_slice(bz);
        data.push(HASH_INPUT_DELIMITER);
        data.extend_from_slice(&u64::try_from(bz.len()).unwrap_or(u64::MAX).to_le_bytes());
    }

    Some(data)
}

/// Computes a SHA-512/256 hash of the input byte slices.
/// Returns `None` for an empty input list.
pub fn sha512_256(inputs: &[&[u8]]) -> Option<Vec<u8>> {
    let data = prepare_hash_data(inputs)?;

    let mut state = Sha512_256::new();
    state.update(&data);
    Some(state.finalize().to_vec())
}

/// Computes a SHA-512/256 hash of the input `BigInt`s over their big-endian
/// magnitude encodings, interpreted back as a non-negative integer.
/// Returns `None` for an empty input list.
pub fn sha512_256i(inputs: &[&BigInt]) -> Option<BigInt> {
    if inputs.is_empty() {
        return None;
    }

    let input_bytes: Vec<Vec<u8>> = inputs.iter().map(|n| n.to_bytes_be().1).collect();
    let input_slices: Vec<&[u8]> = input_bytes.iter().map(|v| v.as_slice()).collect();

    let data = prepare_hash_data(&input_slices)?;

    let mut state = Sha512_256::new();
    state.update(&data);
    let hash_bytes = state.finalize();
    Some(BigInt::from_bytes_be(Sign::Plus, &hash_bytes))
}
