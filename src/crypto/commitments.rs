// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use crate::common::{
    hash::sha512_256i,
    random::must_get_random_int,
    slice::{bigints_to_bytes, multi_bytes_to_bigints},
};

use num_bigint::{BigInt, Sign};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// 256 bits of blinding randomness, matching the digest width.
const COMMITMENT_RANDOMNESS_BITS: u64 = 256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitmentError {
    #[error("malformed commitment data: {0}")]
    Malformed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// The public, transmittable binding C = H(r, v1, ..., vk).
/// Reveals nothing about the committed values on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    c: BigInt,
}

/// The private witness of a commitment: the blinding randomness followed by
/// the committed values. Kept secret until the protocol's reveal step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Open {
    randomness: BigInt,
    values: Vec<BigInt>,
}

/// Binds the given values under fresh 256-bit randomness.
pub fn commit<R: CryptoRng + RngCore>(
    rng: &mut R,
    values: &[&BigInt],
) -> Result<(Commitment, Open), CommitmentError> {
    let randomness = must_get_random_int(rng, COMMITMENT_RANDOMNESS_BITS);

    let mut parts: Vec<&BigInt> = Vec::with_capacity(values.len() + 1);
    parts.push(&randomness);
    parts.extend_from_slice(values);

    let c = sha512_256i(&parts)
        .ok_or_else(|| CommitmentError::Internal("commitment hash over an empty input".to_string()))?;

    let open = Open {
        randomness,
        values: values.iter().map(|v| (*v).clone()).collect(),
    };
    Ok((Commitment { c }, open))
}

impl Commitment {
    /// Deterministically checks that `open` is a valid opening of this
    /// commitment. A mismatch is a protocol-abort signal for the caller.
    pub fn verify(&self, open: &Open) -> bool {
        let mut parts: Vec<&BigInt> = Vec::with_capacity(open.values.len() + 1);
        parts.push(&open.randomness);
        parts.extend(open.values.iter());

        match sha512_256i(&parts) {
            Some(hash) => hash == self.c,
            None => false,
        }
    }

    pub fn value(&self) -> &BigInt {
        &self.c
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.c.to_bytes_be().1
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Commitment { c: BigInt::from_bytes_be(Sign::Plus, bytes) }
    }
}

impl Open {
    /// The committed values. Meaningful only after the paired commitment has
    /// been verified.
    pub fn values(&self) -> &[BigInt] {
        &self.values
    }

    /// Serialises as [r, v1, ..., vk] in big-endian byte vectors.
    pub fn to_bytes(&self) -> Vec<Vec<u8>> {
        let mut parts: Vec<&BigInt> = Vec::with_capacity(self.values.len() + 1);
        parts.push(&self.randomness);
        parts.extend(self.values.iter());
        bigints_to_bytes(&parts)
    }

    pub fn from_bytes(bzs: &[Vec<u8>]) -> Result<Self, CommitmentError> {
        if bzs.is_empty() {
            return Err(CommitmentError::Malformed("opening must carry at least the randomness".to_string()));
        }
        let mut ints = multi_bytes_to_bigints(bzs);
        let randomness = ints.remove(0);
        Ok(Open { randomness, values: ints })
    }
}
