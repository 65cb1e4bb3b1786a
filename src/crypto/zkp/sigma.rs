// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Generic plumbing for three-move (commit, challenge, response) proofs made
//! non-interactive through Fiat-Shamir hashing.
//!
//! The transmitted shape is fixed: every proof in this protocol family is the
//! 8-tuple carried by [`SigmaTranscript`]. The algebraic relation being proven
//! is not fixed here; it is supplied as a [`SigmaPredicate`] implementation.
//! Round-local proofs whose exact relations are still subject to confirmation
//! plug in through this trait rather than hard-coding their algebra.

use crate::common::slice::{bigints_to_bytes, multi_bytes_to_bigints};
use crate::crypto::curve::EcPoint;
use crate::crypto::zkp::ProofError;
use crate::protocol::params::PublicParameters;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

const TRANSCRIPT_BYTES_PARTS: usize = 9;

/// The prover's first move: one binding value per sub-relation.
#[derive(Clone, Debug)]
pub struct SigmaCommitments {
    pub z: BigInt,
    pub u1: EcPoint,
    pub u2: BigInt,
    pub u3: BigInt,
}

/// The prover's third move.
#[derive(Clone, Debug)]
pub struct SigmaResponses {
    pub s1: BigInt,
    pub s2: BigInt,
    pub s3: BigInt,
}

/// The complete non-interactive transcript (z, u1, u2, u3, e, s1, s2, s3).
/// This is the only thing a prover ever transmits; witnesses never leave the
/// proving call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SigmaTranscript {
    pub z: BigInt,
    pub u1: EcPoint,
    pub u2: BigInt,
    pub u3: BigInt,
    pub e: BigInt,
    pub s1: BigInt,
    pub s2: BigInt,
    pub s3: BigInt,
}

impl SigmaTranscript {
    /// Structural sanity: components present, signs as produced by an honest
    /// prover. Algebraic checking is the predicate's job.
    pub fn validate_basic(&self) -> bool {
        !self.z.is_zero()
            && !self.u1.is_identity()
            && !self.u2.is_zero()
            && !self.u3.is_zero()
            && !self.e.is_negative()
            && !self.e.is_zero()
            && !self.s1.is_negative()
            && !self.s2.is_zero()
            && !self.s2.is_negative()
            && !self.s3.is_negative()
    }

    /// Serialises as [z, u1.x, u1.y, u2, u3, e, s1, s2, s3].
    pub fn to_bytes(&self) -> Result<Vec<Vec<u8>>, ProofError> {
        let (u1x, u1y) = self
            .u1
            .coords()
            .ok_or_else(|| ProofError::Malformed("transcript u1 is the identity".to_string()))?;
        let parts = vec![&self.z, &u1x, &u1y, &self.u2, &self.u3, &self.e, &self.s1, &self.s2, &self.s3];
        Ok(bigints_to_bytes(&parts))
    }

    pub fn from_bytes(bzs: &[Vec<u8>]) -> Result<Self, ProofError> {
        if bzs.len() != TRANSCRIPT_BYTES_PARTS {
            return Err(ProofError::ByteConversion {
                expected: TRANSCRIPT_BYTES_PARTS,
                got: bzs.len(),
            });
        }
        let ints = multi_bytes_to_bigints(bzs);
        let u1 = EcPoint::from_coords(&ints[1], &ints[2])
            .map_err(|e| ProofError::Malformed(format!("transcript u1: {}", e)))?;
        Ok(Self {
            z: ints[0].clone(),
            u1,
            u2: ints[3].clone(),
            u3: ints[4].clone(),
            e: ints[5].clone(),
            s1: ints[6].clone(),
            s2: ints[7].clone(),
            s3: ints[8].clone(),
        })
    }
}

/// The pluggable relation behind a Sigma proof.
///
/// `commit` draws the per-proof nonces and produces the first move;
/// `challenge` derives the Fiat-Shamir challenge from the public inputs and
/// the first move only; `respond` consumes the nonces; `check` re-derives the
/// commitments from a transcript and accepts or rejects it.
pub trait SigmaPredicate {
    type Statement;
    type Witness;
    type Nonces;

    fn commit<R: CryptoRng + RngCore>(
        &self,
        params: &PublicParameters,
        statement: &Self::Statement,
        witness: &Self::Witness,
        rng: &mut R,
    ) -> Result<(SigmaCommitments, Self::Nonces), ProofError>;

    fn challenge(
        &self,
        params: &PublicParameters,
        statement: &Self::Statement,
        commitments: &SigmaCommitments,
    ) -> Result<BigInt, ProofError>;

    fn respond(
        &self,
        params: &PublicParameters,
        witness: &Self::Witness,
        nonces: Self::Nonces,
        e: &BigInt,
    ) -> SigmaResponses;

    fn check(
        &self,
        params: &PublicParameters,
        statement: &Self::Statement,
        transcript: &SigmaTranscript,
    ) -> bool;
}

/// Runs the three moves in order and assembles the transcript. The challenge
/// is derived strictly after the first move exists, and the nonces are
/// consumed by the response; nothing secret survives this call.
pub fn prove<P: SigmaPredicate, R: CryptoRng + RngCore>(
    predicate: &P,
    params: &PublicParameters,
    statement: &P::Statement,
    witness: &P::Witness,
    rng: &mut R,
) -> Result<SigmaTranscript, ProofError> {
    let (commitments, nonces) = predicate.commit(params, statement, witness, rng)?;
    let e = predicate.challenge(params, statement, &commitments)?;
    let SigmaResponses { s1, s2, s3 } = predicate.respond(params, witness, nonces, &e);

    Ok(SigmaTranscript {
        z: commitments.z,
        u1: commitments.u1,
        u2: commitments.u2,
        u3: commitments.u3,
        e,
        s1,
        s2,
        s3,
    })
}

/// Structurally validates and then algebraically checks a transcript.
pub fn verify<P: SigmaPredicate>(
    predicate: &P,
    params: &PublicParameters,
    statement: &P::Statement,
    transcript: &SigmaTranscript,
) -> bool {
    transcript.validate_basic() && predicate.check(params, statement, transcript)
}
