// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Proof of knowledge of a value `eta` that is simultaneously the discrete
//! logarithm of a curve point and the plaintext of a Paillier ciphertext.
//! This is the relation attached to each party's key-generation share.

use crate::common::{
    hash::sha512_256i,
    int::{is_in_interval, ModInt},
    random::{get_random_positive_int, get_random_positive_relatively_prime_int},
    slice::{bigints_to_bytes, multi_bytes_to_bigints},
};
use crate::crypto::curve::{self, EcPoint};
use crate::crypto::zkp::sigma::{self, SigmaCommitments, SigmaPredicate, SigmaResponses, SigmaTranscript};
use crate::crypto::zkp::ProofError;
use crate::protocol::params::PublicParameters;

use log::{debug, error, warn};
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{Signed, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

const ENC_DLOG_PROOF_BYTES_PARTS: usize = 9;

/// Public inputs of the relation. On the proving side `point` is the group
/// base the discrete logarithm refers to; on the verifying side it is the
/// prover's public point `Y = eta * G`.
#[derive(Clone, Debug)]
pub struct EncDlogStatement {
    pub point: EcPoint,
    pub cipher: BigInt,
}

/// The prover's secrets: the committed value and the Paillier randomness of
/// its encryption.
#[derive(Clone, Debug)]
pub struct EncDlogWitness {
    pub eta: BigInt,
    pub rand: BigInt,
}

/// Per-proof nonces; consumed by the response move and never transmitted.
pub struct EncDlogNonces {
    alpha: BigInt,
    beta: BigInt,
    rho: BigInt,
    gamma: BigInt,
}

/// The key-generation relation as a pluggable Sigma predicate.
pub struct EncDlogPredicate;

impl SigmaPredicate for EncDlogPredicate {
    type Statement = EncDlogStatement;
    type Witness = EncDlogWitness;
    type Nonces = EncDlogNonces;

    fn commit<R: CryptoRng + RngCore>(
        &self,
        params: &PublicParameters,
        statement: &Self::Statement,
        witness: &Self::Witness,
        rng: &mut R,
    ) -> Result<(SigmaCommitments, Self::Nonces), ProofError> {
        let q = curve::order();
        let n_tilde = params.n_tilde();
        let q2 = q * q;
        let q3 = &q2 * q;

        // alpha <- Z_(q^3), beta <- Z*_N, rho <- Z_(q*Ntilde), gamma <- Z_(q^3*Ntilde)
        let alpha = get_random_positive_int(rng, &q3)
            .ok_or_else(|| ProofError::Internal("failed to sample alpha".to_string()))?;
        let beta = get_random_positive_relatively_prime_int(rng, params.n())
            .ok_or_else(|| ProofError::Internal("failed to sample beta".to_string()))?;
        let rho = get_random_positive_int(rng, &(q * n_tilde))
            .ok_or_else(|| ProofError::Internal("failed to sample rho".to_string()))?;
        let gamma = get_random_positive_int(rng, &(&q3 * n_tilde))
            .ok_or_else(|| ProofError::Internal("failed to sample gamma".to_string()))?;

        let mod_n_tilde = ModInt::new(n_tilde.clone());
        let mod_n_square = ModInt::new(params.paillier().n_square());

        // z = h1^eta * h2^rho mod Ntilde
        let h1_eta = mod_n_tilde.exp(params.h1(), &witness.eta);
        let h2_rho = mod_n_tilde.exp(params.h2(), &rho);
        let z = mod_n_tilde.mul(&h1_eta, &h2_rho);

        // A negative alpha is lifted into the base field only where it acts
        // as an EC scalar; its other algebraic uses keep the raw value.
        let alpha_ec = if alpha.sign() == Sign::Minus {
            &alpha + curve::field_prime()
        } else {
            alpha.clone()
        };

        // u1 = alpha * G' over the statement's base point
        let u1 = statement.point.scalar_mul(&alpha_ec);

        // u2 = Gamma^alpha * beta^N mod N^2
        let gamma_alpha = mod_n_square.exp(&params.paillier().gamma(), &alpha);
        let beta_n = mod_n_square.exp(&beta, params.n());
        let u2 = mod_n_square.mul(&gamma_alpha, &beta_n);

        // u3 = h1^alpha * h2^gamma mod Ntilde
        let h1_alpha = mod_n_tilde.exp(params.h1(), &alpha);
        let h2_gamma = mod_n_tilde.exp(params.h2(), &gamma);
        let u3 = mod_n_tilde.mul(&h1_alpha, &h2_gamma);

        Ok((
            SigmaCommitments { z, u1, u2, u3 },
            EncDlogNonces { alpha, beta, rho, gamma },
        ))
    }

    fn challenge(
        &self,
        params: &PublicParameters,
        statement: &Self::Statement,
        commitments: &SigmaCommitments,
    ) -> Result<BigInt, ProofError> {
        let (px, py) = statement
            .point
            .coords()
            .ok_or_else(|| ProofError::Malformed("statement point is the identity".to_string()))?;
        let (u1x, u1y) = commitments
            .u1
            .coords()
            .ok_or_else(|| ProofError::Malformed("u1 is the identity".to_string()))?;

        // e = H(Gamma, point, w, z, u1, u2, u3) as a raw integer
        sha512_256i(&[
            &params.paillier().gamma(),
            &px,
            &py,
            &statement.cipher,
            &commitments.z,
            &u1x,
            &u1y,
            &commitments.u2,
            &commitments.u3,
        ])
        .ok_or_else(|| ProofError::Internal("challenge hash over an empty transcript".to_string()))
    }

    fn respond(
        &self,
        params: &PublicParameters,
        witness: &Self::Witness,
        nonces: Self::Nonces,
        e: &BigInt,
    ) -> SigmaResponses {
        let mod_n = ModInt::new(params.n().clone());

        // s1 = e*eta + alpha
        let s1 = e * &witness.eta + &nonces.alpha;
        // s2 = r^e * beta mod N
        let r_e = mod_n.exp(&witness.rand, e);
        let s2 = mod_n.mul(&r_e, &nonces.beta);
        // s3 = e*rho + gamma
        let s3 = e * &nonces.rho + &nonces.gamma;

        SigmaResponses { s1, s2, s3 }
    }

    fn check(
        &self,
        params: &PublicParameters,
        statement: &Self::Statement,
        transcript: &SigmaTranscript,
    ) -> bool {
        let proof = EncDlogProof::from(transcript.clone());
        !statement.point.is_identity()
            && proof.well_formed(params, &statement.cipher)
            && proof.check_u1(&statement.point)
            && proof.check_u2(params, &statement.cipher)
            && proof.check_u3(params)
            && proof.check_e(params, &statement.cipher)
    }
}

/// The transmitted 8-tuple (z, u1, u2, u3, e, s1, s2, s3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncDlogProof {
    pub z: BigInt,
    pub u1: EcPoint,
    pub u2: BigInt,
    pub u3: BigInt,
    pub e: BigInt,
    pub s1: BigInt,
    pub s2: BigInt,
    pub s3: BigInt,
}

impl EncDlogProof {
    /// Proves that `w` encrypts (under `params`' Paillier key, with
    /// randomness `r`) the discrete logarithm `eta` of `eta * base`.
    /// The witnesses do not survive this call.
    pub fn new<R: CryptoRng + RngCore>(
        params: &PublicParameters,
        base: &EcPoint,
        eta: &BigInt,
        r: &BigInt,
        w: &BigInt,
        rng: &mut R,
    ) -> Result<Self, ProofError> {
        if base.is_identity() {
            return Err(ProofError::Malformed("base point is the identity".to_string()));
        }
        if !is_in_interval(w, &params.paillier().n_square()) {
            return Err(ProofError::Malformed("ciphertext out of range".to_string()));
        }

        let statement = EncDlogStatement { point: base.clone(), cipher: w.clone() };
        let witness = EncDlogWitness { eta: eta.clone(), rand: r.clone() };
        let transcript = sigma::prove(&EncDlogPredicate, params, &statement, &witness, rng)?;
        Ok(transcript.into())
    }

    /// Checks the proof against the prover's public point `y` and ciphertext
    /// `w`. The four checks run as a fork-join of scoped tasks with results
    /// collected into call-local state; all tasks are joined before this
    /// returns, whichever check fails first.
    pub fn verify(&self, params: &PublicParameters, y: &EcPoint, w: &BigInt) -> bool {
        self.verify_with_cancel(params, y, w, &AtomicBool::new(false))
    }

    /// Like `verify`, but consults `cancel` between checks so a session layer
    /// can abandon the call; an abandoned call reports failure after joining
    /// its remaining work.
    pub fn verify_with_cancel(
        &self,
        params: &PublicParameters,
        y: &EcPoint,
        w: &BigInt,
        cancel: &AtomicBool,
    ) -> bool {
        if y.is_identity() {
            error!("enc-dlog verify: target point is the identity");
            return false;
        }
        if !self.well_formed(params, w) {
            error!("enc-dlog verify: malformed proof rejected before arithmetic");
            return false;
        }

        let abort = AtomicBool::new(false);
        let stopped = || abort.load(Ordering::Relaxed) || cancel.load(Ordering::Relaxed);
        let stopped = &stopped;
        let (tx, rx) = mpsc::channel::<(&'static str, Option<bool>)>();
        let mut rejected = false;
        let mut skipped = false;

        thread::scope(|s| {
            {
                let tx = tx.clone();
                s.spawn(move || {
                    let outcome = if stopped() { None } else { Some(self.check_u1(y)) };
                    let _ = tx.send(("u1", outcome));
                });
            }
            {
                let tx = tx.clone();
                s.spawn(move || {
                    let outcome = if stopped() { None } else { Some(self.check_u2(params, w)) };
                    let _ = tx.send(("u2", outcome));
                });
            }
            {
                let tx = tx.clone();
                s.spawn(move || {
                    let outcome = if stopped() { None } else { Some(self.check_u3(params)) };
                    let _ = tx.send(("u3", outcome));
                });
            }
            s.spawn(move || {
                let outcome = if stopped() { None } else { Some(self.check_e(params, w)) };
                let _ = tx.send(("e", outcome));
            });

            // One result slot per check, local to this call.
            for (name, outcome) in rx.iter() {
                match outcome {
                    Some(true) => debug!("enc-dlog verify: {} check passed", name),
                    Some(false) => {
                        error!("enc-dlog verify: {} check failed", name);
                        rejected = true;
                        abort.store(true, Ordering::Relaxed);
                    }
                    None => skipped = true,
                }
            }
        });

        if skipped && !rejected {
            warn!("enc-dlog verify: call abandoned before all checks completed");
        }
        !rejected && !skipped
    }

    /// u1 =? s1*G - e*Y
    fn check_u1(&self, y: &EcPoint) -> bool {
        let minus_e = (-&self.e).mod_floor(curve::order());
        let expected = EcPoint::scalar_base_mult(&self.s1).add(&y.scalar_mul(&minus_e));
        expected == self.u1
    }

    /// u2 =? Gamma^s1 * s2^N * w^(-e) mod N^2
    fn check_u2(&self, params: &PublicParameters, w: &BigInt) -> bool {
        let mod_n_square = ModInt::new(params.paillier().n_square());
        let gamma_s1 = mod_n_square.exp(&params.paillier().gamma(), &self.s1);
        let s2_n = mod_n_square.exp(&self.s2, params.n());
        let w_neg_e = match mod_n_square.exp_signed(w, &-&self.e) {
            Some(v) => v,
            None => return false,
        };
        mod_n_square.mul(&mod_n_square.mul(&gamma_s1, &s2_n), &w_neg_e) == self.u2
    }

    /// u3 =? h1^s1 * h2^s3 * z^(-e) mod Ntilde
    fn check_u3(&self, params: &PublicParameters) -> bool {
        let mod_n_tilde = ModInt::new(params.n_tilde().clone());
        let h1_s1 = mod_n_tilde.exp(params.h1(), &self.s1);
        let h2_s3 = mod_n_tilde.exp(params.h2(), &self.s3);
        let z_neg_e = match mod_n_tilde.exp_signed(&self.z, &-&self.e) {
            Some(v) => v,
            None => return false,
        };
        mod_n_tilde.mul(&mod_n_tilde.mul(&h1_s1, &h2_s3), &z_neg_e) == self.u3
    }

    /// e =? H(Gamma, G, w, z, u1, u2, u3) over the proof's own commitments.
    fn check_e(&self, params: &PublicParameters, w: &BigInt) -> bool {
        let (gx, gy) = match EcPoint::generator().coords() {
            Some(c) => c,
            None => return false,
        };
        let (u1x, u1y) = match self.u1.coords() {
            Some(c) => c,
            None => return false,
        };
        match sha512_256i(&[
            &params.paillier().gamma(),
            &gx,
            &gy,
            w,
            &self.z,
            &u1x,
            &u1y,
            &self.u2,
            &self.u3,
        ]) {
            Some(digest) => digest == self.e,
            None => false,
        }
    }

    /// Malformed-input rejection, before any modular arithmetic runs.
    fn well_formed(&self, params: &PublicParameters, w: &BigInt) -> bool {
        let n_square = params.paillier().n_square();
        self.validate_basic()
            && is_in_interval(&self.z, params.n_tilde())
            && is_in_interval(&self.u3, params.n_tilde())
            && is_in_interval(&self.u2, &n_square)
            && is_in_interval(&self.s2, params.n())
            && is_in_interval(w, &n_square)
    }

    /// Structural sanity of the tuple itself.
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
            .ok_or_else(|| ProofError::Malformed("u1 is the identity".to_string()))?;
        let parts = vec![&self.z, &u1x, &u1y, &self.u2, &self.u3, &self.e, &self.s1, &self.s2, &self.s3];
        Ok(bigints_to_bytes(&parts))
    }

    pub fn from_bytes(bzs: &[Vec<u8>]) -> Result<Self, ProofError> {
        if bzs.len() != ENC_DLOG_PROOF_BYTES_PARTS {
            return Err(ProofError::ByteConversion {
                expected: ENC_DLOG_PROOF_BYTES_PARTS,
                got: bzs.len(),
            });
        }
        let ints = multi_bytes_to_bigints(bzs);
        let u1 = EcPoint::from_coords(&ints[1], &ints[2])
            .map_err(|e| ProofError::Malformed(format!("u1: {}", e)))?;
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

impl From<SigmaTranscript> for EncDlogProof {
    fn from(t: SigmaTranscript) -> Self {
        Self { z: t.z, u1: t.u1, u2: t.u2, u3: t.u3, e: t.e, s1: t.s1, s2: t.s2, s3: t.s3 }
    }
}

impl From<EncDlogProof> for SigmaTranscript {
    fn from(p: EncDlogProof) -> Self {
        Self { z: p.z, u1: p.u1, u2: p.u2, u3: p.u3, e: p.e, s1: p.s1, s2: p.s2, s3: p.s3 }
    }
}
