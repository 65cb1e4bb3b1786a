//! The local party's round state: the authoritative record of everything
//! this party has generated during one session.
//!
//! Each phase is produced in one step by its round method and is immutable
//! afterwards; there are no public setters. The commit-then-reveal ordering
//! is enforced by the accessors: a phase's reveal payload cannot be obtained
//! until its commitment payload has been taken for transmission, and a round
//! cannot start until the previous round's verified output exists. A state is
//! bound to one session; every round draws fresh randomness.

use crate::common::random::get_random_positive_int;
use crate::crypto::commitments::{self, Commitment, Open};
use crate::crypto::curve::{self, EcPoint};
use crate::crypto::zkp::{EncDlogProof, ProofError, SigmaTranscript};
use crate::protocol::error::SessionError;
use crate::protocol::params::PublicParameters;
use crate::protocol::peer::PeerContribution;

use log::info;
use num_bigint::BigInt;
use num_traits::Zero;
use rand::{CryptoRng, RngCore};

/// Key-generation record: the secret share, its encryption and public point,
/// with the binding commitment and consistency proof.
pub struct KeyGenPhase {
    x_share: BigInt,
    #[allow(dead_code)] // witness of the encryption, retained with the share
    x_share_rnd: BigInt,
    enc_x_share: BigInt,
    y_share: EcPoint,
    commitment: Commitment,
    open: Open,
    proof: EncDlogProof,
    commitment_sent: bool,
}

impl KeyGenPhase {
    pub fn enc_x_share(&self) -> &BigInt {
        &self.enc_x_share
    }

    pub fn y_share(&self) -> &EcPoint {
        &self.y_share
    }
}

/// The session-wide result of key generation: the ciphertext of the combined
/// secret and the shared public key.
#[derive(Clone, Debug)]
pub struct KeyGenOutput {
    enc_x: BigInt,
    pk: EcPoint,
}

impl KeyGenOutput {
    pub fn enc_x(&self) -> &BigInt {
        &self.enc_x
    }

    pub fn public_key(&self) -> &EcPoint {
        &self.pk
    }
}

/// Round-1 public values, as seen by every verifier after the reveal.
#[derive(Clone, Debug)]
pub struct Round1Public {
    pub c_i: BigInt,
    pub u_i: BigInt,
    pub v_i: BigInt,
    pub enc_x: BigInt,
}

/// Round-1 witnesses; handed to the configured relation prover, never
/// transmitted.
pub struct Round1Secrets {
    pub k_i: BigInt,
    pub c_i_rnd: BigInt,
    pub rho_i: BigInt,
    pub rho_i_rnd: BigInt,
}

pub struct Round1Phase {
    public: Round1Public,
    secrets: Round1Secrets,
    commitment: Commitment,
    open: Open,
    proof: SigmaTranscript,
    aux: Vec<BigInt>,
    commitment_sent: bool,
}

impl Round1Phase {
    pub fn public(&self) -> &Round1Public {
        &self.public
    }
}

/// Round-2 public values.
#[derive(Clone, Debug)]
pub struct Round2Public {
    pub c_i: BigInt,
    pub r_i: EcPoint,
    pub w_i: BigInt,
}

pub struct Round2Secrets {
    pub k_i: BigInt,
    pub c_i_rnd: BigInt,
    pub mask: BigInt,
}

pub struct Round2Phase {
    public: Round2Public,
    #[allow(dead_code)] // witnesses retained with the record
    secrets: Round2Secrets,
    commitment: Commitment,
    open: Open,
    proof: SigmaTranscript,
    aux: Vec<BigInt>,
    commitment_sent: bool,
}

impl Round2Phase {
    pub fn public(&self) -> &Round2Public {
        &self.public
    }
}

/// Reveal payload of the key-generation phase: the opening (which carries the
/// committed values) and the consistency proof.
pub struct KeyGenReveal {
    pub open: Open,
    pub proof: EncDlogProof,
}

pub struct Round1Reveal {
    pub c_i: BigInt,
    pub open: Open,
    pub proof: SigmaTranscript,
    pub aux: Vec<BigInt>,
}

pub struct Round2Reveal {
    pub open: Open,
    pub proof: SigmaTranscript,
    pub aux: Vec<BigInt>,
}

/// One party's progression through the session. Exclusively owned by the
/// local session logic; peer data lives in `PeerContribution`.
#[derive(Default)]
pub struct ProverRoundState {
    keygen: Option<KeyGenPhase>,
    keygen_output: Option<KeyGenOutput>,
    round1: Option<Round1Phase>,
    round2: Option<Round2Phase>,
}

impl ProverRoundState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples the secret share, encrypts it, commits to the pair
    /// (encrypted share, public point) and proves their consistency.
    pub fn run_keygen<R: CryptoRng + RngCore>(
        &mut self,
        params: &PublicParameters,
        rng: &mut R,
    ) -> Result<&KeyGenPhase, SessionError> {
        if self.keygen.is_some() {
            return Err(SessionError::OutOfOrder("key generation already ran"));
        }

        let x_share = sample_scalar(rng)?;
        let (enc_x_share, x_share_rnd) =
            params.paillier().encrypt_and_return_randomness(rng, &x_share)?;
        let y_share = EcPoint::scalar_base_mult(&x_share);
        let (yx, yy) = y_share
            .coords()
            .ok_or_else(|| SessionError::Internal("share point is the identity".to_string()))?;

        let (commitment, open) = commitments::commit(rng, &[&enc_x_share, &yx, &yy])?;
        let proof = EncDlogProof::new(
            params,
            &EcPoint::generator(),
            &x_share,
            &x_share_rnd,
            &enc_x_share,
            rng,
        )?;

        info!("key generation phase committed");
        Ok(&*self.keygen.insert(KeyGenPhase {
            x_share,
            x_share_rnd,
            enc_x_share,
            y_share,
            commitment,
            open,
            proof,
            commitment_sent: false,
        }))
    }

    /// Combines the local share with every verified peer contribution into
    /// the shared public key and the ciphertext of the combined secret.
    /// Refuses to combine while any required peer is unverified.
    pub fn finalize_keygen(
        &mut self,
        params: &PublicParameters,
        peers: &[&PeerContribution],
    ) -> Result<&KeyGenOutput, SessionError> {
        let kg = self
            .keygen
            .as_ref()
            .ok_or(SessionError::OutOfOrder("key generation has not run"))?;
        if self.keygen_output.is_some() {
            return Err(SessionError::OutOfOrder("key generation already finalized"));
        }

        let mut enc_x = kg.enc_x_share.clone();
        let mut pk = kg.y_share.clone();
        for peer in peers {
            let share = peer.keygen().ok_or(SessionError::PeerUnverified)?;
            enc_x = params.paillier().homo_add(&enc_x, &share.enc_x_share)?;
            pk = pk.add(&share.y_share);
        }
        if pk.is_identity() {
            return Err(SessionError::Internal("combined public key is the identity".to_string()));
        }

        info!("key generation finalized over {} peer contributions", peers.len());
        Ok(&*self.keygen_output.insert(KeyGenOutput { enc_x, pk }))
    }

    /// MtA setup: samples the ephemeral nonce and blinding share, encrypts
    /// them, commits to the blinding pair and attaches the round relation
    /// proof produced by `prove`.
    pub fn run_round1<R, F>(
        &mut self,
        params: &PublicParameters,
        rng: &mut R,
        prove: F,
    ) -> Result<&Round1Phase, SessionError>
    where
        R: CryptoRng + RngCore,
        F: FnOnce(&PublicParameters, &Round1Public, &Round1Secrets, &mut R) -> Result<(SigmaTranscript, Vec<BigInt>), ProofError>,
    {
        let enc_x = self
            .keygen_output
            .as_ref()
            .ok_or(SessionError::OutOfOrder("key generation is not finalized"))?
            .enc_x
            .clone();
        if self.round1.is_some() {
            return Err(SessionError::OutOfOrder("round 1 already ran"));
        }

        let k_i = sample_scalar(rng)?;
        let (c_i, c_i_rnd) = params.paillier().encrypt_and_return_randomness(rng, &k_i)?;
        let rho_i = sample_scalar(rng)?;
        let (u_i, rho_i_rnd) = params.paillier().encrypt_and_return_randomness(rng, &rho_i)?;
        // v_i = enc_x ^ rho_i: the multiplicative share of rho * x
        let v_i = params.paillier().homo_mult(&rho_i, &enc_x)?;

        let (commitment, open) = commitments::commit(rng, &[&u_i, &v_i])?;
        let public = Round1Public { c_i, u_i, v_i, enc_x };
        let secrets = Round1Secrets { k_i, c_i_rnd, rho_i, rho_i_rnd };
        let (proof, aux) = prove(params, &public, &secrets, rng)?;

        info!("round 1 committed");
        Ok(&*self.round1.insert(Round1Phase {
            public,
            secrets,
            commitment,
            open,
            proof,
            aux,
            commitment_sent: false,
        }))
    }

    /// Finalization: derives the round point, masks the combined MtA
    /// ciphertext with flooding noise, commits to (R_i, w_i) and attaches
    /// the round relation proof produced by `prove`.
    pub fn run_round2<R, F>(
        &mut self,
        params: &PublicParameters,
        rng: &mut R,
        u_combined: &BigInt,
        prove: F,
    ) -> Result<&Round2Phase, SessionError>
    where
        R: CryptoRng + RngCore,
        F: FnOnce(&PublicParameters, &Round2Public, &Round2Secrets, &mut R) -> Result<(SigmaTranscript, Vec<BigInt>), ProofError>,
    {
        let (k_i, c_i_rnd, c_i) = {
            let r1 = self
                .round1
                .as_ref()
                .ok_or(SessionError::OutOfOrder("round 1 has not run"))?;
            (
                r1.secrets.k_i.clone(),
                r1.secrets.c_i_rnd.clone(),
                r1.public.c_i.clone(),
            )
        };
        if self.round2.is_some() {
            return Err(SessionError::OutOfOrder("round 2 already ran"));
        }

        let q = curve::order();
        let r_i = EcPoint::scalar_base_mult(&k_i);
        let (rx, ry) = r_i
            .coords()
            .ok_or_else(|| SessionError::Internal("round point is the identity".to_string()))?;

        // mask <- Z_(q^5); w_i = u^k_i * Enc(q * mask) floods the share with
        // noise that vanishes modulo the group order.
        let q2 = q * q;
        let q5 = &(&q2 * &q2) * q;
        let mask = get_random_positive_int(rng, &q5)
            .ok_or_else(|| SessionError::Internal("failed to sample the flooding mask".to_string()))?;
        let masked = params.paillier().homo_mult(&k_i, u_combined)?;
        let noise = params.paillier().encrypt(rng, &(q * &mask))?;
        let w_i = params.paillier().homo_add(&masked, &noise)?;

        let (commitment, open) = commitments::commit(rng, &[&rx, &ry, &w_i])?;
        let public = Round2Public { c_i, r_i, w_i };
        let secrets = Round2Secrets { k_i, c_i_rnd, mask };
        let (proof, aux) = prove(params, &public, &secrets, rng)?;

        info!("round 2 committed");
        Ok(&*self.round2.insert(Round2Phase {
            public,
            secrets,
            commitment,
            open,
            proof,
            aux,
            commitment_sent: false,
        }))
    }

    /// The key-generation commitment payload; taking it marks it sent.
    pub fn keygen_commitment(&mut self) -> Result<Commitment, SessionError> {
        let kg = self
            .keygen
            .as_mut()
            .ok_or(SessionError::OutOfOrder("key generation has not run"))?;
        kg.commitment_sent = true;
        Ok(kg.commitment.clone())
    }

    /// The key-generation reveal payload. Unavailable until the commitment
    /// payload has been taken for transmission.
    pub fn keygen_reveal(&self) -> Result<KeyGenReveal, SessionError> {
        let kg = self
            .keygen
            .as_ref()
            .ok_or(SessionError::OutOfOrder("key generation has not run"))?;
        if !kg.commitment_sent {
            return Err(SessionError::OutOfOrder("key generation commitment has not been sent"));
        }
        Ok(KeyGenReveal { open: kg.open.clone(), proof: kg.proof.clone() })
    }

    pub fn round1_commitment(&mut self) -> Result<Commitment, SessionError> {
        let r1 = self
            .round1
            .as_mut()
            .ok_or(SessionError::OutOfOrder("round 1 has not run"))?;
        r1.commitment_sent = true;
        Ok(r1.commitment.clone())
    }

    pub fn round1_reveal(&self) -> Result<Round1Reveal, SessionError> {
        let r1 = self
            .round1
            .as_ref()
            .ok_or(SessionError::OutOfOrder("round 1 has not run"))?;
        if !r1.commitment_sent {
            return Err(SessionError::OutOfOrder("round 1 commitment has not been sent"));
        }
        Ok(Round1Reveal {
            c_i: r1.public.c_i.clone(),
            open: r1.open.clone(),
            proof: r1.proof.clone(),
            aux: r1.aux.clone(),
        })
    }

    pub fn round2_commitment(&mut self) -> Result<Commitment, SessionError> {
        let r2 = self
            .round2
            .as_mut()
            .ok_or(SessionError::OutOfOrder("round 2 has not run"))?;
        r2.commitment_sent = true;
        Ok(r2.commitment.clone())
    }

    pub fn round2_reveal(&self) -> Result<Round2Reveal, SessionError> {
        let r2 = self
            .round2
            .as_ref()
            .ok_or(SessionError::OutOfOrder("round 2 has not run"))?;
        if !r2.commitment_sent {
            return Err(SessionError::OutOfOrder("round 2 commitment has not been sent"));
        }
        Ok(Round2Reveal {
            open: r2.open.clone(),
            proof: r2.proof.clone(),
            aux: r2.aux.clone(),
        })
    }

    pub fn keygen_phase(&self) -> Option<&KeyGenPhase> {
        self.keygen.as_ref()
    }

    pub fn keygen_output(&self) -> Option<&KeyGenOutput> {
        self.keygen_output.as_ref()
    }

    pub fn round1_phase(&self) -> Option<&Round1Phase> {
        self.round1.as_ref()
    }

    pub fn round2_phase(&self) -> Option<&Round2Phase> {
        self.round2.as_ref()
    }

    /// The local secret share, handed to the session layer at session end.
    pub fn secret_share(&self) -> Option<&BigInt> {
        self.keygen.as_ref().map(|kg| &kg.x_share)
    }

    /// The shared public key, once key generation is finalized.
    pub fn public_key(&self) -> Option<&EcPoint> {
        self.keygen_output.as_ref().map(|out| &out.pk)
    }
}

fn sample_scalar<R: CryptoRng + RngCore>(rng: &mut R) -> Result<BigInt, SessionError> {
    loop {
        let x = get_random_positive_int(rng, curve::order())
            .ok_or_else(|| SessionError::Internal("failed to sample a group scalar".to_string()))?;
        if !x.is_zero() {
            return Ok(x);
        }
    }
}
