//! Verification-side state for one remote party.
//!
//! Each phase advances `AwaitingCommitment -> Committed -> Verified` or ends
//! in `Rejected`. The ordering is enforced, not conventional: an opening that
//! arrives before its commitment fails closed as malformed, and any opening
//! or proof failure is terminal for that peer's contribution.

use crate::common::int::is_in_interval;
use crate::crypto::commitments::Commitment;
use crate::crypto::curve::EcPoint;
use crate::crypto::zkp::SigmaTranscript;
use crate::protocol::error::ContributionError;
use crate::protocol::params::PublicParameters;
use crate::protocol::prover::{KeyGenReveal, Round1Reveal, Round2Reveal};
use crate::protocol::Phase;

use log::error;
use num_bigint::BigInt;

/// Observable progress of one phase of a peer's contribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContributionState {
    AwaitingCommitment,
    Committed,
    Verified,
    Rejected,
}

enum Slot<T> {
    Awaiting,
    Committed(Commitment),
    Verified(T),
    Rejected,
}

impl<T> Slot<T> {
    fn state(&self) -> ContributionState {
        match self {
            Slot::Awaiting => ContributionState::AwaitingCommitment,
            Slot::Committed(_) => ContributionState::Committed,
            Slot::Verified(_) => ContributionState::Verified,
            Slot::Rejected => ContributionState::Rejected,
        }
    }

    fn accept_commitment(&mut self, commitment: Commitment) -> Result<(), ContributionError> {
        match self {
            Slot::Awaiting => {
                *self = Slot::Committed(commitment);
                Ok(())
            }
            _ => Err(ContributionError::Malformed("commitment already received for this phase".to_string())),
        }
    }

    /// Takes the stored commitment for reveal processing; the slot stays
    /// `Rejected` unless the caller promotes it to `Verified`.
    fn begin_reveal(&mut self) -> Result<Commitment, ContributionError> {
        match std::mem::replace(self, Slot::Rejected) {
            Slot::Committed(commitment) => Ok(commitment),
            Slot::Awaiting => {
                *self = Slot::Awaiting;
                Err(ContributionError::Malformed("reveal received before commitment".to_string()))
            }
            Slot::Verified(value) => {
                *self = Slot::Verified(value);
                Err(ContributionError::Malformed("duplicate reveal".to_string()))
            }
            Slot::Rejected => Err(ContributionError::Malformed("contribution already rejected".to_string())),
        }
    }

    fn verified(&self) -> Option<&T> {
        match self {
            Slot::Verified(value) => Some(value),
            _ => None,
        }
    }
}

/// A peer's accepted key-generation values: public only, never the witness.
#[derive(Clone, Debug)]
pub struct KeyGenContribution {
    pub enc_x_share: BigInt,
    pub y_share: EcPoint,
}

impl KeyGenContribution {
    pub fn y_share(&self) -> &EcPoint {
        &self.y_share
    }
}

#[derive(Clone, Debug)]
pub struct Round1Contribution {
    pub c_i: BigInt,
    pub u_i: BigInt,
    pub v_i: BigInt,
    pub aux: Vec<BigInt>,
}

#[derive(Clone, Debug)]
pub struct Round2Contribution {
    pub r_i: EcPoint,
    pub w_i: BigInt,
    pub aux: Vec<BigInt>,
}

/// Everything the local party has accepted from one peer. Data is immutable
/// once verified; it is only ever read afterwards.
pub struct PeerContribution {
    keygen: Slot<KeyGenContribution>,
    round1: Slot<Round1Contribution>,
    round2: Slot<Round2Contribution>,
}

impl Default for PeerContribution {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerContribution {
    pub fn new() -> Self {
        Self {
            keygen: Slot::Awaiting,
            round1: Slot::Awaiting,
            round2: Slot::Awaiting,
        }
    }

    pub fn state(&self, phase: Phase) -> ContributionState {
        match phase {
            Phase::KeyGen => self.keygen.state(),
            Phase::Round1 => self.round1.state(),
            Phase::Round2 => self.round2.state(),
        }
    }

    pub fn receive_commitment(&mut self, phase: Phase, commitment: Commitment) -> Result<(), ContributionError> {
        match phase {
            Phase::KeyGen => self.keygen.accept_commitment(commitment),
            Phase::Round1 => self.round1.accept_commitment(commitment),
            Phase::Round2 => self.round2.accept_commitment(commitment),
        }
    }

    /// Checks a peer's key-generation reveal: opening against the stored
    /// commitment, then the consistency proof against the revealed values.
    pub fn receive_keygen_reveal(
        &mut self,
        params: &PublicParameters,
        reveal: KeyGenReveal,
    ) -> Result<(), ContributionError> {
        let commitment = self.keygen.begin_reveal()?;
        let KeyGenReveal { open, proof } = reveal;

        if !commitment.verify(&open) {
            error!("peer key-generation opening rejected");
            return Err(ContributionError::InvalidOpening);
        }
        let values = open.values();
        if values.len() != 3 {
            return Err(ContributionError::Malformed(
                "key-generation opening must carry the encrypted share and a point".to_string(),
            ));
        }
        let enc_x_share = values[0].clone();
        if !is_in_interval(&enc_x_share, &params.paillier().n_square()) {
            return Err(ContributionError::Malformed("encrypted share out of range".to_string()));
        }
        let y_share = EcPoint::from_coords(&values[1], &values[2])
            .map_err(|e| ContributionError::Malformed(format!("share point: {}", e)))?;

        if !proof.verify(params, &y_share, &enc_x_share) {
            error!("peer key-generation proof rejected");
            return Err(ContributionError::InvalidProof);
        }

        self.keygen = Slot::Verified(KeyGenContribution { enc_x_share, y_share });
        Ok(())
    }

    /// Checks a peer's round-1 reveal. The proof is judged by the
    /// session-configured relation `verify`.
    pub fn receive_round1_reveal<F>(
        &mut self,
        params: &PublicParameters,
        reveal: Round1Reveal,
        verify: F,
    ) -> Result<(), ContributionError>
    where
        F: FnOnce(&PublicParameters, &Round1Contribution, &SigmaTranscript) -> bool,
    {
        let commitment = self.round1.begin_reveal()?;
        let Round1Reveal { c_i, open, proof, aux } = reveal;

        if !commitment.verify(&open) {
            error!("peer round-1 opening rejected");
            return Err(ContributionError::InvalidOpening);
        }
        let values = open.values();
        if values.len() != 2 {
            return Err(ContributionError::Malformed(
                "round-1 opening must carry the two blinding ciphertexts".to_string(),
            ));
        }
        let n_square = params.paillier().n_square();
        let u_i = values[0].clone();
        let v_i = values[1].clone();
        for (name, c) in [("c_i", &c_i), ("u_i", &u_i), ("v_i", &v_i)] {
            if !is_in_interval(c, &n_square) {
                return Err(ContributionError::Malformed(format!("{} out of range", name)));
            }
        }

        let contribution = Round1Contribution { c_i, u_i, v_i, aux };
        if !verify(params, &contribution, &proof) {
            error!("peer round-1 proof rejected");
            return Err(ContributionError::InvalidProof);
        }

        self.round1 = Slot::Verified(contribution);
        Ok(())
    }

    /// Checks a peer's round-2 reveal, analogously to round 1.
    pub fn receive_round2_reveal<F>(
        &mut self,
        params: &PublicParameters,
        reveal: Round2Reveal,
        verify: F,
    ) -> Result<(), ContributionError>
    where
        F: FnOnce(&PublicParameters, &Round2Contribution, &SigmaTranscript) -> bool,
    {
        let commitment = self.round2.begin_reveal()?;
        let Round2Reveal { open, proof, aux } = reveal;

        if !commitment.verify(&open) {
            error!("peer round-2 opening rejected");
            return Err(ContributionError::InvalidOpening);
        }
        let values = open.values();
        if values.len() != 3 {
            return Err(ContributionError::Malformed(
                "round-2 opening must carry a point and the masked share".to_string(),
            ));
        }
        let r_i = EcPoint::from_coords(&values[0], &values[1])
            .map_err(|e| ContributionError::Malformed(format!("round point: {}", e)))?;
        let w_i = values[2].clone();
        if !is_in_interval(&w_i, &params.paillier().n_square()) {
            return Err(ContributionError::Malformed("masked share out of range".to_string()));
        }

        let contribution = Round2Contribution { r_i, w_i, aux };
        if !verify(params, &contribution, &proof) {
            error!("peer round-2 proof rejected");
            return Err(ContributionError::InvalidProof);
        }

        self.round2 = Slot::Verified(contribution);
        Ok(())
    }

    /// The peer's key-generation values, available once verified.
    pub fn keygen(&self) -> Option<&KeyGenContribution> {
        self.keygen.verified()
    }

    pub fn round1(&self) -> Option<&Round1Contribution> {
        self.round1.verified()
    }

    pub fn round2(&self) -> Option<&Round2Contribution> {
        self.round2.verified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::prover::ProverRoundState;
    use crate::testutil;
    use num_bigint::BigInt;
    use rand::thread_rng;

    fn keygen_prover(params: &PublicParameters) -> ProverRoundState {
        let mut rng = thread_rng();
        let mut prover = ProverRoundState::new();
        prover.run_keygen(params, &mut rng).unwrap();
        prover
    }

    #[test]
    fn test_commit_then_reveal_accepted() {
        let mut rng = thread_rng();
        let params = testutil::small_params(&mut rng);
        let mut prover = keygen_prover(&params);

        let mut peer = PeerContribution::new();
        assert_eq!(peer.state(Phase::KeyGen), ContributionState::AwaitingCommitment);

        peer.receive_commitment(Phase::KeyGen, prover.keygen_commitment().unwrap()).unwrap();
        assert_eq!(peer.state(Phase::KeyGen), ContributionState::Committed);

        peer.receive_keygen_reveal(&params, prover.keygen_reveal().unwrap()).unwrap();
        assert_eq!(peer.state(Phase::KeyGen), ContributionState::Verified);
        assert!(peer.keygen().is_some());
    }

    #[test]
    fn test_reveal_before_commitment_fails_closed() {
        let mut rng = thread_rng();
        let params = testutil::small_params(&mut rng);
        let mut prover = keygen_prover(&params);
        let _ = prover.keygen_commitment().unwrap();

        let mut peer = PeerContribution::new();
        let err = peer
            .receive_keygen_reveal(&params, prover.keygen_reveal().unwrap())
            .unwrap_err();
        assert!(matches!(err, ContributionError::Malformed(_)));
        // No state was consumed; the commitment can still arrive.
        assert_eq!(peer.state(Phase::KeyGen), ContributionState::AwaitingCommitment);
    }

    #[test]
    fn test_duplicate_commitment_rejected() {
        let mut rng = thread_rng();
        let params = testutil::small_params(&mut rng);
        let mut prover = keygen_prover(&params);
        let commitment = prover.keygen_commitment().unwrap();

        let mut peer = PeerContribution::new();
        peer.receive_commitment(Phase::KeyGen, commitment.clone()).unwrap();
        assert!(peer.receive_commitment(Phase::KeyGen, commitment).is_err());
    }

    #[test]
    fn test_bad_opening_is_terminal() {
        let mut rng = thread_rng();
        let params = testutil::small_params(&mut rng);
        let mut alice = keygen_prover(&params);
        let mut mallory = keygen_prover(&params);

        let mut peer = PeerContribution::new();
        peer.receive_commitment(Phase::KeyGen, alice.keygen_commitment().unwrap()).unwrap();

        // An opening for a different tuple never verifies against the stored
        // commitment.
        let _ = mallory.keygen_commitment().unwrap();
        let err = peer
            .receive_keygen_reveal(&params, mallory.keygen_reveal().unwrap())
            .unwrap_err();
        assert_eq!(err, ContributionError::InvalidOpening);
        assert_eq!(peer.state(Phase::KeyGen), ContributionState::Rejected);

        // The genuine reveal no longer helps; rejection is terminal.
        let err = peer
            .receive_keygen_reveal(&params, alice.keygen_reveal().unwrap())
            .unwrap_err();
        assert!(matches!(err, ContributionError::Malformed(_)));
    }

    #[test]
    fn test_bad_proof_rejected() {
        let mut rng = thread_rng();
        let params = testutil::small_params(&mut rng);
        let mut prover = keygen_prover(&params);

        let mut peer = PeerContribution::new();
        peer.receive_commitment(Phase::KeyGen, prover.keygen_commitment().unwrap()).unwrap();

        let mut reveal = prover.keygen_reveal().unwrap();
        reveal.proof.s1 += BigInt::from(1u64);
        let err = peer.receive_keygen_reveal(&params, reveal).unwrap_err();
        assert_eq!(err, ContributionError::InvalidProof);
        assert_eq!(peer.state(Phase::KeyGen), ContributionState::Rejected);
        assert!(peer.keygen().is_none());
    }
}
