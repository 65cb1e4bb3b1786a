use crate::crypto::commitments::CommitmentError;
use crate::crypto::paillier::PaillierError;
use crate::crypto::zkp::ProofError;

use thiserror::Error;

/// Failures attributable to a single peer's contribution. These are
/// recoverable for the local party: processing of other peers continues and
/// the surrounding session layer decides whether to retry, exclude or abort.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContributionError {
    #[error("peer proof rejected")]
    InvalidProof,
    #[error("peer opening does not match its commitment")]
    InvalidOpening,
    #[error("malformed contribution: {0}")]
    Malformed(String),
}

/// Failures of the local session itself. These are fatal to the session:
/// they indicate misuse of the round state machine or a broken environment,
/// not a misbehaving peer.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("phase out of order: {0}")]
    OutOfOrder(&'static str),
    #[error("peer contribution is not verified")]
    PeerUnverified,
    #[error("internal invariant violated: {0}")]
    Internal(String),
    #[error(transparent)]
    Paillier(#[from] PaillierError),
    #[error(transparent)]
    Proof(#[from] ProofError),
    #[error(transparent)]
    Commitment(#[from] CommitmentError),
}
