pub mod enc_dlog;
pub mod sigma;

pub use enc_dlog::{EncDlogPredicate, EncDlogProof, EncDlogStatement, EncDlogWitness};
pub use sigma::{SigmaPredicate, SigmaTranscript};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("malformed proof input: {0}")]
    Malformed(String),
    #[error("byte conversion error: expected {expected} parts, got {got}")]
    ByteConversion { expected: usize, got: usize },
    #[error("internal error: {0}")]
    Internal(String),
}
