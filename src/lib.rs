//! Cryptographic core of a threshold-ECDSA distributed key generation and
//! pre-signing protocol.
//!
//! The crate combines Paillier homomorphic encryption, secp256k1 arithmetic,
//! a commit-then-reveal scheme and non-interactive Sigma proofs (Fiat-Shamir)
//! into a per-party multi-round state machine. Transport, persistence and
//! chain synchronisation live outside this crate; `protocol::transport`
//! defines the boundary this core expects from them.

pub mod common;
pub mod crypto;
pub mod protocol;

#[cfg(test)]
pub(crate) mod testutil;
