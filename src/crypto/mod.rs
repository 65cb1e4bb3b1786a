pub mod commitments;
pub mod curve;
pub mod paillier;
pub mod zkp;
