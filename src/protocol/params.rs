use crate::common::{int::ModInt, random::get_random_positive_relatively_prime_int};
use crate::crypto::{curve, paillier};

use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("invalid public parameter: {0}")]
    Invalid(String),
}

/// Shared constants of one protocol session: the Paillier public modulus and
/// the auxiliary modulus with its two generators, used only inside proofs.
/// Immutable after construction; share by reference across threads freely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicParameters {
    paillier: paillier::PublicKey,
    n_tilde: BigInt,
    h1: BigInt,
    h2: BigInt,
}

impl PublicParameters {
    pub fn new(
        paillier: paillier::PublicKey,
        n_tilde: BigInt,
        h1: BigInt,
        h2: BigInt,
    ) -> Result<Self, ParamsError> {
        if paillier.n.sign() != Sign::Plus || paillier.n.is_one() {
            return Err(ParamsError::Invalid("paillier modulus must be greater than one".to_string()));
        }
        if n_tilde.sign() != Sign::Plus || n_tilde.is_one() {
            return Err(ParamsError::Invalid("auxiliary modulus must be greater than one".to_string()));
        }
        for (name, h) in [("h1", &h1), ("h2", &h2)] {
            if h.sign() != Sign::Plus || h >= &n_tilde {
                return Err(ParamsError::Invalid(format!("{} out of range", name)));
            }
            if !h.gcd(&n_tilde).is_one() {
                return Err(ParamsError::Invalid(format!("{} is not a unit mod the auxiliary modulus", name)));
            }
        }
        if h1 == h2 {
            return Err(ParamsError::Invalid("h1 and h2 must differ".to_string()));
        }
        Ok(Self { paillier, n_tilde, h1, h2 })
    }

    /// Derives fresh auxiliary parameters for the given Paillier key: an
    /// RSA-like modulus of `aux_bits` bits, a random quadratic residue `h1`
    /// and `h2` in the subgroup generated by it.
    pub fn generate<R: CryptoRng + RngCore>(
        rng: &mut R,
        paillier: paillier::PublicKey,
        aux_bits: u64,
    ) -> Result<Self, ParamsError> {
        let prime_bits = aux_bits / 2;
        if prime_bits < 8 {
            return Err(ParamsError::Invalid("auxiliary modulus too small".to_string()));
        }

        let p = BigInt::from(paillier::random_prime(rng, prime_bits));
        let q = loop {
            let candidate = BigInt::from(paillier::random_prime(rng, prime_bits));
            if candidate != p {
                break candidate;
            }
        };
        let n_tilde = &p * &q;
        let mod_n_tilde = ModInt::new(n_tilde.clone());

        let f = get_random_positive_relatively_prime_int(rng, &n_tilde)
            .ok_or_else(|| ParamsError::Invalid("auxiliary modulus admits no units".to_string()))?;
        let h1 = mod_n_tilde.mul(&f, &f);
        let h2 = loop {
            let alpha = get_random_positive_relatively_prime_int(rng, &n_tilde)
                .ok_or_else(|| ParamsError::Invalid("auxiliary modulus admits no units".to_string()))?;
            let candidate = mod_n_tilde.exp(&h1, &alpha);
            if candidate != h1 {
                break candidate;
            }
        };

        Self::new(paillier, n_tilde, h1, h2)
    }

    pub fn paillier(&self) -> &paillier::PublicKey {
        &self.paillier
    }

    /// The Paillier public modulus N.
    pub fn n(&self) -> &BigInt {
        &self.paillier.n
    }

    pub fn n_tilde(&self) -> &BigInt {
        &self.n_tilde
    }

    pub fn h1(&self) -> &BigInt {
        &self.h1
    }

    pub fn h2(&self) -> &BigInt {
        &self.h2
    }

    /// Order of the session's curve group.
    pub fn curve_order(&self) -> &BigInt {
        curve::order()
    }
}
