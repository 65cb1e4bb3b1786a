// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use crate::common::{
    int::ModInt,
    random::get_random_positive_relatively_prime_int,
};

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_prime::nt_funcs;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const RECOMMENDED_MODULUS_BIT_LEN: u64 = 2048;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaillierError {
    #[error("message is too large or < 0")]
    MessageTooLong,
    #[error("message is malformed (gcd(c, N^2) != 1)")]
    MessageMalformed,
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
    #[error("internal crypto error: {0}")]
    Internal(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub n: BigInt, // Paillier modulus n = p * q
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKey {
    pub public_key: PublicKey,
    lambda_n: BigInt, // Carmichael function lambda(n) = lcm(p-1, q-1)
    phi_n: BigInt,    // Euler totient phi(n) = (p-1)(q-1)
}

/// Generates a Paillier key pair with a modulus of roughly `modulus_bit_len` bits.
pub fn generate_key_pair<R: CryptoRng + RngCore>(
    rng: &mut R,
    modulus_bit_len: u64,
) -> Result<(PrivateKey, PublicKey), PaillierError> {
    if modulus_bit_len < RECOMMENDED_MODULUS_BIT_LEN {
        log::warn!(
            "paillier modulus of {} bits is below the recommended {} bits",
            modulus_bit_len,
            RECOMMENDED_MODULUS_BIT_LEN
        );
    }
    let prime_bits = modulus_bit_len / 2;
    if prime_bits < 8 {
        return Err(PaillierError::KeyGeneration("modulus too small".to_string()));
    }

    loop {
        let p = BigInt::from(random_prime(rng, prime_bits));
        let q = BigInt::from(random_prime(rng, prime_bits));
        if p == q {
            continue;
        }
        let private_key = PrivateKey::from_primes(&p, &q)?;
        let public_key = private_key.public_key.clone();
        return Ok((private_key, public_key));
    }
}

/// Samples a random probable prime of exactly `bits` bits.
pub(crate) fn random_prime<R: CryptoRng + RngCore>(rng: &mut R, bits: u64) -> BigUint {
    loop {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if nt_funcs::is_prime(&candidate, None).probably() {
            return candidate;
        }
    }
}

impl PublicKey {
    /// Encrypts `m` and returns the ciphertext together with the randomness
    /// used, for callers that later prove statements about the encryption.
    pub fn encrypt_and_return_randomness<R: CryptoRng + RngCore>(
        &self,
        rng: &mut R,
        m: &BigInt,
    ) -> Result<(BigInt, BigInt), PaillierError> {
        let x = get_random_positive_relatively_prime_int(rng, &self.n)
            .ok_or_else(|| PaillierError::Internal("failed to sample encryption randomness".to_string()))?;
        let c = self.encrypt_with_randomness(m, &x)?;
        Ok((c, x))
    }

    /// Encrypts `m` with fresh randomness.
    pub fn encrypt<R: CryptoRng + RngCore>(
        &self,
        rng: &mut R,
        m: &BigInt,
    ) -> Result<BigInt, PaillierError> {
        self.encrypt_and_return_randomness(rng, m).map(|(c, _)| c)
    }

    /// Encrypts `m` under the supplied randomness `x`:
    /// c = Gamma^m * x^N mod N^2.
    pub fn encrypt_with_randomness(&self, m: &BigInt, x: &BigInt) -> Result<BigInt, PaillierError> {
        if m.sign() == Sign::Minus || m >= &self.n {
            return Err(PaillierError::MessageTooLong);
        }
        if x.sign() != Sign::Plus || x >= &self.n || !x.gcd(&self.n).is_one() {
            return Err(PaillierError::MessageMalformed);
        }

        let mod_n_square = ModInt::new(self.n_square());
        let gm = mod_n_square.exp(&self.gamma(), m);
        let xn = mod_n_square.exp(x, &self.n);
        Ok(mod_n_square.mul(&gm, &xn))
    }

    /// Homomorphically multiplies the plaintext of `c1` by the scalar `m`:
    /// c1^m mod N^2.
    pub fn homo_mult(&self, m: &BigInt, c1: &BigInt) -> Result<BigInt, PaillierError> {
        if m.sign() == Sign::Minus || m >= &self.n {
            return Err(PaillierError::MessageTooLong);
        }
        let n_square = self.n_square();
        if c1.sign() == Sign::Minus || c1 >= &n_square {
            return Err(PaillierError::MessageTooLong);
        }
        let mod_n_square = ModInt::new(n_square);
        Ok(mod_n_square.exp(c1, m))
    }

    /// Homomorphically adds the plaintexts of `c1` and `c2`:
    /// (c1 * c2) mod N^2.
    pub fn homo_add(&self, c1: &BigInt, c2: &BigInt) -> Result<BigInt, PaillierError> {
        let n_square = self.n_square();
        if c1.sign() == Sign::Minus || c1 >= &n_square {
            return Err(PaillierError::MessageTooLong);
        }
        if c2.sign() == Sign::Minus || c2 >= &n_square {
            return Err(PaillierError::MessageTooLong);
        }
        let mod_n_square = ModInt::new(n_square);
        Ok(mod_n_square.mul(c1, c2))
    }

    /// Calculates N^2.
    pub fn n_square(&self) -> BigInt {
        &self.n * &self.n
    }

    /// Returns N+1, the generator Gamma of the plaintext group.
    pub fn gamma(&self) -> BigInt {
        &self.n + BigInt::one()
    }

    /// Returns the public key as a slice of integers for hashing: [N, Gamma].
    pub fn as_ints(&self) -> Vec<BigInt> {
        vec![self.n.clone(), self.gamma()]
    }
}

impl PrivateKey {
    /// Builds a key pair from two distinct primes.
    pub fn from_primes(p: &BigInt, q: &BigInt) -> Result<Self, PaillierError> {
        if p.sign() != Sign::Plus || q.sign() != Sign::Plus || p == q {
            return Err(PaillierError::KeyGeneration("primes must be distinct and positive".to_string()));
        }
        let n = p * q;
        let p_minus_1 = p - BigInt::one();
        let q_minus_1 = q - BigInt::one();
        let phi_n = &p_minus_1 * &q_minus_1;
        let gcd = p_minus_1.gcd(&q_minus_1);
        let lambda_n = &phi_n / &gcd;

        Ok(PrivateKey {
            public_key: PublicKey { n },
            lambda_n,
            phi_n,
        })
    }

    /// Decrypts a ciphertext `c`.
    pub fn decrypt(&self, c: &BigInt) -> Result<BigInt, PaillierError> {
        let n = &self.public_key.n;
        let n_square = self.public_key.n_square();

        if c.sign() == Sign::Minus || c >= &n_square {
            return Err(PaillierError::MessageTooLong);
        }
        if !c.gcd(&n_square).is_one() {
            return Err(PaillierError::MessageMalformed);
        }

        let mod_n_square = ModInt::new(n_square);
        let mod_n = ModInt::new(n.clone());

        // m = L(c^lambda mod N^2) * L(Gamma^lambda mod N^2)^-1 mod N
        let c_pow_lambda = mod_n_square.exp(c, &self.lambda_n);
        let lc = l_function(&c_pow_lambda, n)?;

        let gamma_pow_lambda = mod_n_square.exp(&self.public_key.gamma(), &self.lambda_n);
        let lg = l_function(&gamma_pow_lambda, n)?;

        let lg_inv = mod_n
            .mod_inverse(&lg)
            .ok_or_else(|| PaillierError::Internal("L(Gamma^lambda) is not invertible mod N".to_string()))?;

        Ok(mod_n.mul(&lc, &lg_inv))
    }
}

/// L(u) = (u - 1) / n; defined only when n divides u - 1.
fn l_function(u: &BigInt, n: &BigInt) -> Result<BigInt, PaillierError> {
    let u_minus_1 = u - BigInt::one();
    if !(&u_minus_1 % n).is_zero() {
        return Err(PaillierError::Internal("L-function input not congruent to 1 mod N".to_string()));
    }
    Ok(u_minus_1 / n)
}
