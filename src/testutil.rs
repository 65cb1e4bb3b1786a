//! Fixed fixtures shared by the unit tests. The primes are hardcoded so the
//! suite never spends time on prime generation; sizes are deliberately below
//! production parameters.

use crate::common::int::ModInt;
use crate::common::random::{get_random_positive_int, get_random_positive_relatively_prime_int};
use crate::crypto::curve;
use crate::crypto::paillier::{PrivateKey, PublicKey};
use crate::protocol::params::PublicParameters;

use num_bigint::BigInt;
use num_traits::Zero;
use rand::{CryptoRng, RngCore};

const P256_A: &[u8] = b"C2B38755CD37880E16AC4191A26AA0AE044F1574F037AFC644D82A531289BAFB";
const P256_B: &[u8] = b"F711B7573B16494331A59C4AD1EBD086C40F36094FCC9A5C334E51AFF848A957";
const P512_A: &[u8] = b"992A2829C5E5064184C46F726FBB28F307FFE38E69B52FC2C9FF909007EE64FEBEE33D4A9E47539449A35964D9F3DD4579E08F8680F4EDD89A1D3876F6C8A64B";
const P512_B: &[u8] = b"D54076BB422E27FDDFF056177A95693ABF5D99046AD9DBA34AB1673451F5F5705953D3CF85B7128012C6FC9555D9F3EC78496FE4260BB71D32C668AFF84F541D";
const P1024_A: &[u8] = b"90B0F9E291643DD38873ED28B87391D3DC4247CFB2F17CC69EE106D01E3094BFB011444490C6871066A7835ADE37AB493BE023E25838C9530F00CBB64ED41825B651772C9316C1F27717065708B7764CCCA665292E6A10E8A484FAB7B69A03D8F9253EC0B4872B365158E05607D5A5B84AB7DE1F365FC58DDFCEBFEAA293AE03";
const P1024_B: &[u8] = b"D0BF1BE23A9133A676037E3F6906A68B2F067F88D94C405DB0A0EBB51C323B36BD1042FBA9439A7ACFACA6FB2A7ADADD4910F1BFDC3BCE0ADEDEA622FEDF5C98346E5F4406DA1D77EE551DB54FA50B1839939DF8F1D428133714A989631A0CB43E302C0A7FD159A545E2FC1E341AA2E4AB45DC28A2CD256E384059BCE71B851B";

fn prime(hex: &[u8]) -> BigInt {
    BigInt::parse_bytes(hex, 16).expect("valid prime constant")
}

/// A 512-bit Paillier key; fast, for unit tests.
pub(crate) fn small_paillier() -> (PrivateKey, PublicKey) {
    let sk = PrivateKey::from_primes(&prime(P256_A), &prime(P256_B)).unwrap();
    let pk = sk.public_key.clone();
    (sk, pk)
}

/// A 2048-bit Paillier key; large enough for the flooding-noise ranges of
/// the full two-party flow.
pub(crate) fn large_paillier() -> (PrivateKey, PublicKey) {
    let sk = PrivateKey::from_primes(&prime(P1024_A), &prime(P1024_B)).unwrap();
    let pk = sk.public_key.clone();
    (sk, pk)
}

/// Builds session parameters over a fixed 1024-bit auxiliary modulus with
/// freshly sampled generators.
pub(crate) fn params_with<R: CryptoRng + RngCore>(rng: &mut R, paillier: PublicKey) -> PublicParameters {
    let n_tilde = prime(P512_A) * prime(P512_B);
    let mod_n_tilde = ModInt::new(n_tilde.clone());
    let f = get_random_positive_relatively_prime_int(rng, &n_tilde).unwrap();
    let alpha = get_random_positive_relatively_prime_int(rng, &n_tilde).unwrap();
    let h1 = mod_n_tilde.mul(&f, &f);
    let h2 = mod_n_tilde.exp(&h1, &alpha);
    PublicParameters::new(paillier, n_tilde, h1, h2).unwrap()
}

pub(crate) fn small_params<R: CryptoRng + RngCore>(rng: &mut R) -> PublicParameters {
    params_with(rng, small_paillier().1)
}

/// A uniformly random non-zero scalar of the curve group.
pub(crate) fn nonzero_scalar<R: CryptoRng + RngCore>(rng: &mut R) -> BigInt {
    loop {
        let x = get_random_positive_int(rng, curve::order()).unwrap();
        if !x.is_zero() {
            return x;
        }
    }
}
