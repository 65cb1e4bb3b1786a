use num_bigint::{BigInt, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

const MUST_GET_RANDOM_INT_MAX_BITS: u64 = 5000;

/// Returns a uniformly random non-negative integer of at most `bits` bits.
/// Panics for a zero or out-of-range bit count.
pub fn must_get_random_int<R: CryptoRng + RngCore>(rng: &mut R, bits: u64) -> BigInt {
    if bits == 0 || bits > MUST_GET_RANDOM_INT_MAX_BITS {
        panic!(
            "must_get_random_int: bits should be positive, non-zero and less than {}",
            MUST_GET_RANDOM_INT_MAX_BITS
        );
    }
    let max = BigInt::one() << bits;
    rng.gen_bigint_range(&BigInt::zero(), &max)
}

/// Returns a uniformly random integer in [0, less_than).
/// Returns `None` when the bound is not positive.
pub fn get_random_positive_int<R: CryptoRng + RngCore>(rng: &mut R, less_than: &BigInt) -> Option<BigInt> {
    if less_than <= &BigInt::zero() {
        return None;
    }
    Some(rng.gen_bigint_range(&BigInt::zero(), less_than))
}

/// Returns a uniformly random integer in [1, n) that is coprime to `n`.
/// Returns `None` when `n` is not greater than one.
pub fn get_random_positive_relatively_prime_int<R: CryptoRng + RngCore>(
    rng: &mut R,
    n: &BigInt,
) -> Option<BigInt> {
    if n <= &BigInt::one() {
        return None;
    }
    loop {
        let candidate = rng.gen_bigint_range(&BigInt::one(), n);
        if candidate.gcd(n).is_one() {
            return Some(candidate);
        }
    }
}
