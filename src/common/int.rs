// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::Signed;

/// Represents a modulus for modular arithmetic operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModInt {
    modulus: BigInt,
}

impl ModInt {
    /// Creates a new `ModInt` with the given modulus.
    pub fn new(modulus: BigInt) -> Self {
        assert!(modulus.sign() == Sign::Plus, "Modulus must be positive");
        ModInt { modulus }
    }

    /// Returns the underlying modulus.
    pub fn modulus(&self) -> &BigInt {
        &self.modulus
    }

    /// Performs modular addition: (x + y) % mod.
    pub fn add(&self, x: &BigInt, y: &BigInt) -> BigInt {
        (x + y).mod_floor(&self.modulus)
    }

    /// Performs modular subtraction: (x - y) % mod.
    pub fn sub(&self, x: &BigInt, y: &BigInt) -> BigInt {
        (x - y).mod_floor(&self.modulus)
    }

    /// Performs modular multiplication: (x * y) % mod.
    pub fn mul(&self, x: &BigInt, y: &BigInt) -> BigInt {
        (x * y).mod_floor(&self.modulus)
    }

    /// Performs modular exponentiation: (base ^ exponent) % mod.
    /// The exponent must be non-negative; use `exp_signed` otherwise.
    pub fn exp(&self, base: &BigInt, exponent: &BigInt) -> BigInt {
        debug_assert!(!exponent.is_negative(), "exp requires a non-negative exponent");
        base.mod_floor(&self.modulus).modpow(exponent, &self.modulus)
    }

    /// Performs modular exponentiation with an exponent of arbitrary sign.
    /// A negative exponent is resolved through the modular inverse of the
    /// base; returns `None` when that inverse does not exist.
    pub fn exp_signed(&self, base: &BigInt, exponent: &BigInt) -> Option<BigInt> {
        if exponent.is_negative() {
            let inv = self.mod_inverse(base)?;
            Some(inv.modpow(&-exponent, &self.modulus))
        } else {
            Some(self.exp(base, exponent))
        }
    }

    /// Calculates the modular multiplicative inverse: (g ^ -1) % mod.
    /// Returns `None` if the inverse does not exist (gcd(g, mod) != 1).
    pub fn mod_inverse(&self, g: &BigInt) -> Option<BigInt> {
        g.mod_floor(&self.modulus).modinv(&self.modulus)
    }
}

/// Checks if `b` is within the interval [0, bound).
pub fn is_in_interval(b: &BigInt, bound: &BigInt) -> bool {
    !b.is_negative() && b < bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::{FromPrimitive, Zero};

    #[test]
    fn test_mod_int_operations() {
        let modulus = BigInt::from_u64(100).unwrap();
        let modular = ModInt::new(modulus);

        let x = BigInt::from_u64(50).unwrap();
        let y = BigInt::from_u64(75).unwrap();
        let z = BigInt::from_u64(4).unwrap();

        // Add: (50 + 75) % 100 = 25
        assert_eq!(modular.add(&x, &y), BigInt::from_u64(25).unwrap());

        // Sub: (50 - 75) % 100 = 75
        assert_eq!(modular.sub(&x, &y), BigInt::from_u64(75).unwrap());

        // Mul: (50 * 75) % 100 = 50
        assert_eq!(modular.mul(&x, &y), BigInt::from_u64(50).unwrap());

        // Exp: (75 ^ 4) % 100 = 25
        assert_eq!(modular.exp(&y, &z), BigInt::from_u64(25).unwrap());

        // ModInverse: 75^-1 mod 100 does not exist (gcd(75, 100) = 25)
        assert_eq!(modular.mod_inverse(&y), None);
        // ModInverse: 7^-1 mod 100 = 43 (7 * 43 = 301 = 3*100 + 1)
        let seven = BigInt::from_u64(7).unwrap();
        assert_eq!(modular.mod_inverse(&seven), Some(BigInt::from_u64(43).unwrap()));
    }

    #[test]
    fn test_exp_signed() {
        let modular = ModInt::new(BigInt::from_u64(101).unwrap());
        let base = BigInt::from_u64(5).unwrap();
        let e = BigInt::from_u64(17).unwrap();

        let fwd = modular.exp(&base, &e);
        let back = modular.exp_signed(&base, &-e).unwrap();
        // b^e * b^-e = 1 (mod m)
        assert_eq!(modular.mul(&fwd, &back), BigInt::from_u64(1).unwrap());

        // Non-invertible base with negative exponent yields None.
        let modular10 = ModInt::new(BigInt::from_u64(10).unwrap());
        assert_eq!(modular10.exp_signed(&BigInt::from_u64(4).unwrap(), &BigInt::from_i64(-1).unwrap()), None);
    }

    #[test]
    fn test_is_in_interval() {
        let bound = BigInt::from_u64(100).unwrap();

        assert!(is_in_interval(&BigInt::zero(), &bound));
        assert!(is_in_interval(&BigInt::from_u64(99).unwrap(), &bound));
        assert!(!is_in_interval(&BigInt::from_u64(100).unwrap(), &bound));
        assert!(!is_in_interval(&BigInt::from_i64(-1).unwrap(), &bound));
    }
}
