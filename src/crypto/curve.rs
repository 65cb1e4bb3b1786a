// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use k256::elliptic_curve::group::Group;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar, U256};
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::Signed;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Order of the secp256k1 group.
static CURVE_ORDER: Lazy<BigInt> = Lazy::new(|| {
    BigInt::parse_bytes(
        b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141",
        16,
    )
    .expect("valid curve order constant")
});

/// Prime of the secp256k1 base field.
static FIELD_PRIME: Lazy<BigInt> = Lazy::new(|| {
    BigInt::parse_bytes(
        b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F",
        16,
    )
    .expect("valid field prime constant")
});

pub fn order() -> &'static BigInt {
    &CURVE_ORDER
}

pub fn field_prime() -> &'static BigInt {
    &FIELD_PRIME
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointError {
    #[error("point is not on the curve")]
    NotOnCurve,
    #[error("coordinate out of field range")]
    CoordinateOutOfRange,
    #[error("invalid point encoding: {0}")]
    InvalidEncoding(String),
}

/// A point on secp256k1, stored in projective form for cheap group ops.
#[derive(Clone)]
pub struct EcPoint {
    point: ProjectivePoint,
}

impl EcPoint {
    /// The group generator G.
    pub fn generator() -> Self {
        Self { point: ProjectivePoint::GENERATOR }
    }

    /// The identity element (point at infinity).
    pub fn identity() -> Self {
        Self { point: ProjectivePoint::IDENTITY }
    }

    /// Creates a point from affine coordinates, rejecting anything that is
    /// not on the curve.
    pub fn from_coords(x: &BigInt, y: &BigInt) -> Result<Self, PointError> {
        let x_bytes = to_field_bytes(x)?;
        let y_bytes = to_field_bytes(y)?;
        let encoded = EncodedPoint::from_affine_coordinates(&x_bytes, &y_bytes, false);
        let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .ok_or(PointError::NotOnCurve)?;
        Ok(Self { point: ProjectivePoint::from(affine) })
    }

    /// Creates a point from its SEC1 encoding (compressed or uncompressed).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PointError> {
        let encoded = EncodedPoint::from_bytes(bytes)
            .map_err(|e| PointError::InvalidEncoding(e.to_string()))?;
        let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .ok_or(PointError::NotOnCurve)?;
        Ok(Self { point: ProjectivePoint::from(affine) })
    }

    /// Returns the affine coordinates, or `None` for the identity.
    pub fn coords(&self) -> Option<(BigInt, BigInt)> {
        let encoded = self.point.to_affine().to_encoded_point(false);
        match (encoded.x(), encoded.y()) {
            (Some(x), Some(y)) => Some((
                BigInt::from_bytes_be(Sign::Plus, x),
                BigInt::from_bytes_be(Sign::Plus, y),
            )),
            _ => None,
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        Self { point: self.point + other.point }
    }

    /// Scalar multiplication k * P; `k` is reduced modulo the group order.
    pub fn scalar_mul(&self, k: &BigInt) -> Self {
        Self { point: self.point * to_scalar(k) }
    }

    /// Multiplies the group generator by `k`.
    pub fn scalar_base_mult(k: &BigInt) -> Self {
        Self { point: ProjectivePoint::GENERATOR * to_scalar(k) }
    }

    pub fn is_identity(&self) -> bool {
        bool::from(self.point.is_identity())
    }

    /// Serialises the point to compressed SEC1 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.point.to_affine().to_encoded_point(true).as_bytes().to_vec()
    }
}

impl PartialEq for EcPoint {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}
impl Eq for EcPoint {}

impl fmt::Debug for EcPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.coords() {
            Some((x, y)) => f
                .debug_struct("EcPoint")
                .field("x", &x.to_str_radix(16))
                .field("y", &y.to_str_radix(16))
                .finish(),
            None => f.write_str("EcPoint(identity)"),
        }
    }
}

impl Serialize for EcPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_bytes().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EcPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        EcPoint::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

fn to_scalar(k: &BigInt) -> Scalar {
    let reduced = k.mod_floor(&CURVE_ORDER);
    let (_, bytes) = reduced.to_bytes_be();
    let mut buf = [0u8; 32];
    buf[32 - bytes.len()..].copy_from_slice(&bytes);
    <Scalar as Reduce<U256>>::reduce(U256::from_be_slice(&buf))
}

fn to_field_bytes(b: &BigInt) -> Result<FieldBytes, PointError> {
    if b.is_negative() || b >= &*FIELD_PRIME {
        return Err(PointError::CoordinateOutOfRange);
    }
    let (_, bytes) = b.to_bytes_be();
    let mut buf = [0u8; 32];
    buf[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(FieldBytes::from(buf))
}
