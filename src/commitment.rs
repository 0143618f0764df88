use std::hash::{Hash, Hasher};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use serde::{Deserialize, Serialize};

use crate::crypto::{blinding_term, signed_value_to_scalar, value_term};

/// Pedersen commitment `value * G + blind * H`.
///
/// Commitments add homomorphically: the sum of two commitments commits to the
/// sum of their values under the sum of their blinds. Nothing in this crate
/// decomposes a commitment back into its opening.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Commitment(RistrettoPoint);

impl Commitment {
    /// Commit to a non-negative `value` under `blind`.
    pub fn new(value: u64, blind: &Scalar) -> Self {
        Commitment(value_term(&Scalar::from(value)) + blinding_term(blind))
    }

    /// Commit to a signed net value, as carried by the opening of a
    /// half-built transaction.
    pub fn from_opening(value: i128, blind: &Scalar) -> Self {
        Commitment(value_term(&signed_value_to_scalar(value)) + blinding_term(blind))
    }

    /// Commitment to zero with the given blind, i.e. `blind * H`.
    pub fn excess(blind: &Scalar) -> Self {
        Commitment(blinding_term(blind))
    }

    pub fn from_point(point: RistrettoPoint) -> Self {
        Commitment(point)
    }

    pub fn as_point(&self) -> &RistrettoPoint {
        &self.0
    }

    pub fn is_identity(&self) -> bool {
        self.0 == RistrettoPoint::identity()
    }

    /// Canonical 32-byte encoding of the underlying point.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }
}

impl Identity for Commitment {
    fn identity() -> Self {
        Commitment(RistrettoPoint::identity())
    }
}

// Ristretto points have a unique canonical encoding, so hashing the encoding
// agrees with point equality.
impl Hash for Commitment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl<'a, 'b> Add<&'b Commitment> for &'a Commitment {
    type Output = Commitment;

    fn add(self, other: &'b Commitment) -> Commitment {
        Commitment(self.0 + other.0)
    }
}

impl Add for Commitment {
    type Output = Commitment;

    fn add(self, other: Commitment) -> Commitment {
        &self + &other
    }
}

impl<'a, 'b> Sub<&'b Commitment> for &'a Commitment {
    type Output = Commitment;

    fn sub(self, other: &'b Commitment) -> Commitment {
        Commitment(self.0 - other.0)
    }
}

impl Sub for Commitment {
    type Output = Commitment;

    fn sub(self, other: Commitment) -> Commitment {
        &self - &other
    }
}

impl AddAssign<&Commitment> for Commitment {
    fn add_assign(&mut self, other: &Commitment) {
        self.0 += other.0;
    }
}

impl SubAssign<&Commitment> for Commitment {
    fn sub_assign(&mut self, other: &Commitment) {
        self.0 -= other.0;
    }
}

impl Neg for Commitment {
    type Output = Commitment;

    fn neg(self) -> Commitment {
        Commitment(-self.0)
    }
}

impl<'a> Sum<&'a Commitment> for Commitment {
    fn sum<I: Iterator<Item = &'a Commitment>>(iter: I) -> Commitment {
        iter.fold(Commitment::identity(), |acc, c| &acc + c)
    }
}

impl Sum for Commitment {
    fn sum<I: Iterator<Item = Commitment>>(iter: I) -> Commitment {
        iter.fold(Commitment::identity(), |acc, c| acc + c)
    }
}
