//! Schnorr proofs of knowledge of `r` such that a public point equals `r * H`.
//!
//! Every proof answers the same fixed challenge derived from
//! [`WITNESS_MAGIC`](crate::constants::WITNESS_MAGIC). Because the challenge
//! does not depend on the nonce, proofs aggregate by plain addition: a
//! signature for `P1` merged with one for `P2` verifies against `P1 + P2`.
//! This is what lets two parties build halves of a transaction independently
//! and combine them without learning each other's blinds.

use std::ops::Add;

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
#[cfg(feature = "std")]
use rand::thread_rng;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::commitment::Commitment;
use crate::constants::WITNESS_CHALLENGE;
use crate::crypto::{blinding_term, random_nonzero_scalar};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    s: Scalar,
    nonce_point: RistrettoPoint,
}

impl Signature {
    pub fn from_parts(s: Scalar, nonce_point: RistrettoPoint) -> Self {
        Signature { s, nonce_point }
    }

    pub fn s(&self) -> &Scalar {
        &self.s
    }

    pub fn nonce_point(&self) -> &RistrettoPoint {
        &self.nonce_point
    }

    /// Prove knowledge of `secret` for the point `secret * H`.
    #[cfg(feature = "std")]
    pub fn sign(secret: &Scalar) -> Self {
        Self::sign_with_rng(secret, &mut thread_rng())
    }

    /// Prove knowledge of `secret` with the nonce drawn from `rng`.
    pub fn sign_with_rng<T: RngCore + CryptoRng>(secret: &Scalar, rng: &mut T) -> Self {
        let nonce = random_nonzero_scalar(rng);
        Signature {
            s: nonce + secret * &*WITNESS_CHALLENGE,
            nonce_point: blinding_term(&nonce),
        }
    }

    /// Accept iff `s * H == nonce_point + e * public`.
    pub fn verify(&self, public: &Commitment) -> bool {
        blinding_term(&self.s) == self.nonce_point + &*WITNESS_CHALLENGE * public.as_point()
    }

    pub fn merge(&self, other: &Signature) -> Signature {
        Signature {
            s: self.s + other.s,
            nonce_point: self.nonce_point + other.nonce_point,
        }
    }
}

impl Add for Signature {
    type Output = Signature;

    fn add(self, other: Signature) -> Signature {
        self.merge(&other)
    }
}
