pub use curve25519_dalek::ristretto::RistrettoPoint;
pub use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};

use crate::constants::{BASE_POINT, BLINDING_POINT};

/// Draw a uniformly random scalar in `[1, order)`.
pub fn random_nonzero_scalar<T: RngCore + CryptoRng>(rng: &mut T) -> Scalar {
    loop {
        let candidate = Scalar::random(rng);
        if candidate != Scalar::zero() {
            return candidate;
        }
    }
}

/// Map a signed net value into the scalar field. Negative values wrap
/// around the group order.
pub fn signed_value_to_scalar(value: i128) -> Scalar {
    // |value| < 2^128 is far below the group order, so the bits are canonical.
    let mut bits = [0u8; 32];
    bits[..16].copy_from_slice(&value.unsigned_abs().to_le_bytes());
    let magnitude = Scalar::from_bits(bits);
    if value < 0 {
        -magnitude
    } else {
        magnitude
    }
}

pub(crate) fn value_term(value: &Scalar) -> RistrettoPoint {
    value * BASE_POINT
}

pub(crate) fn blinding_term(blind: &Scalar) -> RistrettoPoint {
    blind * &*BLINDING_POINT
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[quickcheck]
    fn random_nonzero_scalar_should_not_be_zero(seed: u64) -> bool {
        let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(seed);
        random_nonzero_scalar(&mut csprng) != Scalar::zero()
    }

    #[quickcheck]
    fn signed_value_should_negate_in_field(value: i64) -> bool {
        let value = value as i128;
        signed_value_to_scalar(value) + signed_value_to_scalar(-value) == Scalar::zero()
    }

    #[test]
    fn generator_terms_should_commute() {
        let five = Scalar::from(5u64);
        let seven = Scalar::from(7u64);
        assert_eq!(
            value_term(&five) + blinding_term(&seven),
            blinding_term(&seven) + value_term(&five)
        );
        assert_eq!(
            value_term(&five) + value_term(&seven),
            value_term(&seven) + value_term(&five)
        );
    }

    #[test]
    fn generator_terms_should_distribute_over_scalars() {
        let five = Scalar::from(5u64);
        let seven = Scalar::from(7u64);
        assert_eq!(
            value_term(&five) + value_term(&seven),
            value_term(&Scalar::from(12u64))
        );
        assert_eq!(
            blinding_term(&five) + blinding_term(&seven),
            blinding_term(&Scalar::from(12u64))
        );
        let cross = value_term(&five)
            + blinding_term(&seven)
            + value_term(&Scalar::from(11u64))
            + blinding_term(&Scalar::from(13u64));
        assert_eq!(
            cross,
            value_term(&Scalar::from(16u64)) + blinding_term(&Scalar::from(20u64))
        );
    }
}
