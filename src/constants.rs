use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use sha2::Sha512;

pub(crate) static BLINDING_POINT_HASH_INPUT: &[u8] = b"mw_ledger_blinding_point_hash_input";

/// Generator for the value term of a commitment.
pub const BASE_POINT: RistrettoPoint = RISTRETTO_BASEPOINT_POINT;

/// Public message for every kernel signature. The relation proven is
/// "this point is a multiple of H", so the message carries no content.
pub const WITNESS_MAGIC: u64 = 0xC0DE_D00D;

lazy_static! {
    /// Generator for the blinding term of a commitment. Nobody knows its
    /// discrete log with respect to `BASE_POINT`.
    pub static ref BLINDING_POINT: RistrettoPoint =
        RistrettoPoint::hash_from_bytes::<Sha512>(BLINDING_POINT_HASH_INPUT);
    /// Challenge scalar shared by all signatures.
    pub static ref WITNESS_CHALLENGE: Scalar =
        Scalar::hash_from_bytes::<Sha512>(&WITNESS_MAGIC.to_le_bytes());
}
