//! Room code generation.
//!
//! A room code is [`RoomCode::LEN`] characters drawn uniformly from the 62
//! ASCII letters and digits, i.e. 62^6 (about 5.6 × 10^10) possible codes.
//! The generator does not know which codes are in use; `create_room`
//! resolves collisions by inserting and retrying.

use nightfall_protocol::RoomCode;
use rand::Rng;
use rand::distr::Alphanumeric;

/// Produces candidate room codes.
///
/// Implemented by [`AlphanumericCodes`] in production. Tests plug in
/// scripted generators to force collisions.
pub trait CodeGenerator: Send + Sync + 'static {
    /// Returns a new candidate code.
    fn generate(&self) -> RoomCode;
}

/// The default generator, backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphanumericCodes;

impl CodeGenerator for AlphanumericCodes {
    fn generate(&self) -> RoomCode {
        generate_code(&mut rand::rng())
    }
}

/// Draws one room code from `rng`.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> RoomCode {
    let code: String = (0..RoomCode::LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();
    RoomCode::new(code)
}
