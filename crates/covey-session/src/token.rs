//! Session token issuer.
//!
//! Produces unguessable, URL-safe strings. Collisions are possible in
//! principle but negligible in practice and are not treated as errors
//! here; callers that need a hard uniqueness guarantee (town ids) check
//! their own index.

use rand::distr::Alphanumeric;
use rand::Rng;

/// Length of player and user ids.
pub const ID_LENGTH: usize = 21;

/// Length of town ids. Short enough to read aloud; the registry
/// regenerates on collision.
pub const TOWN_ID_LENGTH: usize = 8;

/// Generates a random 32-character hex string (128 bits of entropy).
///
/// Used for session tokens, user tokens, update passwords, and
/// invitation ids: anything that acts as a credential.
pub fn generate_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Generates a random alphanumeric id of `len` characters.
pub fn generate_id(len: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
