//! Short-code and object-key generation.
//!
//! Both identifiers are random with a space large enough that collisions are
//! not expected in practice; the insert path still regenerates once if the
//! database reports a uniqueness violation.

use rand::RngExt;
use uuid::Uuid;

/// Alphabet for public short codes.
pub const CODE_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated short codes.
pub const CODE_LENGTH: usize = 5;

/// Generate a fresh public short code.
pub fn short_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Server-chosen object key: random token plus the original extension.
/// Never derived from the user-supplied name, which prevents collisions and
/// path traversal on the object store.
pub fn stored_filename(original: &str) -> String {
    match std::path::Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
    {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}
