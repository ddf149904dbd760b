//! Session token hashing
//!
//! The identity service stores only the SHA-256 of each bearer token in the
//! `sessions` table. Lookups hash the presented token the same way.

use sha2::{Digest, Sha256};

/// Hash a bearer token into the 64-character lowercase hex key used by `sessions.token_hash`
///
/// # Examples
///
/// ```
/// use vocab_common::auth::hash_token;
///
/// let hash = hash_token("secret-token");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, hash_token("secret-token"));
/// ```
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
