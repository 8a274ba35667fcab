//! Salted one-way digest for hashed profile identifiers.
//!
//! The digest layout is a service-side contract: SHA-256 over the UTF-8
//! bytes of the identifier immediately followed by the bytes of the salt,
//! encoded as 64 lowercase hex characters. The same `(id, salt)` pair must
//! produce the same digest across push and recom calls, otherwise
//! recommendation lookups cannot match previously pushed events.
//!
//! The salt is secret-adjacent: it must never be logged or serialized in
//! the clear.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `id` followed by `salt`.
pub fn hex_digest(id: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update(salt.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(hex_digest("user-42", "pepper"), hex_digest("user-42", "pepper"));
    }

    #[test]
    fn salt_changes_digest() {
        assert_ne!(hex_digest("user-42", "a"), hex_digest("user-42", "b"));
    }

    #[test]
    fn id_changes_digest() {
        assert_ne!(hex_digest("user-42", "pepper"), hex_digest("user-43", "pepper"));
    }

    #[test]
    fn empty_inputs_match_known_sha256() {
        assert_eq!(
            hex_digest("", ""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_is_64_lowercase_hex_chars() {
        let d = hex_digest("user-42", "pepper");
        assert_eq!(d.len(), 64);
        assert!(d.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn concatenation_matches_single_buffer_hash() {
        let mut hasher = Sha256::new();
        hasher.update(b"user-42pepper");
        let single = format!("{:x}", hasher.finalize());
        assert_eq!(hex_digest("user-42", "pepper"), single);
    }
}
