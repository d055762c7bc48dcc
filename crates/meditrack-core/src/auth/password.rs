//! Password hashing seam.
//!
//! Stored form is `"{salt}${hex_digest}"` where the digest is
//! SHA-256 over salt bytes followed by password bytes. Verification
//! compares digests in constant time. A deployment can swap the primitive
//! behind these two functions without touching the gate.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}", salt, hex::encode(digest(&salt, password)))
}

/// Check a password against a stored hash. Returns false on any
/// malformed stored value rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let (salt, stored_hex) = match stored.split_once('$') {
        Some(parts) => parts,
        None => return false,
    };
    let expected = match hex::decode(stored_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    constant_time_eq(&digest(salt, password), &expected)
}

fn digest(salt: &str, password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let stored = hash_password("admin123");
        assert!(verify_password("admin123", &stored));
        assert!(!verify_password("admin124", &stored));
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let first = hash_password("secret");
        let second = hash_password("secret");
        assert_ne!(first, second);
        assert!(verify_password("secret", &first));
        assert!(verify_password("secret", &second));
    }

    #[test]
    fn test_malformed_stored_value_rejected() {
        assert!(!verify_password("secret", ""));
        assert!(!verify_password("secret", "no-separator"));
        assert!(!verify_password("secret", "salt$not-hex"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
