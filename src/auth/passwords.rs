//! Salted, versioned password hashes.
//!
//! Encoded form: `<version><hash><salt>`.
//! - version: one character, currently `1`
//! - hash: unpadded standard base64 of `sha256(password + salt)`, 43 characters
//! - salt: 16 lowercase hex characters

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use sha2::{Digest, Sha256};

use crate::auth::{constant_time_eq, random_hex};

const MIN_VERSION: u8 = b'1';
const CURRENT_VERSION: u8 = b'1';

const VERSION_LEN: usize = 1;
const HASH_LEN: usize = 43;
const SALT_LEN: usize = 16;
pub const ENCODED_LEN: usize = VERSION_LEN + HASH_LEN + SALT_LEN;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("malformed password hash: {0}")]
    Encoding(&'static str),
    #[error("password mismatch")]
    Mismatch,
}

/// Hash `password` with a fresh salt.
pub fn encode_password(password: &str) -> String {
    let salt = random_hex(SALT_LEN / 2);
    let hash = password_hash(password, &salt, CURRENT_VERSION);
    format!("{}{}{}", CURRENT_VERSION as char, STANDARD_NO_PAD.encode(hash), salt)
}

/// Check `password` against an encoded hash.
pub fn check_password(encoded: &str, password: &str) -> Result<(), PasswordError> {
    let (version, hash, salt) = decode_password(encoded)?;
    let candidate = password_hash(password, salt, version);
    if constant_time_eq(&hash, &candidate) {
        Ok(())
    } else {
        Err(PasswordError::Mismatch)
    }
}

/// Check only that `encoded` is well formed.
pub fn verify_encoding(encoded: &str) -> Result<(), PasswordError> {
    decode_password(encoded).map(|_| ())
}

fn password_hash(password: &str, salt: &str, _version: u8) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.finalize().to_vec()
}

fn decode_password(encoded: &str) -> Result<(u8, Vec<u8>, &str), PasswordError> {
    if encoded.len() != ENCODED_LEN {
        return Err(PasswordError::Encoding("incorrect length"));
    }

    let version = encoded.as_bytes()[0];
    if !(MIN_VERSION..=CURRENT_VERSION).contains(&version) {
        return Err(PasswordError::Encoding("unsupported version"));
    }

    let hash_end = VERSION_LEN + HASH_LEN;
    let hash = encoded
        .get(VERSION_LEN..hash_end)
        .and_then(|h| STANDARD_NO_PAD.decode(h).ok())
        .ok_or(PasswordError::Encoding("hash is not base64"))?;
    let salt = encoded
        .get(hash_end..)
        .ok_or(PasswordError::Encoding("salt is not text"))?;

    Ok((version, hash, salt))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: &str = "1zB7mniBv/M00n4Xe7Cs2fP+t5mJIqQs7wbbRw1Djhfo66f5bc90dcf934ea";

    #[test]
    fn test_encode_then_check() {
        let encoded = encode_password("password");
        assert_eq!(encoded.len(), ENCODED_LEN);
        assert!(encoded.starts_with('1'));
        assert_eq!(check_password(&encoded, "password"), Ok(()));
        assert_eq!(check_password(&encoded, "password2"), Err(PasswordError::Mismatch));
    }

    #[test]
    fn test_salt_differs_per_hash() {
        assert_ne!(encode_password("password"), encode_password("password"));
    }

    #[test]
    fn test_check_known_hash() {
        assert_eq!(check_password(KNOWN, "password"), Ok(()));
        assert_eq!(check_password(KNOWN, "password2"), Err(PasswordError::Mismatch));
    }

    #[test]
    fn test_malformed_hashes() {
        let short = &KNOWN[..KNOWN.len() - 1];
        assert!(matches!(check_password(short, "password"), Err(PasswordError::Encoding(_))));

        let bad_base64 = KNOWN.replacen("e7C", "e()", 1);
        assert!(matches!(check_password(&bad_base64, "password"), Err(PasswordError::Encoding(_))));

        let future_version = KNOWN.replacen('1', "2", 1);
        assert!(matches!(verify_encoding(&future_version), Err(PasswordError::Encoding(_))));

        assert_eq!(verify_encoding(KNOWN), Ok(()));
    }
}
