use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow::anyhow!("argon2 hash failed: {e}"))
}

/// Compare a plaintext password against a stored hash. Returns `false`
/// on mismatch; a hash that cannot be parsed is an error, not a
/// mismatch.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("malformed password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_accepts_original_password() {
        let hash = hash_password("federation-2024").expect("hash");
        assert!(verify_password("federation-2024", &hash).expect("verify"));
    }

    #[test]
    fn mismatch_is_false_not_error() {
        let hash = hash_password("federation-2024").expect("hash");
        assert!(!verify_password("federation-2025", &hash).expect("verify"));
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("anything", "$2b$not-argon2").is_err());
    }
}
