use crate::error::QuillError;
use argon2::password_hash::{
    self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};

/// Salted Argon2id hashing. The PHC string carries the salt and parameters,
/// so nothing else needs storing.
#[derive(Clone)]
pub struct PasswordAuthority {
    argon2: Argon2<'static>,
}

impl Default for PasswordAuthority {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl PasswordAuthority {
    /// Custom cost parameters, e.g. cheaper ones for tests.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, QuillError> {
        if plaintext.is_empty() {
            return Err(QuillError::EmptyPassword);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| QuillError::HashingFailed(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// `Ok(false)` for a wrong password; `Err(CorruptCredentialRecord)` when
    /// `stored` is not a usable hash. The digest comparison is constant-time.
    pub fn verify(&self, plaintext: &str, stored: &str) -> Result<bool, QuillError> {
        let parsed = PasswordHash::new(stored).map_err(|_| QuillError::CorruptCredentialRecord)?;
        if parsed.salt.is_none() || parsed.hash.is_none() {
            return Err(QuillError::CorruptCredentialRecord);
        }
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(QuillError::CorruptCredentialRecord),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> PasswordAuthority {
        PasswordAuthority::with_params(Params::new(8 * 1024, 1, 1, None).unwrap())
    }

    #[test]
    fn empty_password_rejected() {
        assert!(matches!(authority().hash(""), Err(QuillError::EmptyPassword)));
    }

    #[test]
    fn hash_then_verify() {
        let auth = authority();
        for p in ["a", "correct horse battery staple", "pässwörd", " "] {
            let hash = auth.hash(p).unwrap();
            assert!(auth.verify(p, &hash).unwrap(), "{p:?} should verify");
        }
    }

    #[test]
    fn different_password_does_not_verify() {
        let auth = authority();
        let hash = auth.hash("secret-one").unwrap();
        assert!(!auth.verify("secret-two", &hash).unwrap());
        assert!(!auth.verify("", &hash).unwrap());
        assert!(!auth.verify("secret-one ", &hash).unwrap());
    }

    #[test]
    fn salts_differ_per_hash() {
        let auth = authority();
        let a = auth.hash("same").unwrap();
        let b = auth.hash("same").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
    }

    #[test]
    fn verifies_hashes_made_with_other_params() {
        let cheap = authority();
        let hash = cheap.hash("portable").unwrap();
        assert!(PasswordAuthority::default().verify("portable", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_corrupt_record() {
        let auth = authority();
        for stored in [
            "",
            "plaintext",
            "$argon2id$v=19$m=19456,t=2,p=1",
            "$argon2id$v=19$m=abc,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA",
        ] {
            assert!(matches!(
                auth.verify("anything", stored),
                Err(QuillError::CorruptCredentialRecord)
            ));
        }
    }
}
