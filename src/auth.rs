//! Opaque credential check for the authentication collaborator.
//!
//! Users carry a salted SHA-256 digest. Session tokens issued after a
//! successful check live in `api::types::SessionRegistry`.

use base64::Engine;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Salted digest stored alongside a user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub salt: String,
    pub hash: String,
}

impl Credential {
    /// Derive a credential with a fresh random salt.
    pub fn derive(secret: &str) -> Self {
        let salt_bytes: [u8; 16] = rand::random();
        let salt = base64::engine::general_purpose::STANDARD_NO_PAD.encode(salt_bytes);
        let hash = digest(&salt, secret);
        Self { salt, hash }
    }

    pub fn verify(&self, secret: &str) -> bool {
        digest(&self.salt, secret)
            .as_bytes()
            .ct_eq(self.hash.as_bytes())
            .into()
    }
}

fn digest(salt: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    base64::engine::general_purpose::STANDARD_NO_PAD.encode(hasher.finalize())
}
