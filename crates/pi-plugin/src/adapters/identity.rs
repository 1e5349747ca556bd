//! # Ed25519 Identity
//!
//! Server signing key and client signature verification.
//!
//! Keys and signatures cross the wire as lowercase hex: 32-byte public
//! keys, 64-byte signatures.

use crate::domain::SignatureError;
use crate::ports::Identity;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

/// Server identity backed by an Ed25519 key pair.
pub struct Ed25519Identity {
    signing_key: SigningKey,
}

impl Ed25519Identity {
    /// Generate a random identity.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Public key, hex.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message and return the signature as hex.
    pub fn sign_hex(&self, message: &[u8]) -> String {
        hex::encode(self.sign_message(message))
    }
}

impl std::fmt::Debug for Ed25519Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Identity")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

impl Identity for Ed25519Identity {
    fn sign_message(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    fn verify_signature(
        &self,
        signature: &str,
        public_key: &str,
        message: &[u8],
    ) -> Result<(), SignatureError> {
        verify_hex(signature, public_key, message)
    }
}

/// Verify a hex Ed25519 signature with a hex public key.
pub fn verify_hex(signature: &str, public_key: &str, message: &[u8]) -> Result<(), SignatureError> {
    let mut pk = [0u8; 32];
    hex::decode_to_slice(public_key, &mut pk)
        .map_err(|e| SignatureError::PublicKeyInvalid(format!("decode public key: {}", e)))?;
    let verifying_key = VerifyingKey::from_bytes(&pk)
        .map_err(|_| SignatureError::PublicKeyInvalid("not a valid ed25519 point".into()))?;

    let mut sig = [0u8; 64];
    hex::decode_to_slice(signature, &mut sig)
        .map_err(|e| SignatureError::SignatureInvalid(format!("decode signature: {}", e)))?;

    verifying_key
        .verify(message, &Signature::from_bytes(&sig))
        .map_err(|_| SignatureError::SignatureInvalid("signature verification failed".into()))
}
