//! Hybrid per-recipient encryption: X25519 key agreement feeding AES-256-GCM.
//!
//! Each sealed payload carries the ephemeral public key and nonce it was
//! produced with, so the recipient's static secret is all that is needed to
//! unseal it.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::crypto::symmetric::{KEY_BYTES, NONCE_BYTES};
use crate::error::QuorumError;

pub const X25519_KEY_BYTES: usize = 32;

/// A payload sealed to a single recipient public key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedPayload {
    pub ephemeral_public: [u8; X25519_KEY_BYTES],
    pub nonce: [u8; NONCE_BYTES],
    pub ciphertext: Vec<u8>,
}

impl SealedPayload {
    /// Compact transportable encoding (bincode, hex).
    pub fn to_hex(&self) -> Result<String, QuorumError> {
        Ok(hex::encode(bincode::serialize(self)?))
    }

    pub fn from_hex(encoded: &str) -> Result<Self, QuorumError> {
        let raw = hex::decode(encoded)
            .map_err(|e| QuorumError::Serde(format!("invalid sealed payload hex: {e}")))?;
        Ok(bincode::deserialize(&raw)?)
    }
}

/// Bind the wrapping key to both sides of the exchange.
fn derive_wrap_key(
    shared_secret: &[u8],
    ephemeral_public: &[u8; X25519_KEY_BYTES],
    recipient_public: &[u8; X25519_KEY_BYTES],
) -> Zeroizing<[u8; KEY_BYTES]> {
    let mut hasher = Sha512::new();
    hasher.update(shared_secret);
    hasher.update(ephemeral_public);
    hasher.update(recipient_public);
    let digest = hasher.finalize();
    let mut key = Zeroizing::new([0u8; KEY_BYTES]);
    key.copy_from_slice(&digest[..KEY_BYTES]);
    key
}

/// Seal `plaintext` to the holder of `recipient_public`.
pub fn seal(plaintext: &[u8], recipient_public: &[u8]) -> Result<SealedPayload, QuorumError> {
    let recipient: [u8; X25519_KEY_BYTES] = recipient_public
        .try_into()
        .map_err(|_| QuorumError::Crypto("recipient public key must be 32 bytes".into()))?;
    let recipient_key = PublicKey::from(recipient);

    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = PublicKey::from(&ephemeral);
    let shared = ephemeral.diffie_hellman(&recipient_key);
    let wrap_key = derive_wrap_key(shared.as_bytes(), ephemeral_public.as_bytes(), &recipient);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&wrap_key[..]));
    let mut nonce = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut nonce);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| QuorumError::Crypto("hybrid encryption failed".into()))?;

    Ok(SealedPayload {
        ephemeral_public: *ephemeral_public.as_bytes(),
        nonce,
        ciphertext,
    })
}

/// Unseal a payload with the recipient's static secret key.
pub fn unseal(sealed: &SealedPayload, recipient_secret: &[u8]) -> Result<Vec<u8>, QuorumError> {
    let secret_arr: [u8; X25519_KEY_BYTES] = recipient_secret
        .try_into()
        .map_err(|_| QuorumError::Crypto("recipient secret key must be 32 bytes".into()))?;
    let secret = StaticSecret::from(secret_arr);
    let recipient_public = PublicKey::from(&secret);

    let shared = secret.diffie_hellman(&PublicKey::from(sealed.ephemeral_public));
    let wrap_key = derive_wrap_key(
        shared.as_bytes(),
        &sealed.ephemeral_public,
        recipient_public.as_bytes(),
    );

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&wrap_key[..]));
    cipher
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_ref())
        .map_err(|_| {
            QuorumError::Decryption("authentication failed: wrong recipient key or tampering".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair() -> (StaticSecret, PublicKey) {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        (secret, public)
    }

    #[test]
    fn seal_unseal_roundtrip() {
        let (secret, public) = keypair();
        let sealed = seal(b"one key share", public.as_bytes()).expect("seal failed");
        let opened = unseal(&sealed, secret.as_bytes()).expect("unseal failed");
        assert_eq!(opened, b"one key share");
    }

    #[test]
    fn wrong_recipient_cannot_unseal() {
        let (_alice_secret, alice_public) = keypair();
        let (bob_secret, _bob_public) = keypair();
        let sealed = seal(b"one key share", alice_public.as_bytes()).expect("seal failed");
        assert!(matches!(
            unseal(&sealed, bob_secret.as_bytes()),
            Err(QuorumError::Decryption(_))
        ));
    }

    #[test]
    fn hex_encoding_roundtrip() {
        let (secret, public) = keypair();
        let sealed = seal(b"share", public.as_bytes()).expect("seal failed");
        let encoded = sealed.to_hex().expect("encode failed");
        let decoded = SealedPayload::from_hex(&encoded).expect("decode failed");
        assert_eq!(unseal(&decoded, secret.as_bytes()).expect("unseal failed"), b"share");
    }
}
