//! Authenticated symmetric encryption for sealed documents.
//!
//! Every encrypt call draws a fresh random AES-256 key; the nonce is
//! prepended to the ciphertext so the output is self-contained. Decryption
//! with a wrong key fails authentication instead of returning garbage.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::error::QuorumError;

pub const KEY_BYTES: usize = 32;
pub const NONCE_BYTES: usize = 12;

/// Ciphertext together with the key that unlocks it.
pub struct SymmetricSealed {
    /// nonce || ciphertext+tag
    pub encrypted_data: Vec<u8>,
    pub key: Zeroizing<[u8; KEY_BYTES]>,
}

/// Encrypt `plaintext` under a fresh random key.
pub fn encrypt(plaintext: &[u8]) -> Result<SymmetricSealed, QuorumError> {
    let mut key = Zeroizing::new([0u8; KEY_BYTES]);
    OsRng.fill_bytes(&mut key[..]);
    let encrypted_data = encrypt_with_key(plaintext, &key[..])?;
    Ok(SymmetricSealed {
        encrypted_data,
        key,
    })
}

/// Encrypt `plaintext` under a caller-supplied 32-byte key.
pub fn encrypt_with_key(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, QuorumError> {
    if key.len() != KEY_BYTES {
        return Err(QuorumError::Crypto(format!(
            "symmetric key must be {KEY_BYTES} bytes, got {}",
            key.len()
        )));
    }
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut nonce_bytes = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| QuorumError::Crypto("symmetric encryption failed".into()))?;

    let mut out = Vec::with_capacity(NONCE_BYTES + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt data produced by [`encrypt`].
pub fn decrypt(encrypted_data: &[u8], key: &[u8]) -> Result<Vec<u8>, QuorumError> {
    if key.len() != KEY_BYTES {
        return Err(QuorumError::Decryption(format!(
            "recombined key must be {KEY_BYTES} bytes, got {}",
            key.len()
        )));
    }
    if encrypted_data.len() < NONCE_BYTES {
        return Err(QuorumError::Decryption(format!(
            "ciphertext of {} bytes is shorter than the {NONCE_BYTES}-byte nonce",
            encrypted_data.len()
        )));
    }
    let (nonce, ciphertext) = encrypted_data.split_at(NONCE_BYTES);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| {
            QuorumError::Decryption("authentication failed: wrong key or corrupted data".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_and_wrong_key_rejection() {
        let sealed = encrypt(b"secret document").expect("encrypt failed");
        let plaintext = decrypt(&sealed.encrypted_data, &sealed.key[..]).expect("decrypt failed");
        assert_eq!(plaintext, b"secret document");

        let mut wrong_key = *sealed.key;
        wrong_key[0] ^= 0x01;
        assert!(matches!(
            decrypt(&sealed.encrypted_data, &wrong_key),
            Err(QuorumError::Decryption(_))
        ));
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let sealed = encrypt(b"secret document").expect("encrypt failed");
        let mut tampered = sealed.encrypted_data.clone();
        let last = tampered.len() - 1;
        tampered[last] ^= 0x80;
        assert!(matches!(
            decrypt(&tampered, &sealed.key[..]),
            Err(QuorumError::Decryption(_))
        ));
    }
}
