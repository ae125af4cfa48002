//! Ed25519 signing and verification over checksums and payloads.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::QuorumError;

pub const PUBLIC_KEY_BYTES: usize = 32;
pub const PRIVATE_KEY_BYTES: usize = 32;
pub const SIGNATURE_BYTES: usize = 64;

/// Sign `message` with a raw 32-byte Ed25519 secret key.
pub fn sign(secret_bytes: &[u8], message: &[u8]) -> Result<Vec<u8>, QuorumError> {
    let secret: [u8; PRIVATE_KEY_BYTES] = secret_bytes
        .try_into()
        .map_err(|_| QuorumError::Crypto("signing key must be 32 bytes".into()))?;
    let key = SigningKey::from_bytes(&secret);
    Ok(key.sign(message).to_bytes().to_vec())
}

/// Verify a signature against a message and public key.
pub fn verify_signature(
    pubkey_bytes: &[u8],
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<(), QuorumError> {
    let pubkey_arr: [u8; PUBLIC_KEY_BYTES] = pubkey_bytes
        .try_into()
        .map_err(|_| QuorumError::SignatureInvalid("public key must be 32 bytes".into()))?;
    let pubkey = VerifyingKey::from_bytes(&pubkey_arr)
        .map_err(|e| QuorumError::SignatureInvalid(format!("invalid public key: {e}")))?;

    let sig_arr: [u8; SIGNATURE_BYTES] = signature_bytes
        .try_into()
        .map_err(|_| QuorumError::SignatureInvalid("signature must be 64 bytes".into()))?;
    let signature = Signature::from_bytes(&sig_arr);

    pubkey
        .verify(message, &signature)
        .map_err(|e| QuorumError::SignatureInvalid(format!("verification failed: {e}")))
}
