//! Centralized quorum engine error types.

use thiserror::Error;

use crate::member::keys::KeyUse;

#[derive(Error, Debug)]
pub enum QuorumError {
    /// Bad counts, thresholds, or share weights supplied by the caller.
    #[error("Validation error: {0}")]
    Validation(String),
    /// An operation referenced a member outside the target set.
    #[error("Unknown member: {member_id}")]
    UnknownMember { member_id: String },
    /// The member holds no private material for the requested key role.
    #[error("No private {role:?} key for member {member_id}")]
    KeyNotFound { member_id: String, role: KeyUse },
    /// Unknown word, bad check word, or malformed recovery phrase.
    #[error("Invalid mnemonic: {0}")]
    MnemonicInvalid(String),
    /// Stored and recomputed checksums disagree.
    #[error("Checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    /// A signature failed verification against the signer's public key.
    #[error("Signature verification failed: {0}")]
    SignatureInvalid(String),
    /// Shares could not be recombined (malformed, duplicated, or mixed widths).
    #[error("Share reconstruction failed: {0}")]
    ShareReconstruction(String),
    /// Authenticated decryption rejected the key or ciphertext.
    #[error("Decryption failed: {0}")]
    Decryption(String),
    /// The buffer length is not one of the supported block sizes.
    #[error("Invalid block size: {actual} bytes")]
    Size { actual: usize },
    /// Two blocks of different sizes cannot be combined.
    #[error("Block size mismatch: {left} bytes vs {right} bytes")]
    SizeMismatch { left: usize, right: usize },
    /// A deserialized artifact's creator does not resolve to the claimed member.
    #[error("Member mismatch: expected {expected}, resolved {actual}")]
    MemberMismatch { expected: String, actual: String },
    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serde(String),
    /// Generic cryptographic operation failure.
    #[error("Cryptographic error: {0}")]
    Crypto(String),
}

impl From<serde_json::Error> for QuorumError {
    fn from(err: serde_json::Error) -> Self {
        QuorumError::Serde(err.to_string())
    }
}

impl From<bincode::Error> for QuorumError {
    fn from(err: bincode::Error) -> Self {
        QuorumError::Serde(err.to_string())
    }
}
