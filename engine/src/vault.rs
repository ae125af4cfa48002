//! Sealed in-memory storage for member key sets.
//!
//! Stands in for the persistent key store collaborator: key sets are held
//! encrypted under a process-local AES-256-GCM key that never leaves the
//! vault. A production deployment would back this with hardware sealing.

use std::collections::HashMap;
use std::sync::RwLock;

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::QuorumError;
use crate::member::keys::{KeyMaterial, KeyType, KeyUse, MemberKeySet};
use crate::types::MemberId;

/// Sealed vault blob, encrypted with the vault's process-local key.
struct SealedEntry {
    ciphertext: Vec<u8>,
    nonce: [u8; 12],
}

/// Serialization shape for one key inside a sealed blob. Only ever exists
/// encrypted at rest or transiently in zeroized buffers.
#[derive(Serialize, Deserialize)]
struct SealedKeyRecord {
    key_type: KeyType,
    key_use: KeyUse,
    public_key: Vec<u8>,
    private_key: Option<Vec<u8>>,
}

pub struct MemberKeyVault {
    store: RwLock<HashMap<MemberId, SealedEntry>>,
    cipher: Aes256Gcm,
}

impl MemberKeyVault {
    pub fn new() -> Self {
        let mut key = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(&mut key[..]);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
        Self {
            store: RwLock::new(HashMap::new()),
            cipher,
        }
    }

    /// Seal a member's key set into the vault, replacing any previous entry.
    pub fn store_key_set(
        &self,
        member_id: MemberId,
        keys: &MemberKeySet,
    ) -> Result<(), QuorumError> {
        let records: Vec<SealedKeyRecord> = [
            (KeyUse::Signing, &keys.signing),
            (KeyUse::Encryption, &keys.encryption),
            (KeyUse::Authentication, &keys.authentication),
        ]
        .into_iter()
        .map(|(key_use, material)| SealedKeyRecord {
            key_type: material.key_type(),
            key_use,
            public_key: material.public_key().to_vec(),
            private_key: material.private_key().map(<[u8]>::to_vec),
        })
        .collect();

        let plaintext = Zeroizing::new(bincode::serialize(&records)?);
        let mut nonce = [0u8; 12];
        OsRng.fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|_| QuorumError::Crypto("vault sealing failed".into()))?;

        let mut store = self
            .store
            .write()
            .map_err(|_| QuorumError::Crypto("vault lock poisoned".into()))?;
        store.insert(member_id, SealedEntry { ciphertext, nonce });
        Ok(())
    }

    /// Unseal a member's key set from the vault.
    pub fn load_key_set(&self, member_id: &MemberId) -> Result<MemberKeySet, QuorumError> {
        let store = self
            .store
            .read()
            .map_err(|_| QuorumError::Crypto("vault lock poisoned".into()))?;
        let entry = store
            .get(member_id)
            .ok_or_else(|| QuorumError::UnknownMember {
                member_id: member_id.to_string(),
            })?;

        let plaintext = Zeroizing::new(
            self.cipher
                .decrypt(Nonce::from_slice(&entry.nonce), entry.ciphertext.as_ref())
                .map_err(|_| QuorumError::Decryption("vault unsealing failed".into()))?,
        );
        let records: Vec<SealedKeyRecord> = bincode::deserialize(&plaintext)?;

        let mut signing = None;
        let mut encryption = None;
        let mut authentication = None;
        for record in records {
            let material =
                KeyMaterial::new(record.key_type, record.public_key, record.private_key)?;
            match record.key_use {
                KeyUse::Signing => signing = Some(material),
                KeyUse::Encryption => encryption = Some(material),
                KeyUse::Authentication => authentication = Some(material),
            }
        }
        let missing = |role: KeyUse| QuorumError::KeyNotFound {
            member_id: member_id.to_string(),
            role,
        };
        Ok(MemberKeySet {
            signing: signing.ok_or_else(|| missing(KeyUse::Signing))?,
            encryption: encryption.ok_or_else(|| missing(KeyUse::Encryption))?,
            authentication: authentication.ok_or_else(|| missing(KeyUse::Authentication))?,
        })
    }

    /// Remove a member's keys; returns whether an entry existed.
    pub fn remove(&self, member_id: &MemberId) -> Result<bool, QuorumError> {
        let mut store = self
            .store
            .write()
            .map_err(|_| QuorumError::Crypto("vault lock poisoned".into()))?;
        Ok(store.remove(member_id).is_some())
    }
}

impl Default for MemberKeyVault {
    fn default() -> Self {
        Self::new()
    }
}
