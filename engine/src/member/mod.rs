//! Quorum member identity and key-pair lifecycle.
//!
//! Identity is immutable after creation; rotating key material means
//! creating a new member. A member owns its private key material
//! exclusively. Everything another component receives is a public view.

pub mod keys;

use bip39::{Language, Mnemonic};
use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::signing;
use crate::error::QuorumError;
use crate::member::keys::{KeyUse, MemberKeySet, StoredMemberKeyWire};
use crate::types::MemberId;

/// A member of a quorum.
#[derive(Debug, Clone)]
pub struct Member {
    id: MemberId,
    name: String,
    contact_email: String,
    keys: MemberKeySet,
    date_created: DateTime<Utc>,
    date_updated: DateTime<Utc>,
}

/// A freshly created member together with the recovery phrase that can
/// reproduce its keys.
pub struct NewMember {
    pub member: Member,
    pub mnemonic_phrase: Zeroizing<String>,
}

impl Member {
    /// Create a member with fresh keys for all three roles, derived from a
    /// single new recovery phrase.
    pub fn create(
        name: &str,
        contact_email: &str,
        salt: Option<&str>,
    ) -> Result<NewMember, QuorumError> {
        let mut entropy = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(&mut entropy[..]);
        let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy[..])
            .map_err(|e| QuorumError::MnemonicInvalid(e.to_string()))?;
        let member = Self::from_mnemonic(name, contact_email, &mnemonic, salt)?;
        Ok(NewMember {
            member,
            mnemonic_phrase: Zeroizing::new(mnemonic.to_string()),
        })
    }

    /// Rebuild a member's key set from a previously recorded recovery phrase.
    ///
    /// Produces bit-identical keys to the original derivation. The id is
    /// fresh; identity continuity across recovery is the directory's concern.
    pub fn recover(
        name: &str,
        contact_email: &str,
        mnemonic_phrase: &str,
        salt: Option<&str>,
    ) -> Result<Member, QuorumError> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, mnemonic_phrase)
            .map_err(|e| QuorumError::MnemonicInvalid(e.to_string()))?;
        Self::from_mnemonic(name, contact_email, &mnemonic, salt)
    }

    fn from_mnemonic(
        name: &str,
        contact_email: &str,
        mnemonic: &Mnemonic,
        salt: Option<&str>,
    ) -> Result<Member, QuorumError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QuorumError::Validation("member name must not be empty".into()));
        }
        let contact_email = contact_email.trim();
        if contact_email.is_empty() || !contact_email.contains('@') {
            return Err(QuorumError::Validation(format!(
                "invalid contact email {contact_email:?}"
            )));
        }
        let keys = MemberKeySet::derive(mnemonic, salt)?;
        let now = Utc::now();
        Ok(Member {
            id: MemberId::random(),
            name: name.to_string(),
            contact_email: contact_email.to_string(),
            keys,
            date_created: now,
            date_updated: now,
        })
    }

    /// Assemble a member from existing parts, e.g. a directory entry.
    pub fn from_parts(
        id: MemberId,
        name: String,
        contact_email: String,
        keys: MemberKeySet,
        date_created: DateTime<Utc>,
        date_updated: DateTime<Utc>,
    ) -> Self {
        Member {
            id,
            name,
            contact_email,
            keys,
            date_created,
            date_updated,
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact_email(&self) -> &str {
        &self.contact_email
    }

    pub fn keys(&self) -> &MemberKeySet {
        &self.keys
    }

    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    pub fn date_updated(&self) -> DateTime<Utc> {
        self.date_updated
    }

    /// A copy of this member with all private key halves removed, the shape
    /// a remote peer is allowed to see.
    pub fn public_view(&self) -> Member {
        Member {
            id: self.id,
            name: self.name.clone(),
            contact_email: self.contact_email.clone(),
            keys: self.keys.public_only(),
            date_created: self.date_created,
            date_updated: self.date_updated,
        }
    }

    /// Sign `data` with this member's signing key.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, QuorumError> {
        let private = self.private_key_for_role(KeyUse::Signing)?;
        signing::sign(&private, data)
    }

    /// Verify a signature made by this member's signing key.
    pub fn verify_signature(&self, data: &[u8], signature: &[u8]) -> Result<(), QuorumError> {
        signing::verify_signature(self.keys.signing.public_key(), data, signature)
    }

    /// Retrieve the private half of `role` for a member this process
    /// controls. Fails for public-only views of remote members.
    pub fn private_key_for_role(
        &self,
        role: KeyUse,
    ) -> Result<Zeroizing<Vec<u8>>, QuorumError> {
        self.keys
            .material_for(role)
            .private_key()
            .map(|bytes| Zeroizing::new(bytes.to_vec()))
            .ok_or_else(|| QuorumError::KeyNotFound {
                member_id: self.id.to_string(),
                role,
            })
    }

    /// Transportable profile: identity plus public keys only.
    pub fn to_wire(&self) -> MemberWire {
        MemberWire {
            id: self.id,
            name: self.name.clone(),
            contact_email: self.contact_email.clone(),
            keys: self
                .keys
                .to_stored()
                .iter()
                .map(|key| key.to_wire())
                .collect(),
            date_created: self.date_created,
            date_updated: self.date_updated,
        }
    }
}

/// JSON-serializable member profile. Never carries private key material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberWire {
    pub id: MemberId,
    pub name: String,
    pub contact_email: String,
    pub keys: Vec<StoredMemberKeyWire>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}
