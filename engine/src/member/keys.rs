//! Member key roles, derivation from recovery phrases, and stored key forms.
//!
//! Every member carries one key pair per role. Role safety is structural:
//! [`MemberKeySet`] has one typed field per role and the storage form
//! [`StoredMemberKey`] is a tagged enum, so role checks are exhaustive
//! matches instead of runtime probing.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bip39::{Language, Mnemonic};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

use crate::error::QuorumError;

/// Default recovery phrase length (BIP-39, 256 bits of entropy).
pub const DEFAULT_MNEMONIC_WORDS: usize = 24;

const ROLE_SECRET_BYTES: usize = 32;

/// Curve/algorithm behind a stored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    Ed25519,
    X25519,
}

/// What a key is allowed to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyUse {
    Authentication,
    Encryption,
    Signing,
}

impl KeyUse {
    /// Domain-separation tag mixed into the per-role secret derivation.
    fn derivation_tag(&self) -> &'static [u8] {
        match self {
            KeyUse::Authentication => b"quorum/key/authentication",
            KeyUse::Encryption => b"quorum/key/encryption",
            KeyUse::Signing => b"quorum/key/signing",
        }
    }

    fn key_type(&self) -> KeyType {
        match self {
            KeyUse::Authentication | KeyUse::Signing => KeyType::Ed25519,
            KeyUse::Encryption => KeyType::X25519,
        }
    }
}

/// Key material for one role: the public half is always present, the private
/// half only for keys this process controls.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    key_type: KeyType,
    public_key: Vec<u8>,
    private_key: Option<Zeroizing<Vec<u8>>>,
}

impl KeyMaterial {
    pub fn new(
        key_type: KeyType,
        public_key: Vec<u8>,
        private_key: Option<Vec<u8>>,
    ) -> Result<Self, QuorumError> {
        if public_key.is_empty() {
            return Err(QuorumError::Validation("public key must not be empty".into()));
        }
        if let Some(private) = &private_key {
            if private.is_empty() {
                return Err(QuorumError::Validation(
                    "private key provided but zero length".into(),
                ));
            }
        }
        Ok(Self {
            key_type,
            public_key,
            private_key: private_key.map(Zeroizing::new),
        })
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn private_key(&self) -> Option<&[u8]> {
        self.private_key.as_deref().map(Vec::as_slice)
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// A copy with the private half removed.
    pub fn public_only(&self) -> Self {
        Self {
            key_type: self.key_type,
            public_key: self.public_key.clone(),
            private_key: None,
        }
    }
}

/// A member key tagged by its role.
///
/// Operations that need a specific role match exhaustively on this enum.
#[derive(Debug, Clone)]
pub enum StoredMemberKey {
    Authentication(KeyMaterial),
    Encryption(KeyMaterial),
    Signing(KeyMaterial),
}

impl StoredMemberKey {
    pub fn from_material(key_use: KeyUse, material: KeyMaterial) -> Self {
        match key_use {
            KeyUse::Authentication => StoredMemberKey::Authentication(material),
            KeyUse::Encryption => StoredMemberKey::Encryption(material),
            KeyUse::Signing => StoredMemberKey::Signing(material),
        }
    }

    pub fn key_use(&self) -> KeyUse {
        match self {
            StoredMemberKey::Authentication(_) => KeyUse::Authentication,
            StoredMemberKey::Encryption(_) => KeyUse::Encryption,
            StoredMemberKey::Signing(_) => KeyUse::Signing,
        }
    }

    pub fn material(&self) -> &KeyMaterial {
        match self {
            StoredMemberKey::Authentication(m)
            | StoredMemberKey::Encryption(m)
            | StoredMemberKey::Signing(m) => m,
        }
    }

    /// Transportable form; the private half is never included.
    pub fn to_wire(&self) -> StoredMemberKeyWire {
        let material = self.material();
        StoredMemberKeyWire {
            key_type: material.key_type(),
            key_use: self.key_use(),
            public_key: BASE64.encode(material.public_key()),
        }
    }

    pub fn from_wire(wire: &StoredMemberKeyWire) -> Result<Self, QuorumError> {
        let public_key = BASE64
            .decode(&wire.public_key)
            .map_err(|e| QuorumError::Serde(format!("invalid public key base64: {e}")))?;
        let material = KeyMaterial::new(wire.key_type, public_key, None)?;
        Ok(Self::from_material(wire.key_use, material))
    }
}

/// JSON-serializable form of a stored key. Public half only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMemberKeyWire {
    pub key_type: KeyType,
    pub key_use: KeyUse,
    /// base64 of the raw public key bytes
    pub public_key: String,
}

/// The full key set a member holds, one pair per role.
#[derive(Debug, Clone)]
pub struct MemberKeySet {
    pub signing: KeyMaterial,
    pub encryption: KeyMaterial,
    pub authentication: KeyMaterial,
}

impl MemberKeySet {
    /// Derive all three role keys from one recovery phrase.
    pub fn derive(mnemonic: &Mnemonic, salt: Option<&str>) -> Result<Self, QuorumError> {
        Ok(Self {
            signing: derive_from_mnemonic(mnemonic, KeyUse::Signing, salt)?.into_material()?,
            encryption: derive_from_mnemonic(mnemonic, KeyUse::Encryption, salt)?.into_material()?,
            authentication: derive_from_mnemonic(mnemonic, KeyUse::Authentication, salt)?
                .into_material()?,
        })
    }

    pub fn material_for(&self, key_use: KeyUse) -> &KeyMaterial {
        match key_use {
            KeyUse::Authentication => &self.authentication,
            KeyUse::Encryption => &self.encryption,
            KeyUse::Signing => &self.signing,
        }
    }

    /// A copy with every private half removed.
    pub fn public_only(&self) -> Self {
        Self {
            signing: self.signing.public_only(),
            encryption: self.encryption.public_only(),
            authentication: self.authentication.public_only(),
        }
    }

    pub fn to_stored(&self) -> Vec<StoredMemberKey> {
        vec![
            StoredMemberKey::Signing(self.signing.clone()),
            StoredMemberKey::Encryption(self.encryption.clone()),
            StoredMemberKey::Authentication(self.authentication.clone()),
        ]
    }
}

/// Everything derived from one recovery phrase for one key role.
pub struct DerivedKeyPair {
    pub key_type: KeyType,
    pub public_key: Vec<u8>,
    pub private_key: Zeroizing<Vec<u8>>,
    /// 64-byte PBKDF2 seed the key pair was derived from.
    pub seed: Zeroizing<Vec<u8>>,
    /// Raw entropy behind the mnemonic.
    pub entropy: Zeroizing<Vec<u8>>,
    /// The recovery phrase that reproduces this key pair.
    pub mnemonic_phrase: Zeroizing<String>,
}

impl DerivedKeyPair {
    fn into_material(self) -> Result<KeyMaterial, QuorumError> {
        KeyMaterial::new(
            self.key_type,
            self.public_key,
            Some(self.private_key.to_vec()),
        )
    }
}

/// Generate a fresh key pair for `key_use`, returning the recovery phrase
/// that reproduces it.
pub fn generate_key_pair(
    key_use: KeyUse,
    salt: Option<&str>,
) -> Result<DerivedKeyPair, QuorumError> {
    let mut entropy = Zeroizing::new([0u8; 32]);
    OsRng.fill_bytes(&mut entropy[..]);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy[..])
        .map_err(|e| QuorumError::MnemonicInvalid(e.to_string()))?;
    derive_from_mnemonic(&mnemonic, key_use, salt)
}

/// Re-derive the identical key pair from a previously recorded phrase.
///
/// This is the recovery path: the same phrase and salt reproduce
/// bit-identical keys.
pub fn regenerate_key_pair(
    mnemonic_phrase: &str,
    key_use: KeyUse,
    salt: Option<&str>,
) -> Result<DerivedKeyPair, QuorumError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, mnemonic_phrase)
        .map_err(|e| QuorumError::MnemonicInvalid(e.to_string()))?;
    derive_from_mnemonic(&mnemonic, key_use, salt)
}

fn role_secret(seed: &[u8], key_use: KeyUse) -> Zeroizing<[u8; ROLE_SECRET_BYTES]> {
    let mut hasher = Sha512::new();
    hasher.update(seed);
    hasher.update(key_use.derivation_tag());
    let digest = hasher.finalize();
    let mut secret = Zeroizing::new([0u8; ROLE_SECRET_BYTES]);
    secret.copy_from_slice(&digest[..ROLE_SECRET_BYTES]);
    secret
}

pub(crate) fn derive_from_mnemonic(
    mnemonic: &Mnemonic,
    key_use: KeyUse,
    salt: Option<&str>,
) -> Result<DerivedKeyPair, QuorumError> {
    let seed = Zeroizing::new(mnemonic.to_seed(salt.unwrap_or("")));
    let secret = role_secret(&seed[..], key_use);

    let (public_key, private_key) = match key_use.key_type() {
        KeyType::Ed25519 => {
            let signing_key = ed25519_dalek::SigningKey::from_bytes(&secret);
            (
                signing_key.verifying_key().to_bytes().to_vec(),
                secret.to_vec(),
            )
        }
        KeyType::X25519 => {
            let static_secret = x25519_dalek::StaticSecret::from(*secret);
            (
                x25519_dalek::PublicKey::from(&static_secret)
                    .as_bytes()
                    .to_vec(),
                secret.to_vec(),
            )
        }
    };

    Ok(DerivedKeyPair {
        key_type: key_use.key_type(),
        public_key,
        private_key: Zeroizing::new(private_key),
        seed: Zeroizing::new(seed.to_vec()),
        entropy: Zeroizing::new(mnemonic.to_entropy()),
        mnemonic_phrase: Zeroizing::new(mnemonic.to_string()),
    })
}
