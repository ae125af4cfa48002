//! The immutable, integrity-checked artifact produced by sealing.
//!
//! A record is never mutated after construction; re-sealing produces a new
//! record. Checksum and signature are verified at construction, not merely
//! stored, so no partially valid record is ever observable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::allocation::{MemberShareCount, ShareAllocation};
use crate::checksum::{self, CHECKSUM_BYTES};
use crate::error::QuorumError;
use crate::member::Member;
use crate::registry::MemberDirectory;
use crate::types::MemberId;

/// How many shares must combine to unseal a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuorumPolicy {
    /// The usual case: `n` shares are required, `2 <= n <= member count`.
    Threshold(usize),
    /// No quorum requirement; a degenerate single-owner record.
    Unrestricted,
}

impl QuorumPolicy {
    /// Wire encoding: the threshold itself, or -1 for no quorum.
    pub fn to_wire(self) -> i64 {
        match self {
            QuorumPolicy::Threshold(n) => n as i64,
            QuorumPolicy::Unrestricted => -1,
        }
    }

    pub fn from_wire(value: i64) -> Result<Self, QuorumError> {
        match value {
            -1 => Ok(QuorumPolicy::Unrestricted),
            n if n >= 0 => Ok(QuorumPolicy::Threshold(n as usize)),
            n => Err(QuorumError::Validation(format!(
                "invalid sharesRequired value {n}"
            ))),
        }
    }
}

/// Optional caller-supplied parts for record construction; anything absent
/// is computed.
#[derive(Debug, Default)]
pub struct RecordParts {
    pub id: Option<Uuid>,
    pub checksum: Option<Vec<u8>>,
    pub signature: Option<Vec<u8>>,
    pub date_created: Option<DateTime<Utc>>,
    pub date_updated: Option<DateTime<Utc>>,
}

/// Immutable sealed record binding ciphertext, member set, and quorum policy.
#[derive(Debug, Clone)]
pub struct QuorumDataRecord {
    id: Uuid,
    created_by: MemberId,
    member_ids: Vec<MemberId>,
    policy: QuorumPolicy,
    encrypted_data: Vec<u8>,
    checksum: [u8; CHECKSUM_BYTES],
    signature: Vec<u8>,
    share_allocation: ShareAllocation,
    date_created: DateTime<Utc>,
    date_updated: DateTime<Utc>,
}

impl QuorumDataRecord {
    /// Construct a record, computing checksum and signature.
    pub fn create(
        creator: &Member,
        member_ids: Vec<MemberId>,
        policy: QuorumPolicy,
        encrypted_data: Vec<u8>,
        share_allocation: ShareAllocation,
    ) -> Result<Self, QuorumError> {
        Self::create_with(
            creator,
            member_ids,
            policy,
            encrypted_data,
            share_allocation,
            RecordParts::default(),
        )
    }

    /// Construct a record with caller-supplied parts; supplied checksum and
    /// signature are verified, not trusted.
    pub fn create_with(
        creator: &Member,
        member_ids: Vec<MemberId>,
        policy: QuorumPolicy,
        encrypted_data: Vec<u8>,
        share_allocation: ShareAllocation,
        parts: RecordParts,
    ) -> Result<Self, QuorumError> {
        if member_ids.len() < 2 {
            return Err(QuorumError::Validation(format!(
                "must share with at least 2 members, got {}",
                member_ids.len()
            )));
        }
        for (i, member_id) in member_ids.iter().enumerate() {
            if member_ids[..i].contains(member_id) {
                return Err(QuorumError::Validation(format!(
                    "duplicate member id {member_id}"
                )));
            }
        }
        if let QuorumPolicy::Threshold(threshold) = policy {
            if threshold < 2 {
                return Err(QuorumError::Validation(format!(
                    "shares required must be at least 2, got {threshold}"
                )));
            }
            if threshold > member_ids.len() {
                return Err(QuorumError::Validation(format!(
                    "shares required {threshold} exceeds member count {}",
                    member_ids.len()
                )));
            }
        }
        for member_id in share_allocation.member_ids() {
            if !member_ids.contains(member_id) {
                return Err(QuorumError::UnknownMember {
                    member_id: member_id.to_string(),
                });
            }
        }

        let computed = checksum::checksum(&encrypted_data);
        if let Some(supplied) = &parts.checksum {
            if !checksum::verify(&encrypted_data, supplied) {
                return Err(QuorumError::ChecksumMismatch {
                    expected: hex::encode(supplied),
                    actual: hex::encode(computed),
                });
            }
        }

        let signature = match parts.signature {
            Some(signature) => signature,
            None => creator.sign(&computed)?,
        };
        if let Err(err) = creator.verify_signature(&computed, &signature) {
            warn!(creator = %creator.id(), "record signature rejected");
            return Err(err);
        }

        // one clock read shared by both timestamps
        let now = Utc::now();
        Ok(Self {
            id: parts.id.unwrap_or_else(Uuid::new_v4),
            created_by: creator.id(),
            member_ids,
            policy,
            encrypted_data,
            checksum: computed,
            signature,
            share_allocation,
            date_created: parts.date_created.unwrap_or(now),
            date_updated: parts.date_updated.unwrap_or(now),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_by(&self) -> MemberId {
        self.created_by
    }

    pub fn member_ids(&self) -> &[MemberId] {
        &self.member_ids
    }

    pub fn policy(&self) -> QuorumPolicy {
        self.policy
    }

    pub fn encrypted_data(&self) -> &[u8] {
        &self.encrypted_data
    }

    pub fn checksum(&self) -> &[u8; CHECKSUM_BYTES] {
        &self.checksum
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn share_allocation(&self) -> &ShareAllocation {
        &self.share_allocation
    }

    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    pub fn date_updated(&self) -> DateTime<Utc> {
        self.date_updated
    }

    pub fn to_wire(&self) -> QuorumDataRecordWire {
        QuorumDataRecordWire {
            id: self.id.to_string(),
            created_by: self.created_by.to_string(),
            member_ids: self.member_ids.iter().map(MemberId::to_string).collect(),
            shares_required: self.policy.to_wire(),
            share_allocation: self.share_allocation.to_entries(),
            encrypted_data: hex::encode(&self.encrypted_data),
            checksum: hex::encode(self.checksum),
            signature: hex::encode(&self.signature),
            date_created: self.date_created,
            date_updated: self.date_updated,
        }
    }

    pub fn to_json(&self) -> Result<String, QuorumError> {
        Ok(serde_json::to_string(&self.to_wire())?)
    }

    /// Rebuild a record from its wire form, re-validating everything and
    /// resolving the creator through the directory.
    pub fn from_wire(
        wire: QuorumDataRecordWire,
        directory: &dyn MemberDirectory,
    ) -> Result<Self, QuorumError> {
        let id = Uuid::parse_str(&wire.id)
            .map_err(|e| QuorumError::Validation(format!("invalid record id {:?}: {e}", wire.id)))?;
        let created_by: MemberId = wire.created_by.parse()?;
        let creator = directory
            .lookup_member(&created_by)
            .ok_or_else(|| QuorumError::UnknownMember {
                member_id: created_by.to_string(),
            })?;
        if creator.id() != created_by {
            return Err(QuorumError::MemberMismatch {
                expected: created_by.to_string(),
                actual: creator.id().to_string(),
            });
        }

        let member_ids = wire
            .member_ids
            .iter()
            .map(|id| id.parse())
            .collect::<Result<Vec<MemberId>, _>>()?;
        let share_allocation = ShareAllocation::from_entries(&wire.share_allocation)?;
        let encrypted_data = hex::decode(&wire.encrypted_data)
            .map_err(|e| QuorumError::Serde(format!("invalid encrypted data hex: {e}")))?;
        let supplied_checksum = hex::decode(&wire.checksum)
            .map_err(|e| QuorumError::Serde(format!("invalid checksum hex: {e}")))?;
        let signature = hex::decode(&wire.signature)
            .map_err(|e| QuorumError::Serde(format!("invalid signature hex: {e}")))?;

        Self::create_with(
            creator,
            member_ids,
            QuorumPolicy::from_wire(wire.shares_required)?,
            encrypted_data,
            share_allocation,
            RecordParts {
                id: Some(id),
                checksum: Some(supplied_checksum),
                signature: Some(signature),
                date_created: Some(wire.date_created),
                date_updated: Some(wire.date_updated),
            },
        )
    }

    pub fn from_json(
        json: &str,
        directory: &dyn MemberDirectory,
    ) -> Result<Self, QuorumError> {
        Self::from_wire(serde_json::from_str(json)?, directory)
    }
}

/// JSON-serializable wire form of [`QuorumDataRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuorumDataRecordWire {
    pub id: String,
    pub created_by: String,
    pub member_ids: Vec<String>,
    /// Threshold, or -1 for an unrestricted record.
    pub shares_required: i64,
    pub share_allocation: Vec<MemberShareCount>,
    /// hex
    pub encrypted_data: String,
    /// 128 hex chars (SHA3-512)
    pub checksum: String,
    /// hex of the Ed25519 signature over the checksum
    pub signature: String,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}
