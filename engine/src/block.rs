//! Content-addressed immutable block with XOR combination.
//!
//! A block's id is always the checksum of its data, recomputed on
//! construction and never trusted from input. Blocks come in a small set of
//! fixed sizes; two equal-size blocks combine bytewise with XOR into a new
//! block attributed to the combining agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checksum;
use crate::error::QuorumError;
use crate::member::Member;
use crate::registry::MemberDirectory;
use crate::types::MemberId;

/// Supported block sizes in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BlockSize {
    Message = 512,
    Tiny = 1024,
    Small = 4096,
    Medium = 65_536,
    Large = 1_048_576,
}

impl BlockSize {
    pub const ALL: [BlockSize; 5] = [
        BlockSize::Message,
        BlockSize::Tiny,
        BlockSize::Small,
        BlockSize::Medium,
        BlockSize::Large,
    ];

    pub fn length(self) -> usize {
        self as usize
    }

    /// Map a buffer length onto a supported size.
    pub fn for_length(length: usize) -> Result<Self, QuorumError> {
        Self::ALL
            .iter()
            .copied()
            .find(|size| size.length() == length)
            .ok_or(QuorumError::Size { actual: length })
    }
}

/// An immutable byte buffer identified by the checksum of its contents.
#[derive(Debug, Clone)]
pub struct Block {
    /// hex of the SHA3-512 checksum of `data`
    id: String,
    size: BlockSize,
    data: Vec<u8>,
    created_by: MemberId,
    date_created: DateTime<Utc>,
}

impl Block {
    /// Create a block over `data`, which must be exactly one of the
    /// supported sizes. A supplied checksum is compared against the
    /// recomputed id, never trusted.
    pub fn new(
        creator: &Member,
        data: Vec<u8>,
        date_created: Option<DateTime<Utc>>,
        expected_checksum: Option<&str>,
    ) -> Result<Self, QuorumError> {
        let size = BlockSize::for_length(data.len())?;
        let id = hex::encode(checksum::checksum(&data));
        if let Some(expected) = expected_checksum {
            if !expected.eq_ignore_ascii_case(&id) {
                return Err(QuorumError::ChecksumMismatch {
                    expected: expected.to_string(),
                    actual: id,
                });
            }
        }
        Ok(Self {
            id,
            size,
            data,
            created_by: creator.id(),
            date_created: date_created.unwrap_or_else(Utc::now),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn block_size(&self) -> BlockSize {
        self.size
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn created_by(&self) -> MemberId {
        self.created_by
    }

    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    /// XOR-combine two equal-size blocks into a new block owned by `agent`.
    pub fn xor(&self, other: &Block, agent: &Member) -> Result<Block, QuorumError> {
        if self.size != other.size {
            return Err(QuorumError::SizeMismatch {
                left: self.data.len(),
                right: other.data.len(),
            });
        }
        let data: Vec<u8> = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a ^ b)
            .collect();
        Block::new(agent, data, None, None)
    }

    pub fn to_wire(&self) -> BlockWire {
        BlockWire {
            id: self.id.clone(),
            data: hex::encode(&self.data),
            created_by: self.created_by.to_string(),
            date_created: self.date_created,
        }
    }

    pub fn to_json(&self) -> Result<String, QuorumError> {
        Ok(serde_json::to_string(&self.to_wire())?)
    }

    /// Rebuild a block from its wire form. The checksum is re-derived and
    /// compared, and the claimed creator must resolve through the directory
    /// to a member with the same id.
    pub fn from_wire(
        wire: BlockWire,
        directory: &dyn MemberDirectory,
    ) -> Result<Self, QuorumError> {
        let data = hex::decode(&wire.data)
            .map_err(|e| QuorumError::Serde(format!("invalid block data hex: {e}")))?;
        let created_by: MemberId = wire.created_by.parse()?;
        let creator = directory
            .lookup_member(&created_by)
            .ok_or_else(|| QuorumError::MemberMismatch {
                expected: created_by.to_string(),
                actual: "no such member".to_string(),
            })?;
        if creator.id() != created_by {
            return Err(QuorumError::MemberMismatch {
                expected: created_by.to_string(),
                actual: creator.id().to_string(),
            });
        }
        Block::new(creator, data, Some(wire.date_created), Some(&wire.id))
    }

    pub fn from_json(
        json: &str,
        directory: &dyn MemberDirectory,
    ) -> Result<Self, QuorumError> {
        Self::from_wire(serde_json::from_str(json)?, directory)
    }
}

/// JSON-serializable wire form of [`Block`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockWire {
    pub id: String,
    /// hex
    pub data: String,
    pub created_by: String,
    pub date_created: DateTime<Utc>,
}
