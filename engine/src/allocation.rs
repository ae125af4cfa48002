//! Weighted share allocation across members with a canonical ordering.
//!
//! Members are ordered lexicographically by id and assigned contiguous,
//! non-overlapping share-index ranges. That ordering is the contract the
//! share wrapping/unwrapping paths rely on to know whose shares sit where
//! without any extra metadata.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::QuorumError;
use crate::types::MemberId;

/// A single member's share count, the entry form of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberShareCount {
    pub member_id: MemberId,
    pub shares: usize,
}

/// Parallel-array form of an allocation, sorted by member id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedShareCounts {
    pub member_ids: Vec<MemberId>,
    pub shares: Vec<usize>,
    pub member_count: usize,
    pub total_shares: usize,
}

impl SortedShareCounts {
    pub fn to_entries(&self) -> Vec<MemberShareCount> {
        self.member_ids
            .iter()
            .zip(&self.shares)
            .map(|(&member_id, &shares)| MemberShareCount { member_id, shares })
            .collect()
    }
}

/// A stable mapping from member id to share count.
///
/// Iteration order is the canonical lexicographic member-id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareAllocation {
    counts: BTreeMap<MemberId, usize>,
}

impl ShareAllocation {
    /// Build an allocation for `member_ids`, using the weight supplied for a
    /// member where given and defaulting to one share otherwise.
    pub fn allocate(
        member_ids: &[MemberId],
        weights: Option<&[MemberShareCount]>,
    ) -> Result<Self, QuorumError> {
        if let Some(weights) = weights {
            for weight in weights {
                if !member_ids.contains(&weight.member_id) {
                    return Err(QuorumError::UnknownMember {
                        member_id: weight.member_id.to_string(),
                    });
                }
                if weight.shares < 1 {
                    return Err(QuorumError::Validation(format!(
                        "share weight for member {} must be at least 1, got {}",
                        weight.member_id, weight.shares
                    )));
                }
            }
        }
        let mut counts = BTreeMap::new();
        for &member_id in member_ids {
            let shares = weights
                .and_then(|ws| ws.iter().find(|w| w.member_id == member_id))
                .map(|w| w.shares)
                .unwrap_or(1);
            counts.insert(member_id, shares);
        }
        Ok(Self { counts })
    }

    pub fn from_entries(entries: &[MemberShareCount]) -> Result<Self, QuorumError> {
        let mut counts = BTreeMap::new();
        for entry in entries {
            if entry.shares < 1 {
                return Err(QuorumError::Validation(format!(
                    "share weight for member {} must be at least 1, got {}",
                    entry.member_id, entry.shares
                )));
            }
            if counts.insert(entry.member_id, entry.shares).is_some() {
                return Err(QuorumError::Validation(format!(
                    "duplicate allocation entry for member {}",
                    entry.member_id
                )));
            }
        }
        Ok(Self { counts })
    }

    /// Rebuild the map form from parallel arrays.
    pub fn from_arrays(
        member_ids: &[MemberId],
        shares: &[usize],
    ) -> Result<Self, QuorumError> {
        if member_ids.len() != shares.len() {
            return Err(QuorumError::Validation(format!(
                "member and share arrays differ in length: {} vs {}",
                member_ids.len(),
                shares.len()
            )));
        }
        let entries: Vec<MemberShareCount> = member_ids
            .iter()
            .zip(shares)
            .map(|(&member_id, &shares)| MemberShareCount { member_id, shares })
            .collect();
        Self::from_entries(&entries)
    }

    pub fn member_count(&self) -> usize {
        self.counts.len()
    }

    pub fn total_shares(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn shares_for(&self, member_id: &MemberId) -> Option<usize> {
        self.counts.get(member_id).copied()
    }

    pub fn contains(&self, member_id: &MemberId) -> bool {
        self.counts.contains_key(member_id)
    }

    /// Member ids in canonical order.
    pub fn member_ids(&self) -> impl Iterator<Item = &MemberId> {
        self.counts.keys()
    }

    /// Contiguous, non-overlapping share-index ranges in canonical order.
    pub fn member_ranges(&self) -> Vec<(MemberId, Range<usize>)> {
        let mut ranges = Vec::with_capacity(self.counts.len());
        let mut start = 0;
        for (&member_id, &shares) in &self.counts {
            ranges.push((member_id, start..start + shares));
            start += shares;
        }
        ranges
    }

    /// Parallel-array form, sorted canonically.
    pub fn to_sorted_arrays(&self) -> SortedShareCounts {
        let member_ids: Vec<MemberId> = self.counts.keys().copied().collect();
        let shares: Vec<usize> = self.counts.values().copied().collect();
        let total_shares = shares.iter().sum();
        SortedShareCounts {
            member_count: member_ids.len(),
            member_ids,
            shares,
            total_shares,
        }
    }

    /// Entry-list form, sorted canonically.
    pub fn to_entries(&self) -> Vec<MemberShareCount> {
        self.counts
            .iter()
            .map(|(&member_id, &shares)| MemberShareCount { member_id, shares })
            .collect()
    }
}
