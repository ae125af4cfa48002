//! Quorum seal/unseal: symmetric encryption, Shamir split, and per-member
//! share wrapping.
//!
//! `seal` encrypts a document once under a fresh symmetric key, splits the
//! key across the member set's weighted shares, and binds everything into a
//! [`QuorumDataRecord`]. `unseal` is the inverse. Per-member wrapping and
//! unwrapping walk the allocation's canonical ranges, so a flat share list
//! and the member set are all the state that ever travels.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::allocation::{MemberShareCount, ShareAllocation};
use crate::crypto::hybrid::{self, SealedPayload};
use crate::crypto::symmetric;
use crate::error::QuorumError;
use crate::member::Member;
use crate::member::keys::KeyUse;
use crate::record::{QuorumDataRecord, QuorumPolicy};
use crate::shamir::{self, ShamirConfig};
use crate::types::MemberId;

/// A share wrapped for exactly one member, as transportable hex.
pub type EncryptedShare = String;

/// Result of sealing a document: plaintext key shares and the sealed record.
pub struct SealResult {
    pub key_shares: Vec<String>,
    pub record: QuorumDataRecord,
}

/// Seal `data` for the given member set.
///
/// `threshold` defaults to the member count; weights default to one share
/// per member.
pub fn seal<T: Serialize>(
    agent: &Member,
    data: &T,
    member_ids: &[MemberId],
    weights: Option<&[MemberShareCount]>,
    threshold: Option<usize>,
) -> Result<SealResult, QuorumError> {
    if member_ids.len() < 2 {
        return Err(QuorumError::Validation(format!(
            "at least two members are required, got {}",
            member_ids.len()
        )));
    }
    let threshold = threshold.unwrap_or(member_ids.len());
    if threshold < 2 {
        return Err(QuorumError::Validation(format!(
            "at least two shares are required to unseal, got threshold {threshold}"
        )));
    }
    if threshold > member_ids.len() {
        return Err(QuorumError::Validation(format!(
            "threshold {threshold} cannot exceed the number of members {}",
            member_ids.len()
        )));
    }

    let allocation = ShareAllocation::allocate(member_ids, weights)?;
    let total_shares = allocation.total_shares();

    let plaintext = serde_json::to_vec(data)?;
    let sealed = symmetric::encrypt(&plaintext)?;

    // the field width is a pure function of the share count for this call
    let config = ShamirConfig::for_share_count(total_shares)?;
    let key_shares = shamir::split(&hex::encode(&sealed.key[..]), total_shares, threshold, config)?;

    let record = QuorumDataRecord::create(
        agent,
        member_ids.to_vec(),
        QuorumPolicy::Threshold(threshold),
        sealed.encrypted_data,
        allocation,
    )?;
    info!(
        record_id = %record.id(),
        members = member_ids.len(),
        total_shares,
        threshold,
        "sealed document"
    );
    Ok(SealResult { key_shares, record })
}

/// Recombine shares and decrypt the sealed document.
///
/// Wrong or insufficient shares recombine into a key that fails
/// authenticated decryption; the caller sees a decryption error, never
/// garbage output.
pub fn unseal<T: DeserializeOwned>(
    shares: &[String],
    encrypted_data: &[u8],
) -> Result<T, QuorumError> {
    let key_hex = shamir::combine(shares)?;
    let key = Zeroizing::new(
        hex::decode(&key_hex)
            .map_err(|_| QuorumError::Decryption("recombined key is not valid hex".into()))?,
    );
    let plaintext = symmetric::decrypt(encrypted_data, &key)?;
    debug!(shares = shares.len(), "document unsealed");
    Ok(serde_json::from_slice(&plaintext)?)
}

/// Wrap each member's contiguous share range under that member's encryption
/// public key.
pub fn encrypt_shares_for_members(
    shares: &[String],
    members: &[Member],
    weights: Option<&[MemberShareCount]>,
) -> Result<BTreeMap<MemberId, Vec<EncryptedShare>>, QuorumError> {
    let member_ids: Vec<MemberId> = members.iter().map(Member::id).collect();
    let allocation = ShareAllocation::allocate(&member_ids, weights)?;
    if shares.len() != allocation.total_shares() {
        return Err(QuorumError::Validation(format!(
            "expected {} shares for this allocation, got {}",
            allocation.total_shares(),
            shares.len()
        )));
    }

    let mut wrapped_by_member = BTreeMap::new();
    for (member_id, range) in allocation.member_ranges() {
        let member = find_member(members, &member_id)?;
        let public_key = member.keys().encryption.public_key();
        let mut wrapped = Vec::with_capacity(range.len());
        for share in &shares[range] {
            wrapped.push(hybrid::seal(share.as_bytes(), public_key)?.to_hex()?);
        }
        wrapped_by_member.insert(member_id, wrapped);
    }
    Ok(wrapped_by_member)
}

/// Exact inverse of [`encrypt_shares_for_members`]: unwrap every member's
/// range with their private encryption key and reassemble the ordered list.
pub fn decrypt_shares_for_members(
    encrypted_shares: &BTreeMap<MemberId, Vec<EncryptedShare>>,
    members: &[Member],
    weights: Option<&[MemberShareCount]>,
) -> Result<Vec<String>, QuorumError> {
    let member_ids: Vec<MemberId> = members.iter().map(Member::id).collect();
    let allocation = ShareAllocation::allocate(&member_ids, weights)?;

    let mut shares = Vec::with_capacity(allocation.total_shares());
    for (member_id, range) in allocation.member_ranges() {
        let member = find_member(members, &member_id)?;
        let wrapped = encrypted_shares
            .get(&member_id)
            .ok_or_else(|| QuorumError::Validation(format!(
                "missing encrypted shares for member {member_id}"
            )))?;
        if wrapped.len() != range.len() {
            return Err(QuorumError::Validation(format!(
                "member {member_id} holds {} shares but is allocated {}",
                wrapped.len(),
                range.len()
            )));
        }
        let private_key = member.private_key_for_role(KeyUse::Encryption)?;
        for blob in wrapped {
            let sealed = SealedPayload::from_hex(blob)?;
            let share = hybrid::unseal(&sealed, &private_key)?;
            shares.push(String::from_utf8(share).map_err(|_| {
                QuorumError::Decryption("decrypted share is not valid UTF-8".into())
            })?);
        }
    }
    Ok(shares)
}

/// Flatten the per-member map into one transportable ordered list.
pub fn combine_encrypted_shares(
    by_member: &BTreeMap<MemberId, Vec<EncryptedShare>>,
) -> Vec<EncryptedShare> {
    by_member.values().flatten().cloned().collect()
}

/// Restore the per-member map from a flat list using the allocation ranges.
pub fn split_encrypted_shares(
    flat: &[EncryptedShare],
    allocation: &ShareAllocation,
) -> Result<BTreeMap<MemberId, Vec<EncryptedShare>>, QuorumError> {
    if flat.len() != allocation.total_shares() {
        return Err(QuorumError::Validation(format!(
            "expected {} encrypted shares for this allocation, got {}",
            allocation.total_shares(),
            flat.len()
        )));
    }
    let mut by_member = BTreeMap::new();
    for (member_id, range) in allocation.member_ranges() {
        by_member.insert(member_id, flat[range].to_vec());
    }
    Ok(by_member)
}

fn find_member<'a>(members: &'a [Member], member_id: &MemberId) -> Result<&'a Member, QuorumError> {
    members
        .iter()
        .find(|m| m.id() == *member_id)
        .ok_or_else(|| QuorumError::UnknownMember {
            member_id: member_id.to_string(),
        })
}
