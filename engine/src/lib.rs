//! Quorum threshold-encryption engine.
//!
//! A document is encrypted once under a fresh symmetric key, the key is
//! split with Shamir's secret sharing across a weighted member set, and each
//! member's shares are wrapped under that member's encryption public key.
//! Any threshold subset of members can cooperate to recombine the key and
//! recover the document; below threshold, authenticated decryption fails
//! closed.

pub mod allocation;
pub mod block;
pub mod checksum;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod member;
pub mod mnemonic;
pub mod record;
pub mod registry;
pub mod sealing;
pub mod shamir;
pub mod types;
pub mod vault;

pub use allocation::{MemberShareCount, ShareAllocation, SortedShareCounts};
pub use block::{Block, BlockSize, BlockWire};
pub use error::QuorumError;
pub use member::keys::{KeyType, KeyUse, MemberKeySet, StoredMemberKey};
pub use member::{Member, MemberWire, NewMember};
pub use record::{QuorumDataRecord, QuorumDataRecordWire, QuorumPolicy};
pub use registry::{InMemoryMemberRegistry, MemberDirectory};
pub use sealing::{SealResult, seal, unseal};
pub use shamir::{ShamirConfig, ShamirShareDetail};
pub use types::MemberId;
pub use vault::MemberKeyVault;

#[cfg(test)]
mod tests {
    mod allocation_tests;
    mod block_tests;
    mod member_tests;
    mod mnemonic_tests;
    mod record_tests;
    mod sealing_flow;
    mod shamir_tests;
    mod vault_tests;
}
