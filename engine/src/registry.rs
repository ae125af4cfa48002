//! Member directory used to resolve record and block creators.

use std::collections::BTreeMap;

use crate::member::Member;
use crate::types::MemberId;

/// External collaborator resolving member ids to members.
///
/// Deserialization paths use this to validate `createdBy` claims; the
/// returned member may be a public-only view.
pub trait MemberDirectory {
    fn lookup_member(&self, id: &MemberId) -> Option<&Member>;
}

/// Simple in-memory registry for tests and embedders.
#[derive(Default)]
pub struct InMemoryMemberRegistry {
    members: BTreeMap<MemberId, Member>,
}

impl InMemoryMemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a member under its own id, replacing any previous entry.
    pub fn register(&mut self, member: Member) -> MemberId {
        let id = member.id();
        self.members.insert(id, member);
        id
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl MemberDirectory for InMemoryMemberRegistry {
    fn lookup_member(&self, id: &MemberId) -> Option<&Member> {
        self.members.get(id)
    }
}
