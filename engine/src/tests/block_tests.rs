use rand::RngCore;
use rand::rngs::OsRng;

use crate::block::{Block, BlockSize};
use crate::checksum;
use crate::error::QuorumError;
use crate::member::Member;
use crate::registry::InMemoryMemberRegistry;

fn member(name: &str) -> Member {
    Member::create(name, &format!("{name}@example.com"), None)
        .expect("member creation failed")
        .member
}

fn random_data(size: BlockSize) -> Vec<u8> {
    let mut data = vec![0u8; size.length()];
    OsRng.fill_bytes(&mut data);
    data
}

#[test]
fn block_id_is_the_checksum_of_its_data() {
    let alice = member("alice");
    let data = random_data(BlockSize::Message);
    let expected_id = hex::encode(checksum::checksum(&data));

    let block = Block::new(&alice, data.clone(), None, None).expect("block creation failed");
    assert_eq!(block.id(), expected_id);
    assert_eq!(block.data(), &data[..]);
    assert_eq!(block.block_size(), BlockSize::Message);
    assert_eq!(block.created_by(), alice.id());
}

#[test]
fn unsupported_lengths_are_rejected() {
    let alice = member("alice");
    assert!(matches!(
        Block::new(&alice, Vec::new(), None, None),
        Err(QuorumError::Size { actual: 0 })
    ));
    assert!(matches!(
        Block::new(&alice, vec![0u8; 513], None, None),
        Err(QuorumError::Size { actual: 513 })
    ));
    assert!(matches!(
        Block::new(&alice, vec![0u8; 4095], None, None),
        Err(QuorumError::Size { actual: 4095 })
    ));
}

#[test]
fn supplied_checksum_must_match() {
    let alice = member("alice");
    let data = random_data(BlockSize::Message);
    let wrong = hex::encode(checksum::checksum(b"other data"));
    assert!(matches!(
        Block::new(&alice, data, None, Some(&wrong)),
        Err(QuorumError::ChecksumMismatch { .. })
    ));
}

#[test]
fn xor_is_an_involution() {
    let alice = member("alice");
    let bob = member("bob");
    let a = Block::new(&alice, random_data(BlockSize::Tiny), None, None).expect("block a");
    let b = Block::new(&bob, random_data(BlockSize::Tiny), None, None).expect("block b");

    let combined = a.xor(&b, &alice).expect("xor failed");
    assert_eq!(combined.created_by(), alice.id());
    let restored = combined.xor(&b, &bob).expect("xor failed");
    assert_eq!(restored.data(), a.data());
    assert_eq!(restored.id(), a.id());
}

#[test]
fn xor_requires_equal_sizes() {
    let alice = member("alice");
    let small = Block::new(&alice, random_data(BlockSize::Message), None, None).expect("block");
    let large = Block::new(&alice, random_data(BlockSize::Tiny), None, None).expect("block");
    assert!(matches!(
        small.xor(&large, &alice),
        Err(QuorumError::SizeMismatch { left: 512, right: 1024 })
    ));
}

#[test]
fn wire_round_trip_re_derives_the_checksum() {
    let alice = member("alice");
    let block = Block::new(&alice, random_data(BlockSize::Message), None, None).expect("block");

    let mut registry = InMemoryMemberRegistry::new();
    registry.register(alice.public_view());

    let json = block.to_json().expect("serialize failed");
    let restored = Block::from_json(&json, &registry).expect("deserialize failed");
    assert_eq!(restored.id(), block.id());
    assert_eq!(restored.data(), block.data());
    assert_eq!(restored.created_by(), block.created_by());
    assert_eq!(restored.date_created(), block.date_created());
}

#[test]
fn tampered_wire_data_is_rejected() {
    let alice = member("alice");
    let block = Block::new(&alice, random_data(BlockSize::Message), None, None).expect("block");

    let mut registry = InMemoryMemberRegistry::new();
    registry.register(alice.public_view());

    let mut wire = block.to_wire();
    wire.data = hex::encode(random_data(BlockSize::Message));
    assert!(matches!(
        Block::from_wire(wire, &registry),
        Err(QuorumError::ChecksumMismatch { .. })
    ));
}

#[test]
fn unresolvable_creator_is_a_member_mismatch() {
    let alice = member("alice");
    let block = Block::new(&alice, random_data(BlockSize::Message), None, None).expect("block");

    let empty_registry = InMemoryMemberRegistry::new();
    let json = block.to_json().expect("serialize failed");
    assert!(matches!(
        Block::from_json(&json, &empty_registry),
        Err(QuorumError::MemberMismatch { .. })
    ));
}
