use crate::allocation::{MemberShareCount, ShareAllocation};
use crate::error::QuorumError;
use crate::types::MemberId;

fn member_ids(count: usize) -> Vec<MemberId> {
    (0..count).map(|_| MemberId::random()).collect()
}

#[test]
fn defaults_to_one_share_per_member() {
    let ids = member_ids(4);
    let allocation = ShareAllocation::allocate(&ids, None).expect("allocate failed");
    assert_eq!(allocation.member_count(), 4);
    assert_eq!(allocation.total_shares(), 4);
    for id in &ids {
        assert_eq!(allocation.shares_for(id), Some(1));
    }
}

#[test]
fn partial_weights_fill_in_defaults() {
    let ids = member_ids(4);
    let weights = [
        MemberShareCount { member_id: ids[1], shares: 2 },
        MemberShareCount { member_id: ids[2], shares: 3 },
    ];
    let allocation = ShareAllocation::allocate(&ids, Some(&weights)).expect("allocate failed");
    assert_eq!(allocation.shares_for(&ids[0]), Some(1));
    assert_eq!(allocation.shares_for(&ids[1]), Some(2));
    assert_eq!(allocation.shares_for(&ids[2]), Some(3));
    assert_eq!(allocation.shares_for(&ids[3]), Some(1));
    assert_eq!(allocation.total_shares(), 7);
}

#[test]
fn unknown_member_in_weights_is_rejected() {
    let ids = member_ids(3);
    let stranger = MemberId::random();
    let weights = [MemberShareCount { member_id: stranger, shares: 2 }];
    assert!(matches!(
        ShareAllocation::allocate(&ids, Some(&weights)),
        Err(QuorumError::UnknownMember { .. })
    ));
}

#[test]
fn zero_weight_is_rejected() {
    let ids = member_ids(3);
    let weights = [MemberShareCount { member_id: ids[0], shares: 0 }];
    assert!(matches!(
        ShareAllocation::allocate(&ids, Some(&weights)),
        Err(QuorumError::Validation(_))
    ));
}

#[test]
fn conversions_preserve_pairs_and_canonical_order() {
    let ids = member_ids(4);
    let weights = [
        MemberShareCount { member_id: ids[1], shares: 2 },
        MemberShareCount { member_id: ids[2], shares: 3 },
    ];
    let allocation = ShareAllocation::allocate(&ids, Some(&weights)).expect("allocate failed");

    let arrays = allocation.to_sorted_arrays();
    assert_eq!(arrays.member_count, 4);
    assert_eq!(arrays.total_shares, 7);
    let mut sorted = arrays.member_ids.clone();
    sorted.sort();
    assert_eq!(arrays.member_ids, sorted, "array form must be canonically ordered");

    let from_arrays =
        ShareAllocation::from_arrays(&arrays.member_ids, &arrays.shares).expect("from_arrays");
    assert_eq!(from_arrays, allocation);

    let entries = from_arrays.to_entries();
    assert_eq!(entries, arrays.to_entries());
    let from_entries = ShareAllocation::from_entries(&entries).expect("from_entries");
    assert_eq!(from_entries, allocation);
}

#[test]
fn ranges_are_contiguous_and_cover_every_share() {
    let ids = member_ids(3);
    let weights = [
        MemberShareCount { member_id: ids[0], shares: 2 },
        MemberShareCount { member_id: ids[2], shares: 4 },
    ];
    let allocation = ShareAllocation::allocate(&ids, Some(&weights)).expect("allocate failed");
    let ranges = allocation.member_ranges();
    assert_eq!(ranges.len(), 3);

    let mut next_start = 0;
    for (member_id, range) in &ranges {
        assert_eq!(range.start, next_start, "ranges must be contiguous");
        assert_eq!(range.len(), allocation.shares_for(member_id).expect("member missing"));
        next_start = range.end;
    }
    assert_eq!(next_start, allocation.total_shares());
}

#[test]
fn duplicate_entries_are_rejected() {
    let id = MemberId::random();
    let entries = [
        MemberShareCount { member_id: id, shares: 1 },
        MemberShareCount { member_id: id, shares: 2 },
    ];
    assert!(ShareAllocation::from_entries(&entries).is_err());
}
