use crate::error::QuorumError;
use crate::shamir::{ShamirConfig, ShamirShareDetail, combine, split};

const SECRET_HEX: &str = "00119c12fe7a4b6d84c2ffe0d4a7b391e2c5a1788899aabbccddeeff00112233";

#[test]
fn field_width_grows_with_share_count() {
    assert_eq!(ShamirConfig::for_share_count(2).expect("config").bits(), 3);
    assert_eq!(ShamirConfig::for_share_count(7).expect("config").bits(), 3);
    assert_eq!(ShamirConfig::for_share_count(8).expect("config").bits(), 4);
    assert_eq!(ShamirConfig::for_share_count(255).expect("config").bits(), 8);
    assert_eq!(ShamirConfig::for_share_count(256).expect("config").bits(), 9);
    assert!(ShamirConfig::for_share_count(1).is_err());
    assert!(ShamirConfig::for_share_count(2_000_000).is_err());
}

#[test]
fn any_threshold_subset_reconstructs_the_secret() {
    let config = ShamirConfig::for_share_count(5).expect("config");
    let shares = split(SECRET_HEX, 5, 3, config).expect("split failed");
    assert_eq!(shares.len(), 5);

    let subsets: [[usize; 3]; 4] = [[0, 1, 2], [0, 2, 4], [1, 3, 4], [2, 3, 4]];
    for subset in subsets {
        let picked: Vec<String> = subset.iter().map(|&i| shares[i].clone()).collect();
        assert_eq!(combine(&picked).expect("combine failed"), SECRET_HEX);
    }
    assert_eq!(combine(&shares).expect("combine failed"), SECRET_HEX);
}

#[test]
fn below_threshold_yields_an_unrelated_value() {
    let config = ShamirConfig::for_share_count(5).expect("config");
    let shares = split(SECRET_HEX, 5, 3, config).expect("split failed");
    let recombined = combine(&shares[..2]).expect("combine failed");
    assert_ne!(recombined, SECRET_HEX);
}

#[test]
fn duplicate_share_ids_are_rejected() {
    let config = ShamirConfig::for_share_count(5).expect("config");
    let shares = split(SECRET_HEX, 5, 3, config).expect("split failed");
    let duplicated = vec![shares[0].clone(), shares[0].clone(), shares[1].clone()];
    assert!(matches!(
        combine(&duplicated),
        Err(QuorumError::ShareReconstruction(_))
    ));
}

#[test]
fn mixed_field_widths_are_rejected() {
    let narrow = split(SECRET_HEX, 5, 3, ShamirConfig::for_share_count(5).expect("config"))
        .expect("split failed");
    let wide = split(SECRET_HEX, 20, 3, ShamirConfig::for_share_count(20).expect("config"))
        .expect("split failed");
    let mixed = vec![narrow[0].clone(), wide[1].clone(), wide[2].clone()];
    assert!(matches!(
        combine(&mixed),
        Err(QuorumError::ShareReconstruction(_))
    ));
}

#[test]
fn malformed_share_strings_are_rejected() {
    assert!(ShamirShareDetail::from_share("").is_err());
    assert!(ShamirShareDetail::from_share("Z1abc").is_err());
    assert!(ShamirShareDetail::from_share("30abc").is_err()); // id zero
    assert!(ShamirShareDetail::from_share("31xyz").is_err()); // non-hex payload
    assert!(matches!(
        combine(&["not a share".to_string()]),
        Err(QuorumError::ShareReconstruction(_))
    ));
}

#[test]
fn share_detail_exposes_width_id_and_payload() {
    let config = ShamirConfig::for_share_count(5).expect("config");
    let shares = split(SECRET_HEX, 5, 3, config).expect("split failed");
    for (index, share) in shares.iter().enumerate() {
        let detail = ShamirShareDetail::from_share(share).expect("parse failed");
        assert_eq!(detail.bits, 3);
        assert_eq!(detail.id, index as u32 + 1);
        assert_eq!(&detail.share, share);
        assert!(!detail.data.is_empty());
        assert!(!detail.data_as_bytes().expect("payload decode failed").is_empty());
    }
}

#[test]
fn leading_zeros_in_the_secret_survive_the_round_trip() {
    let secret = "000000000000000000000000000000ff";
    let config = ShamirConfig::for_share_count(3).expect("config");
    let shares = split(secret, 3, 2, config).expect("split failed");
    assert_eq!(combine(&shares[..2]).expect("combine failed"), secret);
}

#[test]
fn split_validates_its_arguments() {
    let config = ShamirConfig::for_share_count(5).expect("config");
    assert!(split("", 5, 3, config).is_err());
    assert!(split(SECRET_HEX, 1, 1, config).is_err());
    assert!(split(SECRET_HEX, 5, 6, config).is_err());
    assert!(split(SECRET_HEX, 5, 1, config).is_err());
    // 5-share config tops out at 7 ids
    assert!(split(SECRET_HEX, 8, 3, config).is_err());
}
