use crate::error::QuorumError;
use crate::mnemonic::{
    Wordlist, generate, generate_check_word, phrase_to_seed, seed_to_phrase, validate,
};

#[test]
fn generated_phrase_validates_for_both_word_counts() {
    let wordlist = Wordlist::english();
    for word_count in [12usize, 24] {
        let mnemonic = generate(word_count, &wordlist).expect("generate failed");
        assert_eq!(mnemonic.words.len(), word_count);
        let full_phrase = mnemonic.phrase_with_check_word();
        assert!(validate(&full_phrase, &wordlist).expect("validate failed"));
    }
}

#[test]
fn check_word_matches_the_index_formula() {
    let wordlist = Wordlist::english();
    // indices 1 and 3: ((1 + 3) % 2048) ^ (1 ^ 3) = 4 ^ 2 = 6
    let words = [wordlist.word_at(1).to_string(), wordlist.word_at(3).to_string()];
    let check = generate_check_word(&words, &wordlist).expect("check word failed");
    assert_eq!(check, wordlist.word_at(6));

    let mutated = [words[0].clone(), wordlist.word_at(2).to_string()];
    let mutated_check = generate_check_word(&mutated, &wordlist).expect("check word failed");
    assert_ne!(mutated_check, check);
}

#[test]
fn mutated_phrase_fails_validation() {
    let wordlist = Wordlist::english();
    let words = [wordlist.word_at(1).to_string(), wordlist.word_at(3).to_string()];
    let check = generate_check_word(&words, &wordlist).expect("check word failed");
    let valid_phrase = format!("{} {} {check}", words[0], words[1]);
    assert!(validate(&valid_phrase, &wordlist).expect("validate failed"));

    let tampered_phrase = format!("{} {} {check}", words[0], wordlist.word_at(2));
    assert!(!validate(&tampered_phrase, &wordlist).expect("validate failed"));
}

#[test]
fn unknown_word_is_rejected() {
    let wordlist = Wordlist::english();
    let err = validate("abandon definitelynotaword abandon", &wordlist).unwrap_err();
    assert!(matches!(err, QuorumError::MnemonicInvalid(_)));
}

#[test]
fn seed_round_trip_preserves_every_word() {
    let wordlist = Wordlist::english();
    for word_count in [12usize, 24] {
        let mnemonic = generate(word_count, &wordlist).expect("generate failed");
        let seed = phrase_to_seed(&mnemonic.words, &wordlist).expect("phrase_to_seed failed");
        assert_eq!(seed.len(), (word_count * 11).div_ceil(8));
        let words = seed_to_phrase(&seed, word_count, &wordlist).expect("seed_to_phrase failed");
        assert_eq!(words, mnemonic.words);
    }
}

#[test]
fn seed_conversion_is_lossless_for_known_indices() {
    let wordlist = Wordlist::english();
    let words: Vec<String> = [0usize, 1, 2047, 1024, 7, 512, 3, 100, 2000, 42, 11, 1999]
        .iter()
        .map(|&i| wordlist.word_at(i).to_string())
        .collect();
    let seed = phrase_to_seed(&words, &wordlist).expect("phrase_to_seed failed");
    let restored = seed_to_phrase(&seed, words.len(), &wordlist).expect("seed_to_phrase failed");
    assert_eq!(restored, words);
}

#[test]
fn seed_length_is_validated() {
    let wordlist = Wordlist::english();
    let err = seed_to_phrase(&[0u8; 3], 12, &wordlist).unwrap_err();
    assert!(matches!(err, QuorumError::MnemonicInvalid(_)));
}

#[test]
fn custom_dictionary_must_be_a_power_of_two() {
    assert!(Wordlist::new(["alpha", "bravo", "charlie"]).is_err());
    let wordlist = Wordlist::new(["alpha", "bravo", "charlie", "delta"]).expect("wordlist failed");
    assert_eq!(wordlist.bits_per_word(), 2);
    let mnemonic = generate(8, &wordlist).expect("generate failed");
    assert!(validate(&mnemonic.phrase_with_check_word(), &wordlist).expect("validate failed"));
}
