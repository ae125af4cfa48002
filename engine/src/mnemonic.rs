//! Mnemonic phrase generation and seed conversion with a built-in check word.
//!
//! This is a non-standard scheme: the BIP-39 English wordlist is the default
//! dictionary, but the appended check word is a transcription-error detector
//! computed over the word indices rather than the BIP-39 checksum. The check
//! word is appended to the phrase and is never part of the seed-convertible
//! word sequence.

use std::collections::HashMap;

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::QuorumError;

/// A validated mnemonic dictionary.
///
/// The dictionary size must be a power of two so every bit group of
/// `bits_per_word` bits maps to a valid word index.
pub struct Wordlist {
    words: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Wordlist {
    /// Build a wordlist from the given words.
    ///
    /// Words must be non-empty and unique, and the word count must be a
    /// power of two of at least 2.
    pub fn new<I, S>(words: I) -> Result<Self, QuorumError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.len() < 2 || !words.len().is_power_of_two() {
            return Err(QuorumError::Validation(format!(
                "dictionary size must be a power of two of at least 2, got {}",
                words.len()
            )));
        }
        let mut positions = HashMap::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            if word.is_empty() {
                return Err(QuorumError::Validation(format!("empty word at index {i}")));
            }
            if positions.insert(word.clone(), i).is_some() {
                return Err(QuorumError::Validation(format!("duplicate word {word:?}")));
            }
        }
        Ok(Self { words, positions })
    }

    /// The BIP-39 English wordlist (2048 words, 11 bits per word).
    pub fn english() -> Self {
        let words = bip39::Language::English.words_by_prefix("");
        Self::new(words.iter().copied()).expect("BIP-39 English wordlist is a valid dictionary")
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of bits needed to represent the highest dictionary index.
    pub fn bits_per_word(&self) -> usize {
        self.words.len().trailing_zeros() as usize
    }

    /// The word at `index`, which must be below the dictionary size.
    pub fn word_at(&self, index: usize) -> &str {
        &self.words[index]
    }

    /// Dictionary index of `word`; unknown words are a mnemonic error.
    pub fn position(&self, word: &str) -> Result<usize, QuorumError> {
        self.positions
            .get(word)
            .copied()
            .ok_or_else(|| QuorumError::MnemonicInvalid(format!("word not found in wordlist: {word:?}")))
    }
}

/// A freshly generated mnemonic: the seed-convertible words plus the check word.
#[derive(Debug, Clone)]
pub struct GeneratedMnemonic {
    pub words: Vec<String>,
    pub phrase: String,
    pub check_word: String,
}

impl GeneratedMnemonic {
    /// The full transportable phrase with the check word appended.
    pub fn phrase_with_check_word(&self) -> String {
        format!("{} {}", self.phrase, self.check_word)
    }
}

/// Generate `word_count` random words plus a check word.
pub fn generate(word_count: usize, wordlist: &Wordlist) -> Result<GeneratedMnemonic, QuorumError> {
    if word_count == 0 {
        return Err(QuorumError::Validation("word count must be at least 1".into()));
    }
    let total_bits = word_count * wordlist.bits_per_word();
    let mut entropy = vec![0u8; total_bits.div_ceil(8)];
    OsRng.fill_bytes(&mut entropy);

    let words = seed_to_phrase(&entropy, word_count, wordlist)?;
    let check_word = generate_check_word(&words, wordlist)?;
    Ok(GeneratedMnemonic {
        phrase: words.join(" "),
        words,
        check_word,
    })
}

/// Compute the check word for a word sequence.
///
/// The check index is `((sum of indices mod size) XOR (xor of indices))
/// mod size`: deterministic and order-sensitive, a transcription-error
/// detector rather than a cryptographic checksum.
pub fn generate_check_word<S: AsRef<str>>(
    words: &[S],
    wordlist: &Wordlist,
) -> Result<String, QuorumError> {
    if words.is_empty() {
        return Err(QuorumError::MnemonicInvalid("empty word sequence".into()));
    }
    let size = wordlist.len() as u64;
    let mut add_acc: u64 = 0;
    let mut xor_acc: u64 = 0;
    for word in words {
        let index = wordlist.position(word.as_ref())? as u64;
        add_acc = add_acc.wrapping_add(index);
        xor_acc ^= index;
    }
    let check_index = (((add_acc % size) ^ xor_acc) % size) as usize;
    Ok(wordlist.word_at(check_index).to_string())
}

/// Validate a phrase whose last word is the claimed check word.
///
/// Returns `Ok(false)` when the check word does not match; unknown words in
/// the body are a [`QuorumError::MnemonicInvalid`] error.
pub fn validate(phrase_with_check_word: &str, wordlist: &Wordlist) -> Result<bool, QuorumError> {
    let mut words: Vec<&str> = phrase_with_check_word.split_whitespace().collect();
    let claimed = words
        .pop()
        .ok_or_else(|| QuorumError::MnemonicInvalid("empty phrase".into()))?;
    if words.is_empty() {
        return Err(QuorumError::MnemonicInvalid(
            "phrase needs at least one word before the check word".into(),
        ));
    }
    let expected = generate_check_word(&words, wordlist)?;
    Ok(expected == claimed)
}

/// Pack a word sequence (without its check word) into raw seed bytes.
///
/// Each word contributes `bits_per_word` bits, MSB-first; the final byte is
/// zero-padded. Exact inverse of [`seed_to_phrase`].
pub fn phrase_to_seed<S: AsRef<str>>(
    words: &[S],
    wordlist: &Wordlist,
) -> Result<Vec<u8>, QuorumError> {
    if words.is_empty() {
        return Err(QuorumError::MnemonicInvalid("empty word sequence".into()));
    }
    let bits_per_word = wordlist.bits_per_word();
    let total_bits = words.len() * bits_per_word;
    let mut seed = vec![0u8; total_bits.div_ceil(8)];
    let mut bit = 0;
    for word in words {
        let index = wordlist.position(word.as_ref())?;
        for shift in (0..bits_per_word).rev() {
            if (index >> shift) & 1 == 1 {
                seed[bit / 8] |= 1 << (7 - bit % 8);
            }
            bit += 1;
        }
    }
    Ok(seed)
}

/// Unpack raw seed bytes into `word_count` words.
///
/// The seed length must be exactly `word_count * bits_per_word` bits rounded
/// up to a byte boundary.
pub fn seed_to_phrase(
    seed: &[u8],
    word_count: usize,
    wordlist: &Wordlist,
) -> Result<Vec<String>, QuorumError> {
    if word_count == 0 {
        return Err(QuorumError::Validation("word count must be at least 1".into()));
    }
    let bits_per_word = wordlist.bits_per_word();
    let total_bits = word_count * bits_per_word;
    let expected_len = total_bits.div_ceil(8);
    if seed.len() != expected_len {
        return Err(QuorumError::MnemonicInvalid(format!(
            "seed must be {expected_len} bytes for {word_count} words, got {}",
            seed.len()
        )));
    }
    let mut words = Vec::with_capacity(word_count);
    for group in 0..word_count {
        let mut index = 0usize;
        for offset in 0..bits_per_word {
            let bit = group * bits_per_word + offset;
            let value = (seed[bit / 8] >> (7 - bit % 8)) & 1;
            index = (index << 1) | value as usize;
        }
        // a power-of-two dictionary guarantees index < size
        words.push(wordlist.word_at(index).to_string());
    }
    Ok(words)
}
