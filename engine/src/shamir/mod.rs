//! Shamir secret sharing over a variable-width binary field.
//!
//! The field width is a per-call value derived from the total share count;
//! no configuration lives in process-global state, so independent seal
//! operations can run concurrently without interference.
//!
//! Secrets are hex strings. Shares are self-describing strings: one base-36
//! character for the field width, a zero-padded hex share id, then the
//! payload hex. Recombining fewer shares than the original threshold yields
//! a value unrelated to the secret rather than an error here; the sealing
//! layer's authenticated decryption is what detects that case.

mod field;

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::QuorumError;
use field::{Field, MAX_BITS, MIN_BITS};

/// Field-width configuration for one split call, a pure function of the
/// share count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShamirConfig {
    bits: u8,
}

impl ShamirConfig {
    /// Smallest field able to issue `share_count` distinct share ids, with a
    /// floor of 3 bits.
    pub fn for_share_count(share_count: usize) -> Result<Self, QuorumError> {
        if share_count < 2 {
            return Err(QuorumError::Validation(format!(
                "at least two shares are required, got {share_count}"
            )));
        }
        let mut bits = MIN_BITS;
        while ((1usize << bits) - 1) < share_count {
            bits += 1;
            if bits > MAX_BITS {
                return Err(QuorumError::Validation(format!(
                    "share count {share_count} exceeds the largest supported field"
                )));
            }
        }
        Ok(Self { bits })
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn max_shares(&self) -> usize {
        (1usize << self.bits) - 1
    }
}

/// One parsed share: field width, evaluation point, payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShamirShareDetail {
    pub share: String,
    pub bits: u8,
    pub id: u32,
    /// Payload as a hex string.
    pub data: String,
}

impl ShamirShareDetail {
    /// Parse a share string produced by [`split`].
    pub fn from_share(share: &str) -> Result<Self, QuorumError> {
        if !share.is_ascii() || share.len() < 2 {
            return Err(QuorumError::ShareReconstruction(format!(
                "malformed share string {share:?}"
            )));
        }
        let bits_char = share
            .chars()
            .next()
            .ok_or_else(|| QuorumError::ShareReconstruction("empty share string".into()))?;
        let bits = bits_char
            .to_digit(36)
            .ok_or_else(|| {
                QuorumError::ShareReconstruction(format!("invalid field width tag {bits_char:?}"))
            })? as u8;
        if !(MIN_BITS..=MAX_BITS).contains(&bits) {
            return Err(QuorumError::ShareReconstruction(format!(
                "unsupported field width {bits} in share"
            )));
        }
        let id_len = id_hex_len(bits);
        if share.len() <= 1 + id_len {
            return Err(QuorumError::ShareReconstruction(format!(
                "share string too short: {share:?}"
            )));
        }
        let id = u32::from_str_radix(&share[1..1 + id_len], 16).map_err(|_| {
            QuorumError::ShareReconstruction(format!("invalid share id in {share:?}"))
        })?;
        let max_id = (1u32 << bits) - 1;
        if id == 0 || id > max_id {
            return Err(QuorumError::ShareReconstruction(format!(
                "share id {id} out of range 1..={max_id}"
            )));
        }
        let data = &share[1 + id_len..];
        if data.chars().any(|c| !c.is_ascii_hexdigit()) {
            return Err(QuorumError::ShareReconstruction(format!(
                "share payload is not hex: {share:?}"
            )));
        }
        Ok(Self {
            share: share.to_string(),
            bits,
            id,
            data: data.to_string(),
        })
    }

    pub fn data_as_bytes(&self) -> Result<Vec<u8>, QuorumError> {
        let padded = if self.data.len() % 2 == 1 {
            format!("0{}", self.data)
        } else {
            self.data.clone()
        };
        hex::decode(&padded)
            .map_err(|e| QuorumError::ShareReconstruction(format!("invalid share payload: {e}")))
    }
}

/// Hex digits needed to encode the largest share id of a `bits`-wide field.
fn id_hex_len(bits: u8) -> usize {
    format!("{:x}", (1u32 << bits) - 1).len()
}

fn format_share(bits: u8, id: u32, data_hex: &str) -> String {
    let tag = char::from_digit(u32::from(bits), 36)
        .expect("field width below 36")
        .to_ascii_uppercase();
    format!("{tag}{id:0width$x}{data_hex}", width = id_hex_len(bits))
}

fn hex_to_bits(hex: &str) -> Result<Vec<u8>, QuorumError> {
    let mut bits = Vec::with_capacity(hex.len() * 4);
    for c in hex.chars() {
        let value = c.to_digit(16).ok_or_else(|| {
            QuorumError::Validation(format!("invalid hex digit {c:?} in secret"))
        })?;
        for shift in (0..4).rev() {
            bits.push(((value >> shift) & 1) as u8);
        }
    }
    Ok(bits)
}

fn bits_to_hex(bits: &[u8]) -> String {
    debug_assert_eq!(bits.len() % 4, 0);
    bits.chunks(4)
        .map(|chunk| {
            let value = chunk.iter().fold(0u32, |acc, &b| (acc << 1) | u32::from(b));
            char::from_digit(value, 16).expect("nibble below 16")
        })
        .collect()
}

/// Chunk a bit string into `width`-wide integers, starting from the right.
/// Index 0 holds the least-significant chunk; the leftmost chunk may be
/// partial.
fn chunk_bits_from_right(bits: &[u8], width: usize) -> Vec<u32> {
    let mut chunks = Vec::with_capacity(bits.len().div_ceil(width));
    let mut end = bits.len();
    while end > 0 {
        let start = end.saturating_sub(width);
        let mut value = 0u32;
        for &bit in &bits[start..end] {
            value = (value << 1) | u32::from(bit);
        }
        chunks.push(value);
        end = start;
    }
    chunks
}

fn push_value_bits(bits: &mut Vec<u8>, value: u32, width: usize) {
    for shift in (0..width).rev() {
        bits.push(((value >> shift) & 1) as u8);
    }
}

/// Split `secret_hex` into `share_count` shares of which `threshold` are
/// required to reconstruct it.
pub fn split(
    secret_hex: &str,
    share_count: usize,
    threshold: usize,
    config: ShamirConfig,
) -> Result<Vec<String>, QuorumError> {
    if secret_hex.is_empty() {
        return Err(QuorumError::Validation("secret must not be empty".into()));
    }
    if share_count < 2 || share_count > config.max_shares() {
        return Err(QuorumError::Validation(format!(
            "share count must be between 2 and {}, got {share_count}",
            config.max_shares()
        )));
    }
    if threshold < 2 || threshold > share_count {
        return Err(QuorumError::Validation(format!(
            "threshold must be between 2 and {share_count}, got {threshold}"
        )));
    }
    let field = Field::new(config.bits)?;
    let width = config.bits as usize;

    // sentinel bit preserves leading zeros across the bit/int boundary
    let mut secret_bits = vec![1u8];
    secret_bits.extend(hex_to_bits(secret_hex)?);
    let chunks = chunk_bits_from_right(&secret_bits, width);

    let mut rng = OsRng;
    let mut share_values = vec![Vec::with_capacity(chunks.len()); share_count];
    for &chunk in &chunks {
        let mut coeffs = Vec::with_capacity(threshold);
        coeffs.push(chunk);
        for _ in 1..threshold {
            coeffs.push(rng.next_u32() & field.mask());
        }
        for (index, values) in share_values.iter_mut().enumerate() {
            values.push(field.eval_poly(&coeffs, index as u32 + 1));
        }
    }

    let mut shares = Vec::with_capacity(share_count);
    for (index, values) in share_values.iter().enumerate() {
        let mut data_bits = Vec::with_capacity(values.len() * width + 3);
        // left-pad to a hex boundary; chunking from the right makes the
        // padding land in a harmless leading zero chunk
        let pad = (4 - (values.len() * width) % 4) % 4;
        data_bits.resize(pad, 0);
        for &value in values.iter().rev() {
            push_value_bits(&mut data_bits, value, width);
        }
        shares.push(format_share(
            config.bits,
            index as u32 + 1,
            &bits_to_hex(&data_bits),
        ));
    }
    Ok(shares)
}

/// Recombine shares produced by [`split`].
///
/// All supplied shares are interpolated; the field width is read from the
/// shares themselves and must agree across the set.
pub fn combine(shares: &[String]) -> Result<String, QuorumError> {
    if shares.is_empty() {
        return Err(QuorumError::ShareReconstruction("no shares supplied".into()));
    }
    let details: Vec<ShamirShareDetail> = shares
        .iter()
        .map(|s| ShamirShareDetail::from_share(s))
        .collect::<Result<_, _>>()?;

    let bits = details[0].bits;
    if details.iter().any(|d| d.bits != bits) {
        return Err(QuorumError::ShareReconstruction(
            "shares use mixed field widths".into(),
        ));
    }
    for (i, detail) in details.iter().enumerate() {
        if details[..i].iter().any(|d| d.id == detail.id) {
            return Err(QuorumError::ShareReconstruction(format!(
                "duplicate share id {}",
                detail.id
            )));
        }
    }

    let field = Field::new(bits)?;
    let width = bits as usize;
    let value_sets: Vec<Vec<u32>> = details
        .iter()
        .map(|d| Ok(chunk_bits_from_right(&hex_to_bits(&d.data)?, width)))
        .collect::<Result<_, QuorumError>>()?;
    let chunk_count = value_sets[0].len();
    if value_sets.iter().any(|v| v.len() != chunk_count) {
        return Err(QuorumError::ShareReconstruction(
            "shares have inconsistent payload lengths".into(),
        ));
    }

    let mut secret_chunks = Vec::with_capacity(chunk_count);
    for position in 0..chunk_count {
        let points: Vec<(u32, u32)> = details
            .iter()
            .zip(&value_sets)
            .map(|(detail, values)| (detail.id, values[position]))
            .collect();
        secret_chunks.push(field.interpolate_at_zero(&points)?);
    }

    let mut bits_out = Vec::with_capacity(chunk_count * width);
    for &value in secret_chunks.iter().rev() {
        push_value_bits(&mut bits_out, value, width);
    }
    let sentinel = bits_out
        .iter()
        .position(|&b| b == 1)
        .ok_or_else(|| QuorumError::ShareReconstruction("recombined secret is empty".into()))?;
    let payload = &bits_out[sentinel + 1..];
    // a correct reconstruction is already nibble aligned; a below-threshold
    // one lands anywhere, and must still come back as (wrong) hex so the
    // authenticated decryption upstream is what rejects it
    let mut aligned = vec![0u8; (4 - payload.len() % 4) % 4];
    aligned.extend_from_slice(payload);
    Ok(bits_to_hex(&aligned))
}
