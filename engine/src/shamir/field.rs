//! GF(2^bits) arithmetic backing the secret-sharing backend.
//!
//! The field width is variable (3..=20 bits) so the share-id space can grow
//! with the number of shares. Multiplication and division go through log/exp
//! tables generated from a primitive polynomial for the chosen width.

use crate::error::QuorumError;

pub const MIN_BITS: u8 = 3;
pub const MAX_BITS: u8 = 20;

/// Primitive polynomials (sans leading term) for GF(2^bits), indexed by bit
/// width.
const PRIMITIVE_POLYNOMIALS: [u32; (MAX_BITS + 1) as usize] = [
    0, 0, 0, 3, 3, 5, 3, 3, 29, 17, 9, 5, 83, 27, 43, 3, 45, 9, 39, 39, 9,
];

/// Log/exp tables for one field width.
pub struct Field {
    /// 2^bits - 1: both the largest element and the multiplicative group order.
    max: u32,
    logs: Vec<u32>,
    exps: Vec<u32>,
}

impl Field {
    pub fn new(bits: u8) -> Result<Self, QuorumError> {
        if !(MIN_BITS..=MAX_BITS).contains(&bits) {
            return Err(QuorumError::Validation(format!(
                "field width must be between {MIN_BITS} and {MAX_BITS} bits, got {bits}"
            )));
        }
        let size = 1u32 << bits;
        let primitive = PRIMITIVE_POLYNOMIALS[bits as usize];

        let mut logs = vec![0u32; size as usize];
        let mut exps = vec![0u32; size as usize];
        let mut x = 1u32;
        for i in 0..size - 1 {
            exps[i as usize] = x;
            logs[x as usize] = i;
            x <<= 1;
            if x >= size {
                x ^= primitive;
                x &= size - 1;
            }
        }
        Ok(Self {
            max: size - 1,
            logs,
            exps,
        })
    }

    /// Largest usable share id (x-coordinates are 1..=max_shares).
    pub fn max_shares(&self) -> u32 {
        self.max
    }

    /// Bit mask selecting one field element.
    pub fn mask(&self) -> u32 {
        self.max
    }

    fn mul(&self, a: u32, b: u32) -> u32 {
        if a == 0 || b == 0 {
            return 0;
        }
        let log = (self.logs[a as usize] + self.logs[b as usize]) % self.max;
        self.exps[log as usize]
    }

    fn div(&self, a: u32, b: u32) -> Result<u32, QuorumError> {
        if b == 0 {
            return Err(QuorumError::ShareReconstruction(
                "division by zero in share interpolation".into(),
            ));
        }
        if a == 0 {
            return Ok(0);
        }
        let log = (self.max + self.logs[a as usize] - self.logs[b as usize]) % self.max;
        Ok(self.exps[log as usize])
    }

    /// Evaluate a polynomial (coefficients in increasing degree order) at `x`
    /// using Horner's method.
    pub fn eval_poly(&self, coeffs: &[u32], x: u32) -> u32 {
        let mut acc = 0u32;
        for &c in coeffs.iter().rev() {
            acc = self.mul(acc, x) ^ c;
        }
        acc
    }

    /// Interpolate f(0) from `(x, y)` points without reconstructing the
    /// polynomial. The x values must be distinct and non-zero.
    pub fn interpolate_at_zero(&self, points: &[(u32, u32)]) -> Result<u32, QuorumError> {
        let mut acc = 0u32;
        for (i, &(xi, yi)) in points.iter().enumerate() {
            let mut numerator = 1u32;
            let mut denominator = 1u32;
            for (j, &(xj, _)) in points.iter().enumerate() {
                if i == j {
                    continue;
                }
                numerator = self.mul(numerator, xj);
                // subtraction and addition coincide in a binary field
                denominator = self.mul(denominator, xi ^ xj);
            }
            if denominator == 0 {
                return Err(QuorumError::ShareReconstruction(
                    "duplicate share ids supplied".into(),
                ));
            }
            acc ^= self.mul(yi, self.div(numerator, denominator)?);
        }
        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_nonzero_element_has_an_inverse() {
        for bits in [3u8, 8, 11] {
            let field = Field::new(bits).expect("field");
            for a in 1..=field.max_shares() {
                let inv = field.div(1, a).expect("inverse");
                assert_eq!(field.mul(a, inv), 1, "a={a} bits={bits}");
            }
        }
    }

    #[test]
    fn interpolation_recovers_the_constant_term() {
        let field = Field::new(8).expect("field");
        // f(x) = 42 + 7x + 3x^2
        let coeffs = [42, 7, 3];
        let points: Vec<(u32, u32)> = (1..=3)
            .map(|x| (x, field.eval_poly(&coeffs, x)))
            .collect();
        assert_eq!(field.interpolate_at_zero(&points).expect("interpolate"), 42);
    }

    #[test]
    fn rejects_out_of_range_widths() {
        assert!(Field::new(2).is_err());
        assert!(Field::new(21).is_err());
    }
}
