//! Chromosome codec: bit-string to integer to real-value conversion and
//! fixed-length normalization.
//!
//! Chromosomes are plain `String`s over the alphabet `{'0', '1'}`, up to 64
//! bits wide. The 64-bit ceiling matters: the credit-scoring chromosome is 34
//! bits, which overflows a 32-bit signed integer for large values.

use tracing::instrument;

/// The widest chromosome the codec can decode without overflow.
pub const MAX_CHROMOSOME_LENGTH: usize = 64;

#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum InvalidChromosomeError {
    #[error("chromosome contains non-binary characters: {0:?}")]
    NonBinary(String),
    #[error("chromosome is wider than {MAX_CHROMOSOME_LENGTH} bits: {0} bits")]
    TooWide(usize),
    #[error("chromosome must be {expected} bits, got {actual}")]
    WrongWidth { expected: usize, actual: usize },
}

#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq))]
pub enum InvalidParameterError {
    #[error("xmax must be greater than xmin, got xmin={xmin}, xmax={xmax}")]
    InvertedBounds { xmin: f64, xmax: f64 },
    #[error("chromosome length must be between 1 and {MAX_CHROMOSOME_LENGTH}, got {0}")]
    LengthOutOfRange(usize),
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
    #[error("max_generations must be at least 1")]
    NoGenerations,
}

/// Parses a bit string as an unsigned base-2 integer.
#[instrument(level = "trace")]
pub fn decode_to_integer(bits: &str) -> Result<u64, InvalidChromosomeError> {
    let clean = bits.trim();

    if clean.is_empty() || !clean.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(InvalidChromosomeError::NonBinary(clean.to_string()));
    }
    if clean.len() > MAX_CHROMOSOME_LENGTH {
        return Err(InvalidChromosomeError::TooWide(clean.len()));
    }

    let mut value = 0u64;
    for byte in clean.bytes() {
        value = (value << 1) | u64::from(byte - b'0');
    }

    Ok(value)
}

/// Maps a decoded integer onto the interval `[xmin, xmax]`:
/// `xmin + value * (xmax - xmin) / (2^length - 1)`.
#[instrument(level = "trace")]
pub fn decode_to_real(
    value: u64,
    xmin: f64,
    xmax: f64,
    length: usize,
) -> Result<f64, InvalidParameterError> {
    if xmax <= xmin {
        return Err(InvalidParameterError::InvertedBounds { xmin, xmax });
    }
    if !(1..=MAX_CHROMOSOME_LENGTH).contains(&length) {
        return Err(InvalidParameterError::LengthOutOfRange(length));
    }

    let max_value = 2f64.powi(length as i32) - 1.0;
    let scale = (xmax - xmin) / max_value;

    Ok(xmin + value as f64 * scale)
}

/// Normalizes a bit string to exactly `length` bits. Longer strings keep
/// their rightmost `length` bits, shorter ones are left-padded with `'0'`.
/// Idempotent. Counts characters rather than bytes, so malformed input
/// flows through to the decoder's validation instead of breaking here.
pub fn normalize(bits: &str, length: usize) -> String {
    let clean = bits.trim();
    let width = clean.chars().count();

    if width > length {
        clean.chars().skip(width - length).collect()
    } else {
        format!("{clean:0>length$}")
    }
}

/// Formats an integer as a `length`-bit string, the inverse of
/// [`decode_to_integer`]. Values wider than `length` keep their low bits.
pub fn to_bits(value: u64, length: usize) -> String {
    normalize(&format!("{value:b}"), length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_decodes_binary_strings() {
        assert_eq!(decode_to_integer("0").unwrap(), 0);
        assert_eq!(decode_to_integer("101011").unwrap(), 43);
        assert_eq!(decode_to_integer("1111").unwrap(), 15);
        assert_eq!(decode_to_integer(" 1010 ").unwrap(), 10);
    }

    #[test]
    fn it_decodes_widths_beyond_32_bits() {
        // 34 ones, the widest credit chromosome
        let bits = "1".repeat(34);
        assert_eq!(decode_to_integer(&bits).unwrap(), (1u64 << 34) - 1);

        let bits = "1".repeat(64);
        assert_eq!(decode_to_integer(&bits).unwrap(), u64::MAX);
    }

    #[test]
    fn it_rejects_non_binary_strings() {
        assert_eq!(
            decode_to_integer("10a1"),
            Err(InvalidChromosomeError::NonBinary("10a1".to_string()))
        );
        assert_eq!(
            decode_to_integer(""),
            Err(InvalidChromosomeError::NonBinary(String::new()))
        );
    }

    #[test]
    fn it_rejects_overwide_strings() {
        let bits = "1".repeat(65);
        assert_eq!(
            decode_to_integer(&bits),
            Err(InvalidChromosomeError::TooWide(65))
        );
    }

    #[test]
    fn it_round_trips_across_widths() {
        for length in [1usize, 4, 8, 34, 64] {
            let max = if length == 64 {
                u64::MAX
            } else {
                (1u64 << length) - 1
            };
            for value in [0, 1, max / 2, max] {
                let bits = to_bits(value, length);
                assert_eq!(bits.len(), length);
                assert_eq!(decode_to_integer(&bits).unwrap(), value);
            }
        }
    }

    #[test]
    fn it_scales_integers_onto_the_interval() {
        assert_eq!(decode_to_real(0, 0.0, 15.0, 4).unwrap(), 0.0);
        assert_eq!(decode_to_real(15, 0.0, 15.0, 4).unwrap(), 15.0);
        assert_eq!(decode_to_real(5, 0.0, 15.0, 4).unwrap(), 5.0);

        let real = decode_to_real(0, -3.0, 3.0, 8).unwrap();
        assert!((real - -3.0).abs() < 1e-12);
    }

    #[test]
    fn it_validates_interval_parameters() {
        assert_eq!(
            decode_to_real(0, 5.0, 5.0, 4),
            Err(InvalidParameterError::InvertedBounds {
                xmin: 5.0,
                xmax: 5.0
            })
        );
        assert_eq!(
            decode_to_real(0, 0.0, 1.0, 0),
            Err(InvalidParameterError::LengthOutOfRange(0))
        );
        assert_eq!(
            decode_to_real(0, 0.0, 1.0, 65),
            Err(InvalidParameterError::LengthOutOfRange(65))
        );
    }

    #[test]
    fn it_normalizes_by_padding_and_truncating() {
        assert_eq!(normalize("101", 8), "00000101");
        assert_eq!(normalize("110101", 3), "101");
        assert_eq!(normalize("1010", 4), "1010");
        assert_eq!(normalize(" 101 ", 4), "0101");
    }

    #[test]
    fn it_normalizes_non_ascii_input_without_panicking() {
        // Multi-byte characters must not break the truncation slice; the
        // decoder rejects them afterwards.
        assert_eq!(normalize("€10", 2), "10");
        assert_eq!(normalize("€10", 4), "0€10");
        assert_eq!(
            decode_to_integer(&normalize("€10", 4)),
            Err(InvalidChromosomeError::NonBinary("0€10".to_string()))
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        for bits in ["1", "110101", "0000000011111111"] {
            for length in [1usize, 4, 8, 16] {
                let once = normalize(bits, length);
                assert_eq!(normalize(&once, length), once);
            }
        }
    }

    #[test]
    fn it_formats_integers_as_bits() {
        assert_eq!(to_bits(5, 4), "0101");
        assert_eq!(to_bits(0, 3), "000");
        // Low bits kept when the value does not fit
        assert_eq!(to_bits(255, 4), "1111");
    }
}
