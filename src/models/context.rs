use crate::codec::{InvalidParameterError, MAX_CHROMOSOME_LENGTH};
use tracing::instrument;

/// Immutable run-wide constants shared by every operator call of one run.
///
/// The bounds and chromosome length are fixed before the generation loop
/// starts and never change mid-run, so the same context value can be handed
/// to selection, crossover and mutation without any set-before-use ordering
/// between them. Concurrent runs each build their own context.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(test, derive(PartialEq))]
pub struct RunContext {
    pub xmin: f64,
    pub xmax: f64,
    pub chromosome_length: usize,
}

impl RunContext {
    /// Validates and builds a run context. Requires `xmax > xmin` and a
    /// chromosome length in `1..=64`.
    #[instrument(level = "debug")]
    pub fn new(xmin: f64, xmax: f64, chromosome_length: usize) -> Result<Self, InvalidParameterError> {
        if xmax <= xmin {
            return Err(InvalidParameterError::InvertedBounds { xmin, xmax });
        }
        if !(1..=MAX_CHROMOSOME_LENGTH).contains(&chromosome_length) {
            return Err(InvalidParameterError::LengthOutOfRange(chromosome_length));
        }

        Ok(Self {
            xmin,
            xmax,
            chromosome_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_accepts_valid_parameters() {
        let ctx = RunContext::new(0.0, 15.0, 4).unwrap();
        assert_eq!(ctx.chromosome_length, 4);
    }

    #[test]
    fn it_rejects_inverted_bounds() {
        assert!(RunContext::new(1.0, 1.0, 4).is_err());
        assert!(RunContext::new(2.0, 1.0, 4).is_err());
    }

    #[test]
    fn it_rejects_out_of_range_lengths() {
        assert!(RunContext::new(0.0, 1.0, 0).is_err());
        assert!(RunContext::new(0.0, 1.0, 65).is_err());
        assert!(RunContext::new(0.0, 1.0, 64).is_ok());
    }
}
