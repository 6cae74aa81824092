//! Trimming algorithms: each one scores a read and proposes the interval to keep.

use crate::error::{Result, TrimError};
use crate::read::Read;

/// Quality threshold used when none is configured
pub const DEFAULT_MOTT_THRESHOLD: i32 = 20;

/// Interval-scoring algorithms a trimming step can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrimmingAlgorithm {
    /// Modified Mott trimming on base qualities
    MottQuality { threshold: i32 },
    /// Removes ambiguous bases from both ends
    TrailingN,
    /// Cuts a fixed number of bases from either end
    Cut {
        five_prime: Option<usize>,
        three_prime: Option<usize>,
    },
}

impl TrimmingAlgorithm {
    pub fn mott_quality(threshold: i32) -> Result<Self> {
        check_threshold(threshold)?;
        Ok(TrimmingAlgorithm::MottQuality { threshold })
    }

    pub fn cut(five_prime: Option<usize>, three_prime: Option<usize>) -> Result<Self> {
        if five_prime.is_none() && three_prime.is_none() {
            return Err(TrimError::InvalidArgument(
                "at least one of the 5' or 3' cut points must be provided".to_string(),
            ));
        }
        if five_prime == Some(0) || three_prime == Some(0) {
            return Err(TrimError::InvalidArgument("cut points must be positive".to_string()));
        }
        Ok(TrimmingAlgorithm::Cut { five_prime, three_prime })
    }

    /// Name used to key the metrics of a step running this algorithm
    pub fn name(&self) -> &'static str {
        match self {
            TrimmingAlgorithm::MottQuality { .. } => "MottQualityTrimmer",
            TrimmingAlgorithm::TrailingN => "TrailingNtrimmer",
            TrimmingAlgorithm::Cut { .. } => "CutReadTrimmer",
        }
    }

    /// Candidate interval to keep; never mutates the read.
    pub fn trim_points(&self, read: &Read) -> Result<(usize, usize)> {
        match self {
            TrimmingAlgorithm::MottQuality { threshold } => mott(&read.qualities, *threshold),
            TrimmingAlgorithm::TrailingN => Ok(trailing_n(&read.bases)),
            TrimmingAlgorithm::Cut { five_prime, three_prime } => Ok(cut(read.len(), *five_prime, *three_prime)),
        }
    }
}

fn check_threshold(threshold: i32) -> Result<()> {
    if threshold < 0 {
        return Err(TrimError::InvalidArgument(format!(
            "quality threshold must be non-negative, found {threshold}"
        )));
    }
    Ok(())
}

/// Modified Mott trimming: the highest-scoring run of `quality - threshold`.
///
/// The running sum restarts whenever it drops to zero or below. Only a
/// strictly greater sum replaces the best run, so ties keep the earliest end.
/// Returns `(len, 0)` when no base scores above the threshold.
pub fn mott(qualities: &[u8], threshold: i32) -> Result<(usize, usize)> {
    check_threshold(threshold)?;

    let mut run_start = 0usize;
    let mut sum = 0i64;
    let mut best = 0i64;
    let (mut start, mut end) = (0usize, 0usize);

    for (i, &q) in qualities.iter().enumerate() {
        sum += i64::from(q) - i64::from(threshold);
        if sum <= 0 {
            sum = 0;
            run_start = i + 1;
            continue;
        }
        if sum > best {
            best = sum;
            start = run_start;
            end = i + 1;
        }
    }
    if best == 0 {
        return Ok((qualities.len(), 0));
    }
    Ok((start, end))
}

/// Ambiguous bases at either end; internal runs are kept.
pub fn trailing_n(bases: &[u8]) -> (usize, usize) {
    let is_n = |b: &&u8| b.eq_ignore_ascii_case(&b'N');
    let start = bases.iter().take_while(is_n).count();
    if start == bases.len() {
        return (start, start);
    }
    let end = bases.len() - bases.iter().rev().take_while(is_n).count();
    (start, end)
}

pub fn cut(len: usize, five_prime: Option<usize>, three_prime: Option<usize>) -> (usize, usize) {
    let start = five_prime.unwrap_or(0).min(len);
    let end = len.saturating_sub(three_prime.unwrap_or(0));
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mott_trims_low_tail() -> Result<()> {
        assert_eq!(mott(&[21, 21, 21, 20, 19], 20)?, (0, 3));
        Ok(())
    }

    #[test]
    fn mott_skips_neutral_ends() -> Result<()> {
        assert_eq!(mott(&[20, 20, 21, 21, 21, 21, 20, 20], 20)?, (2, 6));
        Ok(())
    }

    #[test]
    fn mott_picks_best_run() -> Result<()> {
        let qual = [21, 20, 20, 19, 19, 21, 21, 21, 20, 20, 19, 19, 21, 21, 21, 20, 19];
        assert_eq!(mott(&qual, 20)?, (5, 15));
        Ok(())
    }

    #[test]
    fn mott_ties_keep_earliest_end() -> Result<()> {
        // two runs scoring 2 each; the first one wins
        assert_eq!(mott(&[22, 10, 22], 20)?, (0, 1));
        Ok(())
    }

    #[test]
    fn mott_without_good_region_is_empty() -> Result<()> {
        assert_eq!(mott(&[20, 20, 20, 20], 20)?, (4, 0));
        assert_eq!(mott(&[5, 2], 20)?, (2, 0));
        assert_eq!(mott(&[], 20)?, (0, 0));
        Ok(())
    }

    #[test]
    fn mott_rejects_negative_threshold() {
        assert!(matches!(mott(&[30], -1), Err(TrimError::InvalidArgument(_))));
        assert!(TrimmingAlgorithm::mott_quality(-5).is_err());
    }

    #[test]
    fn trailing_n_examples() {
        assert_eq!(trailing_n(b"ATTGCT"), (0, 6));
        assert_eq!(trailing_n(b"ATTGCN"), (0, 5));
        assert_eq!(trailing_n(b"NTTGCN"), (1, 5));
        assert_eq!(trailing_n(b"NNNNNN"), (6, 6));
        assert_eq!(trailing_n(b"nANNAn"), (1, 5));
    }

    #[test]
    fn cut_clamps_to_length() {
        assert_eq!(cut(10, Some(3), None), (3, 10));
        assert_eq!(cut(10, None, Some(4)), (0, 6));
        assert_eq!(cut(10, Some(12), Some(15)), (10, 0));
    }

    #[test]
    fn cut_requires_positive_offset() {
        assert!(TrimmingAlgorithm::cut(None, None).is_err());
        assert!(TrimmingAlgorithm::cut(Some(0), Some(2)).is_err());
        assert!(TrimmingAlgorithm::cut(Some(2), None).is_ok());
    }
}
