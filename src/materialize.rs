//! Turns a read's pending trim interval into an actually shortened read.

use log::debug;

use crate::cigar;
use crate::error::{Result, TrimError};
use crate::read::{self, Read, TagValue, MIN_PHRED, NO_CALL_BASE};
use crate::trim_state;

#[derive(Debug, Clone, Copy, Default)]
pub struct TrimMaterializer {
    /// Overwrite completely trimmed reads with no-calls instead of leaving them as-is
    mask_completely_trimmed: bool,
}

impl TrimMaterializer {
    pub fn new(mask_completely_trimmed: bool) -> Self {
        Self { mask_completely_trimmed }
    }

    /// Applies the pending interval and clears it.
    ///
    /// A second call finds no pending interval and leaves the read alone.
    pub fn apply<'a>(&self, read: &'a mut Read) -> Result<&'a mut Read> {
        if trim_state::update_completely_trimmed(read) {
            trim_state::clear_pending(read);
            if self.mask_completely_trimmed {
                read.bases.fill(NO_CALL_BASE);
                read.qualities.fill(MIN_PHRED);
            }
            return Ok(read);
        }

        // bounds come from the untrimmed length, so read them before clearing
        let start = trim_state::get_start(read);
        let end = trim_state::get_end(read);
        let len = read.len();
        if read.qualities.len() != len {
            return Err(TrimError::InvalidArgument(format!(
                "read {} has {len} bases but {} qualities",
                read.name,
                read.qualities.len()
            )));
        }
        if end > len {
            return Err(TrimError::IllegalState(format!(
                "read {} has a trim end of {end} past its length {len}",
                read.name
            )));
        }

        let alignment = match &read.alignment {
            Some(alignment) => {
                let cigar_len = cigar::read_length(&alignment.cigar);
                if cigar_len != len {
                    return Err(TrimError::Clipping(format!(
                        "read {} has {len} bases but its CIGAR describes {cigar_len}",
                        read.name
                    )));
                }
                let clipped = cigar::hard_clip(alignment, start, end)?;
                if clipped.is_none() {
                    debug!("read {} has no aligned bases left after trimming", read.name);
                }
                clipped
            }
            None => None,
        };

        trim_state::clear_pending(read);
        if (start, end) == (0, len) {
            return Ok(read);
        }

        read.alignment = alignment;
        read.bases = read.bases[start..end].to_vec();
        read.qualities = read.qualities[start..end].to_vec();
        for tag in [read::TAG_BASE_INSERTION_QUALITIES, read::TAG_BASE_DELETION_QUALITIES] {
            if let Some(TagValue::String(quals)) = read.tags.get_mut(tag) {
                if quals.len() == len && quals.is_ascii() {
                    *quals = quals[start..end].to_string();
                }
            }
        }
        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cigar::Alignment;
    use noodles_sam::alignment::record::cigar::op::Kind;
    use crate::trim_state::{completely_trimmed, update_both, CompletelyTrimmed, TrimState};

    #[test]
    fn truncates_unmapped_read() -> Result<()> {
        let mut r = Read::unmapped("r", b"ACGTACGT", &[10, 11, 12, 13, 14, 15, 16, 17]);
        update_both(&mut r, 2, 6)?;
        let before = TrimState::of(&r);

        TrimMaterializer::default().apply(&mut r)?;
        assert_eq!(r.len(), before.end - before.start);
        assert_eq!(r.bases, b"GTAC");
        assert_eq!(r.qualities, vec![12, 13, 14, 15]);
        assert_eq!(r.trim.start, None);
        assert_eq!(r.trim.end, None);
        Ok(())
    }

    #[test]
    fn second_apply_is_noop() -> Result<()> {
        let mut r = Read::unmapped("r", b"ACGTACGT", &[30; 8]);
        update_both(&mut r, 1, 7)?;
        let m = TrimMaterializer::default();
        m.apply(&mut r)?;
        m.apply(&mut r)?;
        assert_eq!(r.bases, b"CGTACG");
        Ok(())
    }

    #[test]
    fn completely_trimmed_read_is_left_as_is() -> Result<()> {
        let mut r = Read::unmapped("r", b"ACGT", &[30; 4]);
        update_both(&mut r, 3, 2)?;
        TrimMaterializer::default().apply(&mut r)?;
        assert_eq!(r.bases, b"ACGT");
        assert_eq!(completely_trimmed(&r), CompletelyTrimmed::Inverted);
        assert_eq!(r.trim.start, None);
        Ok(())
    }

    #[test]
    fn completely_trimmed_read_can_be_masked() -> Result<()> {
        let mut r = Read::unmapped("r", b"ACGT", &[30; 4]);
        update_both(&mut r, 4, 4)?;
        TrimMaterializer::new(true).apply(&mut r)?;
        assert_eq!(r.bases, b"NNNN");
        assert_eq!(r.qualities, vec![0; 4]);
        Ok(())
    }

    #[test]
    fn hard_clips_mapped_read() -> Result<()> {
        let alignment = Alignment::from_ops(100, &[(Kind::SoftClip, 2), (Kind::Match, 8)])?;
        let mut r = Read::mapped("r", b"AACCGGTTAA", &[30; 10], alignment);
        r.set_tag("BI", "ABCDEFGHIJ");
        r.set_tag("BD", "short");
        update_both(&mut r, 3, 9)?;

        TrimMaterializer::default().apply(&mut r)?;
        let alignment = r.alignment.as_ref().expect("still mapped");
        let ops: Vec<_> = alignment.cigar.as_ref().iter().map(|op| (op.kind(), op.len())).collect();
        assert_eq!(ops, vec![(Kind::HardClip, 3), (Kind::Match, 6), (Kind::HardClip, 1)]);
        assert_eq!(usize::from(alignment.position), 101);
        assert_eq!(r.bases, b"CGGTTA");
        assert_eq!(r.tag("BI"), Some(&TagValue::from("DEFGHI")));
        assert_eq!(r.tag("BD"), Some(&TagValue::from("short")));
        Ok(())
    }

    #[test]
    fn mismatched_qualities_are_an_error() {
        let mut r = Read::unmapped("r", b"NACGTA", &[30; 3]);
        r.trim.start = Some(1);
        assert!(matches!(TrimMaterializer::default().apply(&mut r), Err(TrimError::InvalidArgument(_))));
        assert_eq!(r.bases, b"NACGTA");
    }

    #[test]
    fn end_past_read_is_an_error() {
        let mut r = Read::unmapped("r", b"ACGT", &[30; 4]);
        r.trim.end = Some(10);
        assert!(matches!(TrimMaterializer::default().apply(&mut r), Err(TrimError::IllegalState(_))));
    }

    #[test]
    fn diverged_cigar_is_fatal() -> Result<()> {
        let alignment = Alignment::from_ops(1, &[(Kind::Match, 5)])?;
        let mut r = Read::mapped("r", b"ACGTAC", &[30; 6], alignment);
        update_both(&mut r, 1, 5)?;
        assert!(matches!(TrimMaterializer::default().apply(&mut r), Err(TrimError::Clipping(_))));
        assert_eq!(r.bases, b"ACGTAC");
        Ok(())
    }
}
