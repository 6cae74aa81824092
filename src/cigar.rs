//! Alignment shape of mapped reads and hard clipping by read coordinates.
//!
//! Read coordinates index the stored bases: soft-clipped bases are included,
//! bases already hard clipped are not.

use noodles_core::Position;
use noodles_sam::alignment::record::cigar::op::Kind;
use noodles_sam::alignment::record::cigar::Op;
use noodles_sam::alignment::record_buf::Cigar;

use crate::error::{Result, TrimError};

fn consumes_read(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::Match | Kind::Insertion | Kind::SoftClip | Kind::SequenceMatch | Kind::SequenceMismatch
    )
}

fn consumes_reference(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::Match | Kind::Deletion | Kind::Skip | Kind::SequenceMatch | Kind::SequenceMismatch
    )
}

/// Number of stored bases described (M/I/S/=/X)
pub fn read_length(cigar: &Cigar) -> usize {
    cigar
        .as_ref()
        .iter()
        .filter(|op| consumes_read(op.kind()))
        .map(|op| op.len())
        .sum()
}

/// Placement of a mapped read: leftmost aligned reference position and shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub position: Position,
    pub cigar: Cigar,
}

impl Alignment {
    pub fn new(position: Position, cigar: Cigar) -> Self {
        Self { position, cigar }
    }

    /// Builds an alignment from a 1-based position and `(kind, length)` pairs.
    pub fn from_ops(position: usize, ops: &[(Kind, usize)]) -> Result<Self> {
        let position = Position::new(position)
            .ok_or_else(|| TrimError::InvalidArgument("alignment positions are 1-based".to_string()))?;
        let ops: Vec<Op> = ops.iter().map(|&(kind, len)| Op::new(kind, len)).collect();
        Ok(Self::new(position, Cigar::from(ops)))
    }
}

/// Hard clips everything outside the read interval `[start, end)`.
///
/// The 3' side is clipped before the 5' side. Returns the new alignment, or
/// `None` when no aligned base survives the clip (the read is left unplaced).
pub fn hard_clip(alignment: &Alignment, start: usize, end: usize) -> Result<Option<Alignment>> {
    let read_len = read_length(&alignment.cigar);
    if start > end || end > read_len {
        return Err(TrimError::Clipping(format!(
            "interval [{start}, {end}) does not fit an alignment of read length {read_len}"
        )));
    }

    let ops = clip_end(alignment.cigar.as_ref().to_vec(), read_len - end)?;
    let (ops, shift) = clip_start(ops, start)?;

    if !ops.iter().any(|op| consumes_read(op.kind()) && consumes_reference(op.kind())) {
        return Ok(None);
    }
    let position = Position::new(usize::from(alignment.position) + shift)
        .ok_or_else(|| TrimError::Clipping("alignment start overflowed".to_string()))?;
    Ok(Some(Alignment::new(position, Cigar::from(ops))))
}

/// Clips `n` read bases from the start, returning the new ops and the number
/// of reference bases the alignment start moves by.
fn clip_start(ops: Vec<Op>, n: usize) -> Result<(Vec<Op>, usize)> {
    if n == 0 {
        return Ok((ops, 0));
    }

    let mut iter = ops.into_iter().peekable();
    let mut hard = 0;
    while let Some(op) = iter.next_if(|op| op.kind() == Kind::HardClip) {
        hard += op.len();
    }

    let mut clipped = 0;
    let mut shift = 0;
    let mut kept = Vec::new();
    while clipped < n {
        let Some(op) = iter.next() else {
            return Err(TrimError::Clipping(format!("{n} bases requested but only {clipped} available")));
        };
        let (kind, len) = (op.kind(), op.len());
        let remaining = n - clipped;
        if consumes_read(kind) {
            let taken = len.min(remaining);
            clipped += taken;
            if consumes_reference(kind) {
                shift += taken;
            }
            if len > taken {
                kept.push(Op::new(kind, len - taken));
            }
        } else if consumes_reference(kind) {
            shift += len;
        } else if kind == Kind::HardClip {
            return Err(TrimError::Clipping("hard clip inside alignment".to_string()));
        }
    }

    // deletions left dangling at the new boundary are dropped
    if kept.is_empty() {
        while let Some(op) = iter.next_if(|op| matches!(op.kind(), Kind::Deletion | Kind::Skip)) {
            shift += op.len();
        }
    }
    kept.extend(iter);

    // an insertion cannot open an alignment
    if let Some(first) = kept.first_mut() {
        if first.kind() == Kind::Insertion {
            *first = Op::new(Kind::SoftClip, first.len());
        }
    }

    let mut result = vec![Op::new(Kind::HardClip, hard + clipped)];
    for op in kept {
        match result.last_mut() {
            Some(last) if last.kind() == op.kind() => *last = Op::new(op.kind(), last.len() + op.len()),
            _ => result.push(op),
        }
    }
    Ok((result, shift))
}

/// Clips `n` read bases from the end; the alignment start never moves.
fn clip_end(mut ops: Vec<Op>, n: usize) -> Result<Vec<Op>> {
    ops.reverse();
    let (mut ops, _) = clip_start(ops, n)?;
    ops.reverse();
    Ok(ops)
}
