//! Pending trim intent carried by each read.
//!
//! Trimming steps only narrow the interval `[start, end)`; the bases are
//! removed later by the materializer. Once a read is completely trimmed the
//! interval is frozen.

use crate::error::{Result, TrimError};
use crate::read::Read;

/// Names under which the trim state is serialized as read tags
pub const TAG_START: &str = "ts";
pub const TAG_END: &str = "te";
pub const TAG_COMPLETELY_TRIMMED: &str = "ct";

/// Why a read is completely trimmed, in priority order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletelyTrimmed {
    #[default]
    NotTrimmed,
    /// start point reached the read length
    StartAtEnd,
    /// end point reached zero
    EndAtZero,
    /// start point at or past the end point
    Inverted,
}

impl CompletelyTrimmed {
    pub fn code(self) -> usize {
        match self {
            CompletelyTrimmed::NotTrimmed => 0,
            CompletelyTrimmed::StartAtEnd => 1,
            CompletelyTrimmed::EndAtZero => 2,
            CompletelyTrimmed::Inverted => 3,
        }
    }

    pub fn from_code(code: usize) -> Option<Self> {
        match code {
            0 => Some(CompletelyTrimmed::NotTrimmed),
            1 => Some(CompletelyTrimmed::StartAtEnd),
            2 => Some(CompletelyTrimmed::EndAtZero),
            3 => Some(CompletelyTrimmed::Inverted),
            _ => None,
        }
    }

    pub fn is_trimmed(self) -> bool {
        self != CompletelyTrimmed::NotTrimmed
    }
}

/// Trim state stored on a read; `None` means the tag is absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimPoints {
    pub(crate) start: Option<usize>,
    pub(crate) end: Option<usize>,
    pub(crate) completely_trimmed: CompletelyTrimmed,
}

/// Resolved view of a read's trim state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimState {
    pub start: usize,
    pub end: usize,
    pub completely_trimmed: CompletelyTrimmed,
}

impl TrimState {
    pub fn of(read: &Read) -> Self {
        Self {
            start: get_start(read),
            end: get_end(read),
            completely_trimmed: completely_trimmed(read),
        }
    }
}

pub fn get_start(read: &Read) -> usize {
    read.trim.start.unwrap_or(0)
}

pub fn get_end(read: &Read) -> usize {
    read.trim.end.unwrap_or_else(|| read.len())
}

pub fn completely_trimmed(read: &Read) -> CompletelyTrimmed {
    read.trim.completely_trimmed
}

/// Reads the latched state without recomputing it.
pub fn is_completely_trimmed(read: &Read) -> bool {
    read.trim.completely_trimmed.is_trimmed()
}

/// Recomputes and latches the completely-trimmed state; returns whether the read is terminal.
pub fn update_completely_trimmed(read: &mut Read) -> bool {
    if is_completely_trimmed(read) {
        return true;
    }
    let (start, end) = (get_start(read), get_end(read));
    let state = if start == read.len() {
        CompletelyTrimmed::StartAtEnd
    } else if end == 0 {
        CompletelyTrimmed::EndAtZero
    } else if start >= end {
        CompletelyTrimmed::Inverted
    } else {
        CompletelyTrimmed::NotTrimmed
    };
    read.trim.completely_trimmed = state;
    state.is_trimmed()
}

/// Moves the start point right; a candidate left of the current start is ignored.
pub fn update_start(read: &mut Read, candidate: usize) -> Result<()> {
    if candidate > read.len() {
        return Err(TrimError::InvalidArgument(format!(
            "start point {candidate} beyond read length {}",
            read.len()
        )));
    }
    read.trim.start = Some(candidate.max(get_start(read)));
    Ok(())
}

/// Moves the end point left; candidates past the read end (e.g. `usize::MAX`) leave it unchanged.
pub fn update_end(read: &mut Read, candidate: usize) {
    read.trim.end = Some(candidate.min(get_end(read)));
}

pub fn update_both(read: &mut Read, start: usize, end: usize) -> Result<bool> {
    update_start(read, start)?;
    update_end(read, end);
    Ok(update_completely_trimmed(read))
}

/// Latches the completely-trimmed state, then drops the pending start/end points.
pub fn clear_pending(read: &mut Read) {
    update_completely_trimmed(read);
    read.trim.start = None;
    read.trim.end = None;
}
