//! Read filters evaluated after trimming.

use std::fmt;

use crate::error::{Result, TrimError};
use crate::read::Read;

/// A named predicate over a trimmed read; `true` keeps the read.
pub trait ReadFilter: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
    fn test(&self, read: &Read) -> bool;
}

/// Keeps reads whose length lies in `[min, max]`
#[derive(Debug, Clone)]
pub struct ReadLengthFilter {
    min: usize,
    max: usize,
}

impl ReadLengthFilter {
    pub fn new(min: usize, max: usize) -> Result<Self> {
        if min > max {
            return Err(TrimError::InvalidArgument(format!(
                "minimum read length {min} is greater than maximum {max}"
            )));
        }
        Ok(Self { min, max })
    }
}

impl ReadFilter for ReadLengthFilter {
    fn name(&self) -> &str {
        "ReadLengthReadFilter"
    }

    fn test(&self, read: &Read) -> bool {
        (self.min..=self.max).contains(&read.len())
    }
}

/// Drops reads carrying more than `max` ambiguous (N) bases
#[derive(Debug, Clone)]
pub struct AmbiguousBaseFilter {
    max: usize,
}

impl AmbiguousBaseFilter {
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl ReadFilter for AmbiguousBaseFilter {
    fn name(&self) -> &str {
        "AmbiguousBaseReadFilter"
    }

    fn test(&self, read: &Read) -> bool {
        read.bases.iter().filter(|b| b.eq_ignore_ascii_case(&b'N')).count() <= self.max
    }
}

/// Adapts any closure into a filter
pub struct PredicateFilter<F> {
    name: String,
    predicate: F,
}

impl<F> PredicateFilter<F>
where
    F: Fn(&Read) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self { name: name.into(), predicate }
    }
}

impl<F> fmt::Debug for PredicateFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateFilter").field("name", &self.name).finish()
    }
}

impl<F> ReadFilter for PredicateFilter<F>
where
    F: Fn(&Read) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn test(&self, read: &Read) -> bool {
        (self.predicate)(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_bounds_are_inclusive() -> Result<()> {
        let f = ReadLengthFilter::new(2, 4)?;
        assert!(!f.test(&Read::unmapped("r", b"A", &[30])));
        assert!(f.test(&Read::unmapped("r", b"AC", &[30; 2])));
        assert!(f.test(&Read::unmapped("r", b"ACGT", &[30; 4])));
        assert!(!f.test(&Read::unmapped("r", b"ACGTA", &[30; 5])));
        assert!(ReadLengthFilter::new(5, 4).is_err());
        Ok(())
    }

    #[test]
    fn ambiguous_bases_counted_case_insensitively() {
        let f = AmbiguousBaseFilter::new(1);
        assert!(f.test(&Read::unmapped("r", b"ANGT", &[30; 4])));
        assert!(!f.test(&Read::unmapped("r", b"nNGT", &[30; 4])));
    }

    #[test]
    fn predicate_filter_uses_closure() {
        let f = PredicateFilter::new("mapped", |r: &Read| r.is_mapped());
        assert_eq!(f.name(), "mapped");
        assert!(!f.test(&Read::unmapped("r", b"A", &[30])));
    }
}
