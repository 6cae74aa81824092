//! A trimming step: one algorithm applied through the narrowing trim state.

use crate::error::{Result, TrimError};
use crate::read::Read;
use crate::trim::TrimmingAlgorithm;
use crate::trim_state;

/// Wraps a [`TrimmingAlgorithm`] and folds its result into a read's trim state.
///
/// Disabled ends are configured before the step is validated or used; after
/// that the configuration is frozen.
#[derive(Debug, Clone)]
pub struct TrimmingStep {
    algorithm: TrimmingAlgorithm,
    disable_5p: bool,
    disable_3p: bool,
    frozen: bool,
}

impl TrimmingStep {
    pub fn new(algorithm: TrimmingAlgorithm) -> Self {
        Self {
            algorithm,
            disable_5p: false,
            disable_3p: false,
            frozen: false,
        }
    }

    /// Builds and validates a step in one go.
    pub fn with_disabled_ends(algorithm: TrimmingAlgorithm, disable_5p: bool, disable_3p: bool) -> Result<Self> {
        let mut step = Self::new(algorithm);
        step.set_disable_5p(disable_5p)?;
        step.set_disable_3p(disable_3p)?;
        step.validate()?;
        Ok(step)
    }

    pub fn name(&self) -> &'static str {
        self.algorithm.name()
    }

    pub fn algorithm(&self) -> &TrimmingAlgorithm {
        &self.algorithm
    }

    pub fn is_5p_disabled(&self) -> bool {
        self.disable_5p
    }

    pub fn is_3p_disabled(&self) -> bool {
        self.disable_3p
    }

    pub fn set_disable_5p(&mut self, disable: bool) -> Result<()> {
        self.check_mutable()?;
        self.disable_5p = disable;
        Ok(())
    }

    pub fn set_disable_3p(&mut self, disable: bool) -> Result<()> {
        self.check_mutable()?;
        self.disable_3p = disable;
        Ok(())
    }

    fn check_mutable(&self) -> Result<()> {
        if self.frozen {
            return Err(TrimError::IllegalState(format!(
                "{} cannot change its disabled ends once validated or used",
                self.name()
            )));
        }
        Ok(())
    }

    /// Checks the configuration and freezes it. Calling it again is a no-op.
    pub fn validate(&mut self) -> Result<()> {
        if self.frozen {
            return Ok(());
        }
        if self.disable_5p && self.disable_3p {
            return Err(TrimError::InvalidArgument(format!(
                "{} cannot have both 5' and 3' trimming disabled",
                self.name()
            )));
        }
        if let TrimmingAlgorithm::Cut { five_prime, three_prime } = &self.algorithm {
            let active_5p = five_prime.is_some() && !self.disable_5p;
            let active_3p = three_prime.is_some() && !self.disable_3p;
            if !active_5p && !active_3p {
                return Err(TrimError::InvalidArgument(format!(
                    "{} has no cut point on an enabled end",
                    self.name()
                )));
            }
        }
        self.frozen = true;
        Ok(())
    }

    /// Narrows the read's trim interval with this step's algorithm.
    ///
    /// Completely trimmed reads are returned untouched.
    pub fn apply<'a>(&mut self, read: &'a mut Read) -> Result<&'a mut Read> {
        self.validate()?;
        if trim_state::update_completely_trimmed(read) {
            return Ok(read);
        }

        let (start, end) = self.algorithm.trim_points(read)?;
        let start = if self.disable_5p { 0 } else { start };
        let end = if self.disable_3p { usize::MAX } else { end };
        trim_state::update_both(read, start, end)?;
        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trim_state::{get_end, get_start, is_completely_trimmed};

    fn read(bases: &[u8], qual: &[u8]) -> Read {
        Read::unmapped("r", bases, qual)
    }

    #[test]
    fn applies_algorithm_interval() -> Result<()> {
        let mut step = TrimmingStep::new(TrimmingAlgorithm::TrailingN);
        let mut r = read(b"NACGTN", &[30; 6]);
        step.apply(&mut r)?;
        assert_eq!((get_start(&r), get_end(&r)), (1, 5));
        Ok(())
    }

    #[test]
    fn disabled_end_is_left_alone() -> Result<()> {
        let mut step = TrimmingStep::with_disabled_ends(TrimmingAlgorithm::TrailingN, true, false)?;
        let mut r = read(b"NACGTN", &[30; 6]);
        step.apply(&mut r)?;
        assert_eq!((get_start(&r), get_end(&r)), (0, 5));

        let mut step = TrimmingStep::with_disabled_ends(TrimmingAlgorithm::TrailingN, false, true)?;
        let mut r = read(b"NACGTN", &[30; 6]);
        step.apply(&mut r)?;
        assert_eq!((get_start(&r), get_end(&r)), (1, 6));
        Ok(())
    }

    #[test]
    fn both_ends_disabled_is_invalid() {
        let res = TrimmingStep::with_disabled_ends(TrimmingAlgorithm::TrailingN, true, true);
        assert!(matches!(res, Err(TrimError::InvalidArgument(_))));
    }

    #[test]
    fn cut_needs_an_active_end() -> Result<()> {
        let cut = TrimmingAlgorithm::cut(Some(3), None)?;
        let res = TrimmingStep::with_disabled_ends(cut, true, false);
        assert!(matches!(res, Err(TrimError::InvalidArgument(_))));
        Ok(())
    }

    #[test]
    fn reconfiguring_after_use_is_illegal() -> Result<()> {
        let mut step = TrimmingStep::new(TrimmingAlgorithm::TrailingN);
        step.set_disable_3p(true)?;
        let mut r = read(b"ACGT", &[30; 4]);
        step.apply(&mut r)?;
        assert!(matches!(step.set_disable_3p(false), Err(TrimError::IllegalState(_))));

        let mut step = TrimmingStep::new(TrimmingAlgorithm::TrailingN);
        step.validate()?;
        assert!(matches!(step.set_disable_5p(true), Err(TrimError::IllegalState(_))));
        Ok(())
    }

    #[test]
    fn terminal_read_is_not_touched() -> Result<()> {
        let mut step = TrimmingStep::new(TrimmingAlgorithm::cut(Some(2), None)?);
        let mut r = read(b"NNNN", &[30; 4]);
        TrimmingStep::new(TrimmingAlgorithm::TrailingN).apply(&mut r)?;
        assert!(is_completely_trimmed(&r));
        let before = (get_start(&r), get_end(&r));
        step.apply(&mut r)?;
        assert_eq!((get_start(&r), get_end(&r)), before);
        Ok(())
    }

    #[test]
    fn successive_steps_keep_most_aggressive_trim() -> Result<()> {
        let mut r = read(b"ACGTACGTAC", &[30; 10]);
        TrimmingStep::new(TrimmingAlgorithm::cut(Some(4), Some(1))?).apply(&mut r)?;
        TrimmingStep::new(TrimmingAlgorithm::cut(Some(2), Some(3))?).apply(&mut r)?;
        assert_eq!((get_start(&r), get_end(&r)), (4, 7));
        Ok(())
    }
}
