//! Trimming steps followed by filters, with per-component counters.

use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::filter::ReadFilter;
use crate::materialize::TrimMaterializer;
use crate::read::Read;
use crate::trim_state::{self, TrimState};
use crate::trimmer::TrimmingStep;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TrimmerMetrics {
    pub trimmer: String,
    pub total: u64,
    pub trimmed_5p: u64,
    pub trimmed_3p: u64,
    pub completely_trimmed: u64,
}

impl TrimmerMetrics {
    fn new(trimmer: &str) -> Self {
        Self {
            trimmer: trimmer.to_string(),
            ..Default::default()
        }
    }

    pub fn merge(&mut self, other: &TrimmerMetrics) {
        self.total += other.total;
        self.trimmed_5p += other.trimmed_5p;
        self.trimmed_3p += other.trimmed_3p;
        self.completely_trimmed += other.completely_trimmed;
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FilterMetrics {
    pub filter: String,
    pub total: u64,
    pub passed: u64,
}

impl FilterMetrics {
    fn new(filter: &str) -> Self {
        Self {
            filter: filter.to_string(),
            ..Default::default()
        }
    }

    pub fn merge(&mut self, other: &FilterMetrics) {
        self.total += other.total;
        self.passed += other.passed;
    }
}

/// Runs every trimming step, materializes the result, then applies the filters.
///
/// Counters are not synchronized: give each worker its own [`fork`](Self::fork)
/// and [`merge`](Self::merge) them afterwards.
#[derive(Debug, Clone)]
pub struct TrimAndFilterPipeline {
    trimmers: Vec<(TrimmingStep, TrimmerMetrics)>,
    filters: Vec<(Arc<dyn ReadFilter>, FilterMetrics)>,
    materializer: TrimMaterializer,
}

impl TrimAndFilterPipeline {
    /// Validates every step up front so misconfiguration fails before any read is seen.
    pub fn new(trimmers: Vec<TrimmingStep>, filters: Vec<Arc<dyn ReadFilter>>) -> Result<Self> {
        let trimmers = trimmers
            .into_iter()
            .map(|mut step| -> Result<_> {
                step.validate()?;
                let metrics = TrimmerMetrics::new(step.name());
                Ok((step, metrics))
            })
            .collect::<Result<Vec<_>>>()?;
        let filters = filters
            .into_iter()
            .map(|filter| {
                let metrics = FilterMetrics::new(filter.name());
                (filter, metrics)
            })
            .collect();
        Ok(Self {
            trimmers,
            filters,
            materializer: TrimMaterializer::default(),
        })
    }

    pub fn with_materializer(mut self, materializer: TrimMaterializer) -> Self {
        self.materializer = materializer;
        self
    }

    /// Trims the read in place and reports whether it survives the filters.
    pub fn accepts(&mut self, read: &mut Read) -> Result<bool> {
        if !trim_state::update_completely_trimmed(read) {
            for (step, metrics) in &mut self.trimmers {
                let before = TrimState::of(read);
                step.apply(read)?;
                let after = TrimState::of(read);

                metrics.total += 1;
                if after.start != before.start {
                    metrics.trimmed_5p += 1;
                }
                if after.end != before.end {
                    metrics.trimmed_3p += 1;
                }
                if after.completely_trimmed.is_trimmed() {
                    metrics.completely_trimmed += 1;
                    break;
                }
            }
        }

        self.materializer.apply(read)?;
        if trim_state::is_completely_trimmed(read) {
            return Ok(false);
        }

        for (filter, metrics) in &mut self.filters {
            metrics.total += 1;
            if !filter.test(read) {
                return Ok(false);
            }
        }
        for (_, metrics) in &mut self.filters {
            metrics.passed += 1;
        }
        Ok(true)
    }

    /// Same components with zeroed counters
    pub fn fork(&self) -> Self {
        Self {
            trimmers: self
                .trimmers
                .iter()
                .map(|(step, _)| (step.clone(), TrimmerMetrics::new(step.name())))
                .collect(),
            filters: self
                .filters
                .iter()
                .map(|(filter, _)| (Arc::clone(filter), FilterMetrics::new(filter.name())))
                .collect(),
            materializer: self.materializer,
        }
    }

    /// Adds the counters of a fork of this pipeline.
    pub fn merge(&mut self, other: &TrimAndFilterPipeline) {
        for ((_, mine), (_, theirs)) in self.trimmers.iter_mut().zip(&other.trimmers) {
            mine.merge(theirs);
        }
        for ((_, mine), (_, theirs)) in self.filters.iter_mut().zip(&other.filters) {
            mine.merge(theirs);
        }
    }

    pub fn trimmer_metrics(&self) -> Vec<TrimmerMetrics> {
        self.trimmers.iter().map(|(_, metrics)| metrics.clone()).collect()
    }

    pub fn filter_metrics(&self) -> Vec<FilterMetrics> {
        self.filters.iter().map(|(_, metrics)| metrics.clone()).collect()
    }
}
