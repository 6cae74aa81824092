//! Command-line surface and its translation into a pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use crate::error::{Result, TrimError};
use crate::filter::{AmbiguousBaseFilter, ReadFilter, ReadLengthFilter};
use crate::io_utils::Compression;
use crate::materialize::TrimMaterializer;
use crate::pipeline::TrimAndFilterPipeline;
use crate::trim::{TrimmingAlgorithm, DEFAULT_MOTT_THRESHOLD};
use crate::trimmer::TrimmingStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrimmerKind {
    /// Ambiguous bases at either end
    TrailingN,
    /// Modified Mott quality trimming
    Mott,
    /// Fixed number of bases from either end
    Cut,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Trim and filter FASTQ reads, single or paired-end")]
pub struct Args {
    /// Single-end input FASTQ (use '-' for stdin). gzip and zstd inputs are detected.
    pub input: Option<String>,

    /// First mate input FASTQ
    #[arg(long, requires = "p2", conflicts_with = "input")]
    pub p1: Option<String>,

    /// Second mate input FASTQ
    #[arg(long, requires = "p1")]
    pub p2: Option<String>,

    /// Output file (single-end, default stdout) or base name for <base>_R1/<base>_R2 (paired-end)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compress output with gzip
    #[arg(long)]
    pub gz: bool,

    /// Compress output with zstd
    #[arg(long)]
    pub zstd: bool,

    /// Trimming steps, applied in the given order
    #[arg(long = "trimmer", value_enum, default_values_t = [TrimmerKind::TrailingN, TrimmerKind::Mott])]
    pub trimmers: Vec<TrimmerKind>,

    /// Quality threshold for Mott trimming
    #[arg(long, default_value_t = DEFAULT_MOTT_THRESHOLD, allow_negative_numbers = true)]
    pub mott_threshold: i32,

    /// Bases cut from the 5' end by the cut trimmer
    #[arg(long = "cut-5p")]
    pub cut_5p: Option<usize>,

    /// Bases cut from the 3' end by the cut trimmer
    #[arg(long = "cut-3p")]
    pub cut_3p: Option<usize>,

    /// Never trim the 5' end
    #[arg(long = "disable-5p-trim")]
    pub disable_5p: bool,

    /// Never trim the 3' end
    #[arg(long = "disable-3p-trim")]
    pub disable_3p: bool,

    /// Minimum read length after trimming
    #[arg(long, default_value_t = 40)]
    pub min_length: usize,

    /// Maximum read length after trimming
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Maximum number of N bases after trimming
    #[arg(long)]
    pub max_n: Option<usize>,

    /// Replace completely trimmed reads by no-calls instead of keeping their bases
    #[arg(long)]
    pub mask_completely_trimmed: bool,

    /// Tags copied to the other mate when only one mate carries them
    #[arg(long = "pair-tag", default_values_t = ["BC".to_string()])]
    pub pair_tags: Vec<String>,

    /// Prefix for <prefix>.trimmer_metrics.tsv and <prefix>.filter_metrics.tsv
    #[arg(long)]
    pub metrics: Option<PathBuf>,

    /// Worker threads (0 = all cores)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,

    /// Records per batch handed to the workers
    #[arg(long, default_value_t = 10_000)]
    pub batch_size: usize,
}

/// Where reads come from
#[derive(Debug, Clone)]
pub enum Inputs {
    Single(String),
    Paired(String, String),
}

impl Args {
    /// Checks option combinations that clap cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.gz && self.zstd {
            return Err(TrimError::InvalidArgument("--gz and --zstd are mutually exclusive".to_string()));
        }
        if self.p1.is_some() && self.output.is_none() {
            return Err(TrimError::InvalidArgument(
                "--output is required for paired-end input".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(TrimError::InvalidArgument("--batch-size must be positive".to_string()));
        }
        Ok(())
    }

    pub fn inputs(&self) -> Result<Inputs> {
        match (&self.input, &self.p1, &self.p2) {
            (_, Some(p1), Some(p2)) => Ok(Inputs::Paired(p1.clone(), p2.clone())),
            (Some(input), None, None) => Ok(Inputs::Single(input.clone())),
            _ => Err(TrimError::InvalidArgument(
                "provide an input FASTQ or both --p1 and --p2".to_string(),
            )),
        }
    }

    pub fn compression(&self) -> Compression {
        if self.gz {
            Compression::Gzip
        } else if self.zstd {
            Compression::Zstd
        } else {
            Compression::None
        }
    }

    /// Output path for one mate: `<base>_R1.fastq[.gz|.zst]`
    pub fn mate_output(&self, base: &Path, mate: u8) -> PathBuf {
        let mut name = base.as_os_str().to_owned();
        name.push(format!("_R{mate}.fastq{}", self.compression().extension()));
        PathBuf::from(name)
    }

    fn algorithm(&self, kind: TrimmerKind) -> Result<TrimmingAlgorithm> {
        match kind {
            TrimmerKind::TrailingN => Ok(TrimmingAlgorithm::TrailingN),
            TrimmerKind::Mott => TrimmingAlgorithm::mott_quality(self.mott_threshold),
            TrimmerKind::Cut => TrimmingAlgorithm::cut(self.cut_5p, self.cut_3p),
        }
    }

    /// Builds the configured pipeline; every argument is validated here.
    pub fn build_pipeline(&self) -> Result<TrimAndFilterPipeline> {
        let steps = self
            .trimmers
            .iter()
            .map(|&kind| TrimmingStep::with_disabled_ends(self.algorithm(kind)?, self.disable_5p, self.disable_3p))
            .collect::<Result<Vec<_>>>()?;

        let mut filters: Vec<Arc<dyn ReadFilter>> = vec![Arc::new(ReadLengthFilter::new(
            self.min_length,
            self.max_length.unwrap_or(usize::MAX),
        )?)];
        if let Some(max_n) = self.max_n {
            filters.push(Arc::new(AmbiguousBaseFilter::new(max_n)));
        }

        Ok(TrimAndFilterPipeline::new(steps, filters)?
            .with_materializer(TrimMaterializer::new(self.mask_completely_trimmed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("readtrim").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_give_trailing_n_then_mott() -> Result<()> {
        let args = parse(&["in.fq"]);
        assert_eq!(args.trimmers, vec![TrimmerKind::TrailingN, TrimmerKind::Mott]);
        let names: Vec<String> = args.build_pipeline()?.trimmer_metrics().into_iter().map(|m| m.trimmer).collect();
        assert_eq!(names, ["TrailingNtrimmer", "MottQualityTrimmer"]);
        Ok(())
    }

    #[test]
    fn compression_flags_are_exclusive() {
        let args = parse(&["in.fq", "--gz", "--zstd"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn paired_needs_output() {
        let args = parse(&["--p1", "a.fq", "--p2", "b.fq"]);
        assert!(args.validate().is_err());
        let args = parse(&["--p1", "a.fq", "--p2", "b.fq", "-o", "out", "--zstd"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.mate_output(Path::new("out"), 2), PathBuf::from("out_R2.fastq.zst"));
    }

    #[test]
    fn invalid_trimmer_configuration_fails_fast() {
        assert!(parse(&["in.fq", "--trimmer", "cut"]).build_pipeline().is_err());
        assert!(parse(&["in.fq", "--mott-threshold", "-1"]).build_pipeline().is_err());
        assert!(parse(&["in.fq", "--disable-5p-trim", "--disable-3p-trim"]).build_pipeline().is_err());
        assert!(parse(&["in.fq", "--min-length", "50", "--max-length", "10"]).build_pipeline().is_err());
        assert!(parse(&["in.fq", "--trimmer", "cut", "--cut-3p", "5"]).build_pipeline().is_ok());
    }
}
