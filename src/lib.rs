//! Per-read trimming and filtering of sequencing reads.
//!
//! Trimming steps record a pending `[start, end)` interval on each read, the
//! materializer cuts the read down to it, and filters decide whether the read
//! is kept. Per-step counters are collected along the way.

pub mod batch;
pub mod cigar;
pub mod config;
pub mod error;
pub mod filter;
pub mod io_utils;
pub mod materialize;
pub mod metrics;
pub mod pair;
pub mod pipeline;
pub mod read;
pub mod trim;
pub mod trim_state;
pub mod trimmer;

pub use error::{Result, TrimError};
pub use filter::ReadFilter;
pub use pipeline::TrimAndFilterPipeline;
pub use read::Read;
pub use trim::TrimmingAlgorithm;
pub use trimmer::TrimmingStep;
