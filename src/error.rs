//! Error types for readtrim

use thiserror::Error;

/// Result type alias for readtrim operations
pub type Result<T> = std::result::Result<T, TrimError>;

/// Error types that can occur while trimming and filtering reads
#[derive(Debug, Error)]
pub enum TrimError {
    /// A parameter or call violated its contract (bad threshold, empty cut, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A component was reconfigured after it was validated or used
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// The alignment of a mapped read cannot express the requested clip
    #[error("Cannot clip alignment: {0}")]
    Clipping(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed FASTQ input
    #[error("Invalid FASTQ record: {0}")]
    Fastq(#[from] bio::io::fastq::Error),

    /// Failure writing a metrics table
    #[error("Metrics output error: {0}")]
    Csv(#[from] csv::Error),

    /// Paired-end inputs hold a different number of records
    #[error("Paired-end files have different lengths")]
    PairedEndLengthMismatch,
}
