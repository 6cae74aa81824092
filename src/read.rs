//! Sequencing read record used throughout the trimming pipeline.
//!
//! Bases are stored as ASCII, qualities as numeric Phred scores (the
//! Phred+33 offset is removed when a FASTQ record is converted).

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use bio::io::fastq;

use crate::cigar::Alignment;
use crate::error::{Result, TrimError};
use crate::trim_state::{self, CompletelyTrimmed, TrimPoints};

/// Offset of the canonical (Sanger) quality encoding
pub const PHRED_OFFSET: u8 = 33;
/// Base written over masked positions
pub const NO_CALL_BASE: u8 = b'N';
/// Quality written over masked positions
pub const MIN_PHRED: u8 = 0;

/// Per-base insertion qualities (SAM `BI`)
pub const TAG_BASE_INSERTION_QUALITIES: &str = "BI";
/// Per-base deletion qualities (SAM `BD`)
pub const TAG_BASE_DELETION_QUALITIES: &str = "BD";

/// Scalar attribute attached to a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Int(i64),
    String(String),
}

impl TagValue {
    fn type_code(&self) -> char {
        match self {
            TagValue::Int(_) => 'i',
            TagValue::String(_) => 'Z',
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Int(v) => write!(f, "{v}"),
            TagValue::String(v) => f.write_str(v),
        }
    }
}

impl From<i64> for TagValue {
    fn from(v: i64) -> Self {
        TagValue::Int(v)
    }
}

impl From<&str> for TagValue {
    fn from(v: &str) -> Self {
        TagValue::String(v.to_string())
    }
}

/// A single sequencing read, optionally aligned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Read {
    pub name: String,
    pub bases: Vec<u8>,
    /// Numeric Phred scores, same length as `bases`
    pub qualities: Vec<u8>,
    pub tags: BTreeMap<String, TagValue>,
    /// `None` for unmapped reads
    pub alignment: Option<Alignment>,
    pub(crate) trim: TrimPoints,
    /// Description tokens that are not tags, kept verbatim
    comment: Vec<String>,
}

impl Read {
    pub fn unmapped(name: impl Into<String>, bases: &[u8], qualities: &[u8]) -> Self {
        Self {
            name: name.into(),
            bases: bases.to_vec(),
            qualities: qualities.to_vec(),
            ..Default::default()
        }
    }

    pub fn mapped(name: impl Into<String>, bases: &[u8], qualities: &[u8], alignment: Alignment) -> Self {
        Self {
            alignment: Some(alignment),
            ..Self::unmapped(name, bases, qualities)
        }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn is_mapped(&self) -> bool {
        self.alignment.is_some()
    }

    pub fn tag(&self, name: &str) -> Option<&TagValue> {
        self.tags.get(name)
    }

    pub fn set_tag(&mut self, name: &str, value: impl Into<TagValue>) {
        self.tags.insert(name.to_string(), value.into());
    }

    pub fn remove_tag(&mut self, name: &str) -> Option<TagValue> {
        self.tags.remove(name)
    }

    /// Builds a read from a Phred+33 FASTQ record.
    ///
    /// Description tokens shaped like `XX:i:123` or `XX:Z:text` become tags;
    /// `ts`, `te` and `ct` restore pending trim state written by an earlier run.
    pub fn from_fastq(record: &fastq::Record) -> Result<Self> {
        if record.seq().len() != record.qual().len() {
            return Err(TrimError::InvalidArgument(format!(
                "record {} has {} bases but {} qualities",
                record.id(),
                record.seq().len(),
                record.qual().len()
            )));
        }
        let mut read = Read::unmapped(record.id(), record.seq(), &[]);
        read.qualities = record.qual().iter().map(|q| q.saturating_sub(PHRED_OFFSET)).collect();

        for token in record.desc().unwrap_or_default().split_whitespace() {
            match parse_tag(token) {
                Some((name, value)) => read.restore_tag(name, value)?,
                None => read.comment.push(token.to_string()),
            }
        }

        let len = read.len();
        for (tag, point) in [(trim_state::TAG_START, read.trim.start), (trim_state::TAG_END, read.trim.end)] {
            if let Some(point) = point.filter(|&p| p > len) {
                return Err(TrimError::InvalidArgument(format!(
                    "record {}: {tag}:i:{point} is past the read length {len}",
                    read.name
                )));
            }
        }
        Ok(read)
    }

    fn restore_tag(&mut self, name: &str, value: TagValue) -> Result<()> {
        let as_position = |value: &TagValue| match value {
            TagValue::Int(v) if *v >= 0 => Ok(*v as usize),
            other => Err(TrimError::InvalidArgument(format!(
                "trim tag {name} must be a non-negative integer, found {other}"
            ))),
        };
        match name {
            trim_state::TAG_START => self.trim.start = Some(as_position(&value)?),
            trim_state::TAG_END => self.trim.end = Some(as_position(&value)?),
            trim_state::TAG_COMPLETELY_TRIMMED => {
                let code = as_position(&value)?;
                self.trim.completely_trimmed = CompletelyTrimmed::from_code(code).ok_or_else(|| {
                    TrimError::InvalidArgument(format!("unknown completely-trimmed code {code}"))
                })?;
            }
            _ => {
                self.tags.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    /// Description line for FASTQ output: comment tokens, tags, then the trim state
    pub fn description(&self) -> Option<String> {
        let mut tokens = self.comment.clone();
        tokens.extend(
            self.tags
                .iter()
                .map(|(name, value)| format!("{name}:{}:{value}", value.type_code())),
        );
        if let Some(start) = self.trim.start {
            tokens.push(format!("{}:i:{start}", trim_state::TAG_START));
        }
        if let Some(end) = self.trim.end {
            tokens.push(format!("{}:i:{end}", trim_state::TAG_END));
        }
        let ct = self.trim.completely_trimmed;
        if ct.is_trimmed() {
            tokens.push(format!("{}:i:{}", trim_state::TAG_COMPLETELY_TRIMMED, ct.code()));
        }
        (!tokens.is_empty()).then(|| tokens.join(" "))
    }

    pub fn write_fastq<W: Write>(&self, writer: &mut fastq::Writer<W>) -> io::Result<()> {
        let qual: Vec<u8> = self.qualities.iter().map(|q| q.saturating_add(PHRED_OFFSET)).collect();
        writer.write(&self.name, self.description().as_deref(), &self.bases, &qual)
    }
}

fn parse_tag(token: &str) -> Option<(&str, TagValue)> {
    let mut parts = token.splitn(3, ':');
    let (name, kind, value) = (parts.next()?, parts.next()?, parts.next()?);
    if name.len() != 2 || !name.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    match kind {
        "i" => value.parse().ok().map(|v| (name, TagValue::Int(v))),
        "Z" => Some((name, TagValue::String(value.to_string()))),
        _ => None,
    }
}
