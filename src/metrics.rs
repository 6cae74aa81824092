//! Tab-separated metrics tables for trimmers and filters.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::pipeline::TrimAndFilterPipeline;

fn write_table<W: io::Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut tsv = csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer);
    for row in rows {
        tsv.serialize(row)?;
    }
    tsv.flush()?;
    Ok(())
}

pub fn write_trimmer_metrics<W: io::Write>(writer: W, pipeline: &TrimAndFilterPipeline) -> Result<()> {
    write_table(writer, &pipeline.trimmer_metrics())
}

pub fn write_filter_metrics<W: io::Write>(writer: W, pipeline: &TrimAndFilterPipeline) -> Result<()> {
    write_table(writer, &pipeline.filter_metrics())
}

/// Writes `<prefix>.trimmer_metrics.tsv` and `<prefix>.filter_metrics.tsv`, returning both paths.
pub fn write_metrics(prefix: &Path, pipeline: &TrimAndFilterPipeline) -> Result<(PathBuf, PathBuf)> {
    let with_suffix = |suffix: &str| {
        let mut name = prefix.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    };
    let trimmer_path = with_suffix(".trimmer_metrics.tsv");
    let filter_path = with_suffix(".filter_metrics.tsv");
    write_trimmer_metrics(File::create(&trimmer_path)?, pipeline)?;
    write_filter_metrics(File::create(&filter_path)?, pipeline)?;
    Ok((trimmer_path, filter_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::filter::ReadLengthFilter;
    use crate::read::Read;
    use crate::trim::TrimmingAlgorithm;
    use crate::trimmer::TrimmingStep;

    #[test]
    fn tables_have_headers_and_rows() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut pipeline = TrimAndFilterPipeline::new(
            vec![TrimmingStep::new(TrimmingAlgorithm::TrailingN)],
            vec![Arc::new(ReadLengthFilter::new(1, 10)?)],
        )?;
        pipeline.accepts(&mut Read::unmapped("r", b"NACG", &[30; 4]))?;

        let mut trimmers = Vec::new();
        write_trimmer_metrics(&mut trimmers, &pipeline)?;
        assert_eq!(
            String::from_utf8(trimmers)?,
            "trimmer\ttotal\ttrimmed_5p\ttrimmed_3p\tcompletely_trimmed\nTrailingNtrimmer\t1\t1\t0\t0\n"
        );

        let mut filters = Vec::new();
        write_filter_metrics(&mut filters, &pipeline)?;
        assert_eq!(String::from_utf8(filters)?, "filter\ttotal\tpassed\nReadLengthReadFilter\t1\t1\n");
        Ok(())
    }

    #[test]
    fn files_are_named_after_prefix() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let td = tempfile::tempdir()?;
        let pipeline = TrimAndFilterPipeline::new(vec![TrimmingStep::new(TrimmingAlgorithm::TrailingN)], vec![])?;
        let (trimmers, filters) = write_metrics(&td.path().join("run"), &pipeline)?;
        assert!(trimmers.ends_with("run.trimmer_metrics.tsv"));
        assert!(filters.ends_with("run.filter_metrics.tsv"));
        assert_eq!(std::fs::read_to_string(filters)?, "");
        Ok(())
    }
}
