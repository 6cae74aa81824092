use clap::Parser;
use std::error::Error;
use bio::io::fastq;
use log::info;

use readtrim::batch::{process_pairs, process_reads};
use readtrim::config::{Args, Inputs};
use readtrim::io_utils::{open_input, open_output};
use readtrim::{metrics, Read, TrimAndFilterPipeline, TrimError};

type FastqRecords = Box<dyn Iterator<Item = Result<fastq::Record, fastq::Error>>>;

fn records(path: &str) -> Result<FastqRecords, TrimError> {
    Ok(Box::new(fastq::Reader::new(open_input(path)?).records()))
}

fn next_batch(records: &mut FastqRecords, size: usize) -> Result<Vec<Read>, TrimError> {
    records.by_ref().take(size).map(|rec| Read::from_fastq(&rec?)).collect()
}

/// Prints to stdout unless stdout carries the reads themselves.
fn report(args: &Args, lines: &[String]) {
    for line in lines {
        if args.output.is_some() {
            println!("{line}");
        } else {
            info!("{line}");
        }
    }
}

fn run_single(args: &Args, input: &str, pipeline: &mut TrimAndFilterPipeline) -> Result<(), Box<dyn Error>> {
    let mut records = records(input)?;
    let mut writer = fastq::Writer::new(open_output(args.output.as_deref(), args.compression())?);

    let mut read_count: u64 = 0;
    let mut passed: u64 = 0;
    loop {
        let mut batch = next_batch(&mut records, args.batch_size)?;
        if batch.is_empty() {
            break;
        }
        let verdicts = process_reads(pipeline, &mut batch)?;
        read_count += batch.len() as u64;
        for (read, keep) in batch.iter().zip(verdicts) {
            if keep {
                read.write_fastq(&mut writer)?;
                passed += 1;
            }
        }
    }
    writer.flush()?;

    report(args, &[format!("reads: {}", read_count), format!("passed: {}", passed)]);
    Ok(())
}

fn run_paired(args: &Args, p1: &str, p2: &str, pipeline: &mut TrimAndFilterPipeline) -> Result<(), Box<dyn Error>> {
    let base = args.output.as_deref().ok_or_else(|| {
        TrimError::InvalidArgument("--output is required for paired-end input".to_string())
    })?;
    let (out1, out2) = (args.mate_output(base, 1), args.mate_output(base, 2));
    info!("Writing {} and {}", out1.display(), out2.display());

    let mut records1 = records(p1)?;
    let mut records2 = records(p2)?;
    let mut writer1 = fastq::Writer::new(open_output(Some(out1.as_path()), args.compression())?);
    let mut writer2 = fastq::Writer::new(open_output(Some(out2.as_path()), args.compression())?);

    let mut pair_count: u64 = 0;
    let mut passed: u64 = 0;
    loop {
        let batch1 = next_batch(&mut records1, args.batch_size)?;
        let batch2 = next_batch(&mut records2, args.batch_size)?;
        if batch1.len() != batch2.len() {
            return Err(TrimError::PairedEndLengthMismatch.into());
        }
        if batch1.is_empty() {
            break;
        }

        let mut pairs: Vec<(Read, Read)> = batch1.into_iter().zip(batch2).collect();
        let verdicts = process_pairs(pipeline, &mut pairs, &args.pair_tags)?;
        pair_count += pairs.len() as u64;
        for ((r1, r2), keep) in pairs.iter().zip(verdicts) {
            if keep {
                r1.write_fastq(&mut writer1)?;
                r2.write_fastq(&mut writer2)?;
                passed += 1;
            }
        }
    }
    writer1.flush()?;
    writer2.flush()?;

    report(
        args,
        &[
            format!("R1 reads: {}", pair_count),
            format!("R2 reads: {}", pair_count),
            format!("total pairs: {}", pair_count),
            format!("passed pairs: {}", passed),
        ],
    );
    Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    args.validate()?;
    let inputs = args.inputs()?;
    let mut pipeline = args.build_pipeline()?;

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new().num_threads(args.threads).build_global()?;
    }

    info!("Trim reads");
    info!("  Input: {:?}", inputs);
    info!("  Trimmers: {:?}", args.trimmers);
    info!("  Disabled ends: 5'={} 3'={}", args.disable_5p, args.disable_3p);
    info!("  Threads: {}", rayon::current_num_threads());

    match &inputs {
        Inputs::Single(input) => run_single(&args, input, &mut pipeline)?,
        Inputs::Paired(p1, p2) => run_paired(&args, p1, p2, &mut pipeline)?,
    }

    for m in pipeline.trimmer_metrics() {
        info!(
            "{}: {} reads, {} trimmed 5', {} trimmed 3', {} completely trimmed",
            m.trimmer, m.total, m.trimmed_5p, m.trimmed_3p, m.completely_trimmed
        );
    }
    if let Some(prefix) = &args.metrics {
        let (trimmers, filters) = metrics::write_metrics(prefix, &pipeline)?;
        info!("Metrics written to {} and {}", trimmers.display(), filters.display());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
