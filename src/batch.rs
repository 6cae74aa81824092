//! Runs a pipeline over batches of reads on the rayon thread pool.
//!
//! Each worker gets its own fork of the pipeline; counters are merged back
//! into the caller's pipeline in chunk order once the batch is done.

use rayon::prelude::*;

use crate::error::Result;
use crate::pair::fix_pair_tag;
use crate::pipeline::TrimAndFilterPipeline;
use crate::read::Read;

fn chunk_size(len: usize) -> usize {
    (len / rayon::current_num_threads()).max(1)
}

fn run_chunks<T, F>(pipeline: &mut TrimAndFilterPipeline, items: &mut [T], process: F) -> Result<Vec<bool>>
where
    T: Send,
    F: Fn(&mut TrimAndFilterPipeline, &mut T) -> Result<bool> + Sync,
{
    let template = &*pipeline;
    let results = items
        .par_chunks_mut(chunk_size(items.len()))
        .map(|chunk| -> Result<(Vec<bool>, TrimAndFilterPipeline)> {
            let mut worker = template.fork();
            let verdicts = chunk
                .iter_mut()
                .map(|item| process(&mut worker, item))
                .collect::<Result<Vec<bool>>>()?;
            Ok((verdicts, worker))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut verdicts = Vec::with_capacity(items.len());
    for (chunk_verdicts, worker) in results {
        pipeline.merge(&worker);
        verdicts.extend(chunk_verdicts);
    }
    Ok(verdicts)
}

/// Trims and filters every read; returns one verdict per read, in order.
pub fn process_reads(pipeline: &mut TrimAndFilterPipeline, reads: &mut [Read]) -> Result<Vec<bool>> {
    run_chunks(pipeline, reads, |worker, read| worker.accepts(read))
}

/// Trims and filters both mates, then reconciles `pair_tags` across them.
///
/// Both mates are always evaluated; a pair is kept only if both are accepted.
pub fn process_pairs(
    pipeline: &mut TrimAndFilterPipeline,
    pairs: &mut [(Read, Read)],
    pair_tags: &[String],
) -> Result<Vec<bool>> {
    run_chunks(pipeline, pairs, |worker, (first, second)| {
        let first_ok = worker.accepts(first)?;
        let second_ok = worker.accepts(second)?;
        for tag in pair_tags {
            fix_pair_tag(tag, first, second);
        }
        Ok(first_ok && second_ok)
    })
}
