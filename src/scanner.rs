use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::aggregator::UniqueAggregator;
use crate::ingest::ingest;
use crate::render::render;
use crate::stats::{ScanResult, ScanTotals, SourceOutcome};
use crate::Args;

/// Scans all sources, then renders the unique-visitor counts.
pub fn run(args: &Args) -> Result<String> {
    let workers = resolve_workers(args.workers);
    let result = scan_sources(&args.files, workers)?;
    Ok(render(&result.aggregator.snapshot()))
}

/// One worker unless more were asked for; never more than the CPU count.
pub fn resolve_workers(requested: Option<usize>) -> usize {
    requested.map_or(1, |n| n.clamp(1, num_cpus::get().max(1)))
}

/// Ingests `sources` into a fresh aggregator.
///
/// With one worker the sources are read in order. With more, each source
/// fills its own aggregator on the rayon pool and the partial results are
/// merged once every source is done. Either way the first fatal source error
/// is returned and nothing is rendered.
pub fn scan_sources(sources: &[PathBuf], workers: usize) -> Result<ScanResult> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "scan",
        source_count = sources.len(),
        worker_count = workers,
        "Starting log scan"
    );

    let mut aggregator = UniqueAggregator::new();
    let mut totals = ScanTotals::default();

    if workers <= 1 {
        for source in sources {
            totals.record(ingest(source, &mut aggregator)?);
        }
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .context("Failed to build worker pool")?;

        let partials: Vec<(UniqueAggregator, SourceOutcome)> = pool.install(|| {
            sources
                .par_iter()
                .map(|source| -> Result<(UniqueAggregator, SourceOutcome)> {
                    let mut partial = UniqueAggregator::new();
                    let outcome = ingest(source, &mut partial)?;
                    Ok((partial, outcome))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        for (partial, outcome) in partials {
            aggregator.merge(partial);
            totals.record(outcome);
        }
    }

    info!(
        action = "complete",
        component = "scan",
        sources_scanned = totals.sources_scanned,
        sources_skipped = totals.sources_skipped,
        lines_read = totals.lines.lines_read,
        records_accepted = totals.lines.records_accepted,
        unique_keys = aggregator.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Log scan completed"
    );

    Ok(ScanResult { aggregator, totals })
}
