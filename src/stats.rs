use std::ops::AddAssign;

use crate::aggregator::UniqueAggregator;

/// Line counters for one scanned source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub lines_read: u64,
    pub records_accepted: u64,
    pub lines_unparseable: u64,
    pub lines_bot: u64,
}

impl AddAssign for IngestStats {
    fn add_assign(&mut self, other: Self) {
        self.lines_read += other.lines_read;
        self.records_accepted += other.records_accepted;
        self.lines_unparseable += other.lines_unparseable;
        self.lines_bot += other.lines_bot;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    Scanned(IngestStats),
    /// Decompression failed and left nothing to read.
    Skipped,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanTotals {
    pub sources_scanned: usize,
    pub sources_skipped: usize,
    pub lines: IngestStats,
}

impl ScanTotals {
    pub fn record(&mut self, outcome: SourceOutcome) {
        match outcome {
            SourceOutcome::Scanned(stats) => {
                self.sources_scanned += 1;
                self.lines += stats;
            }
            SourceOutcome::Skipped => self.sources_skipped += 1,
        }
    }
}

#[derive(Debug)]
pub struct ScanResult {
    pub aggregator: UniqueAggregator,
    pub totals: ScanTotals,
}
