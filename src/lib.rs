pub mod aggregator;
pub mod args;
pub mod decompress;
pub mod ingest;
pub mod keys;
pub mod parser;
pub mod render;
pub mod scanner;
pub mod stats;
pub mod utils;

pub use aggregator::{Snapshot, UniqueAggregator};
pub use args::Args;
pub use ingest::ingest;
pub use parser::{parse_line, LogRecord};
pub use render::render;
pub use scanner::{run, scan_sources};
pub use stats::{IngestStats, ScanResult, SourceOutcome};
