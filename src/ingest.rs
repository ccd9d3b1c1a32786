use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::aggregator::UniqueAggregator;
use crate::decompress::{self, Codec, TempArtifact};
use crate::keys::derive_keys;
use crate::parser::{parse_line, LogRecord};
use crate::stats::{IngestStats, SourceOutcome};

/// Scans one source into `aggregator`.
///
/// Compressed sources are decompressed next to the original and the
/// decompressed copy is removed once scanning ends, whatever the outcome.
/// A source whose decompression produced nothing, or whose decompressed path
/// is already taken by another file, is skipped. Failing to open
/// or read the plain file is returned as an error and is meant to end the run.
pub fn ingest(source: &Path, aggregator: &mut UniqueAggregator) -> Result<SourceOutcome> {
    let start_time = Instant::now();
    info!(action = "start", component = "ingest", source = ?source, "Scanning source");

    let artifact = match Codec::detect(source) {
        Some(codec) => match decompress::decompress(source, codec) {
            Some(artifact) => Some(artifact),
            None => {
                warn!(action = "skip", component = "ingest", source = ?source, "Could not unzip file");
                return Ok(SourceOutcome::Skipped);
            }
        },
        None => None,
    };
    let plain_path = artifact.as_ref().map_or(source, TempArtifact::path);

    let file = File::open(plain_path)
        .with_context(|| format!("Failed to open log source {:?}", plain_path))?;
    let stats = scan_lines(BufReader::new(file), aggregator)
        .with_context(|| format!("Failed to read log source {:?}", plain_path))?;

    info!(
        action = "complete",
        component = "ingest",
        source = ?source,
        lines_read = stats.lines_read,
        records_accepted = stats.records_accepted,
        lines_unparseable = stats.lines_unparseable,
        lines_bot = stats.lines_bot,
        duration_ms = start_time.elapsed().as_millis(),
        "Source scanned"
    );
    Ok(SourceOutcome::Scanned(stats))
}

/// Feeds every line of `reader` through the parser and bot filter.
///
/// Bytes that are not UTF-8 are replaced before parsing, so only I/O errors
/// can fail the scan.
pub fn scan_lines<R: BufRead>(
    mut reader: R,
    aggregator: &mut UniqueAggregator,
) -> io::Result<IngestStats> {
    let mut stats = IngestStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        stats.lines_read += 1;

        let line = String::from_utf8_lossy(trim_line_ending(&buf));
        let record = parse_line(&line);
        if !record.is_valid() {
            stats.lines_unparseable += 1;
            continue;
        }
        if record.is_bot() {
            stats.lines_bot += 1;
            continue;
        }

        record_visit(&record, aggregator);
        stats.records_accepted += 1;
    }

    Ok(stats)
}

/// Counts the record's client under both its daily and monthly key.
pub fn record_visit(record: &LogRecord, aggregator: &mut UniqueAggregator) {
    let keys = derive_keys(record);
    aggregator.insert(&keys.daily, &record.client_id);
    aggregator.insert(&keys.monthly, &record.client_id);
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scan(input: &str) -> (UniqueAggregator, IngestStats) {
        let mut aggregator = UniqueAggregator::new();
        let stats = scan_lines(Cursor::new(input.as_bytes()), &mut aggregator).unwrap();
        (aggregator, stats)
    }

    #[test]
    fn method_does_not_split_counts() {
        let (aggregator, stats) = scan(concat!(
            "1.2.3.4 - - [01/Jan/2024:10:00:00 +0000] \"GET /home HTTP/1.1\" 200 1 \"-\" \"Mozilla/5.0\"\n",
            "1.2.3.4 - - [01/Jan/2024:10:05:00 +0000] \"POST /home HTTP/1.1\" 200 1 \"-\" \"Mozilla/5.0\"\n",
        ));
        assert_eq!(stats.records_accepted, 2);
        assert_eq!(aggregator.unique_count("01/Jan/2024,/home"), 1);
        assert_eq!(aggregator.unique_count("Jan/2024,/home"), 1);
        assert_eq!(aggregator.len(), 2);
    }

    #[test]
    fn unparseable_and_bot_lines_leave_state_untouched() {
        let (aggregator, stats) = scan(concat!(
            "this is not a log line\n",
            "\n",
            "1.2.3.4 - - [01/Jan/2024:10:00:00 +0000] \"GET /home\n",
            "66.249.66.1 - - [01/Jan/2024:10:00:00 +0000] \"GET /home HTTP/1.1\" 200 1 \"-\" \"AhrefsBot/7.0\"\n",
        ));
        assert!(aggregator.is_empty());
        assert_eq!(
            stats,
            IngestStats {
                lines_read: 4,
                records_accepted: 0,
                lines_unparseable: 3,
                lines_bot: 1,
            }
        );
    }

    #[test]
    fn handles_crlf_and_missing_final_newline() {
        let (aggregator, stats) = scan(concat!(
            "1.2.3.4 - - [01/Jan/2024:10:00:00 +0000] \"GET /a HTTP/1.1\" 200 1 \"-\" \"Mozilla/5.0\"\r\n",
            "5.6.7.8 - - [02/Jan/2024:10:00:00 +0000] \"GET /a HTTP/1.1\" 200 1 \"-\" \"Mozilla/5.0\"",
        ));
        assert_eq!(stats.lines_read, 2);
        assert_eq!(aggregator.unique_count("01/Jan/2024,/a"), 1);
        assert_eq!(aggregator.unique_count("02/Jan/2024,/a"), 1);
        assert_eq!(aggregator.unique_count("Jan/2024,/a"), 2);
    }

    #[test]
    fn invalid_utf8_does_not_abort_scan() {
        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(
            b"1.2.3.4 - - [01/Jan/2024:10:00:00 +0000] \"GET /x HTTP/1.1\" 200 1 \"-\" \"Mozilla/5.0\"\n",
        );
        let mut aggregator = UniqueAggregator::new();
        let stats = scan_lines(Cursor::new(input), &mut aggregator).unwrap();
        assert_eq!(stats.lines_unparseable, 1);
        assert_eq!(aggregator.unique_count("Jan/2024,/x"), 1);
    }

    #[test]
    fn missing_plain_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut aggregator = UniqueAggregator::new();
        let err = ingest(&dir.path().join("absent.log"), &mut aggregator).unwrap_err();
        assert!(err.to_string().contains("Failed to open log source"));
    }
}
