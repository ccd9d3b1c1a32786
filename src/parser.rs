use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;

/// Delimiter between the client identifier and the bracketed timestamp in
/// combined log format. Lines without it are not log lines.
const LOG_MARKER: &str = " - - [";

/// Substring (compared lower-cased) that marks crawler user agents.
const BOT_MARKER: &str = "bot";

// Positions in the token stream produced by TOKEN_PATTERN.
const REQUEST_FIELD: usize = 5;
const AGENT_FIELD: usize = 9;

// Bare words, double-quoted segments, or a single-quoted run. The single
// quote branch has no closing quote so stray apostrophes never stall a match.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^\s"']+|"([^"]*)"|'([^']*)"#).expect("token pattern is a valid regex")
});

/// One access-log line broken into the fields used for counting.
///
/// An empty `client_id` marks a line that could not be parsed; callers must
/// drop such records.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub client_id: String,
    /// Date portion of the timestamp, e.g. `15/Mar/2024`.
    pub day: String,
    /// Request path without query or fragment, percent-decoded and lower-cased.
    pub path: String,
    /// User agent with its quote characters removed.
    pub agent_marker: String,
}

impl LogRecord {
    pub fn is_valid(&self) -> bool {
        !self.client_id.is_empty()
    }

    pub fn is_bot(&self) -> bool {
        self.agent_marker.to_lowercase().contains(BOT_MARKER)
    }
}

/// Parses a single combined-format log line.
///
/// Never fails: anything that does not fit the layout comes back as
/// `LogRecord::default()`, which reports `is_valid() == false`.
pub fn parse_line(line: &str) -> LogRecord {
    if !line.contains(LOG_MARKER) {
        return LogRecord::default();
    }
    extract_fields(line).unwrap_or_default()
}

/// Splits a line into bare words and quoted segments. Quoted segments keep
/// their quote characters.
pub fn tokenize(line: &str) -> Vec<&str> {
    TOKEN_PATTERN.find_iter(line).map(|m| m.as_str()).collect()
}

fn extract_fields(line: &str) -> Option<LogRecord> {
    let tokens = tokenize(line);
    if tokens.len() <= AGENT_FIELD {
        return None;
    }

    let client_id = line
        .split(char::is_whitespace)
        .next()
        .filter(|id| !id.is_empty())?;

    let (_, timestamp) = line.split_once('[')?;
    let day = timestamp.split(':').next().unwrap_or(timestamp);

    let target = tokens[REQUEST_FIELD].trim_matches('"').split(' ').nth(1)?;
    let path = normalize_path(target)?;

    Some(LogRecord {
        client_id: client_id.to_string(),
        day: day.to_string(),
        path,
        agent_marker: tokens[AGENT_FIELD].replace('"', ""),
    })
}

/// Reduces a request target to its lower-cased, percent-decoded path.
///
/// Returns `None` for malformed escapes (`%` not followed by two hex digits)
/// or when the decoded bytes are not UTF-8.
pub fn normalize_path(target: &str) -> Option<String> {
    let end = target.find(|c: char| c == '?' || c == '#').unwrap_or(target.len());
    let raw = &target[..end];
    if !has_valid_escapes(raw) {
        return None;
    }
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    Some(decoded.to_lowercase())
}

fn has_valid_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        match bytes.get(i + 1..i + 3) {
            Some(hex) if hex.iter().all(u8::is_ascii_hexdigit) => i += 3,
            _ => return false,
        }
    }
    true
}
