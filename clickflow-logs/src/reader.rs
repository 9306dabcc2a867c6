use crate::error::{LogError, Result};
use crate::event::{VisitEvent, is_marker};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Prefix removed from every screen path unless configured otherwise.
pub const DEFAULT_STRIP_PREFIX: &str = "/ca/ca";

const FIELDS_PER_RECORD: usize = 3;
const PROGRESS_INTERVAL: usize = 1000;

/// Called with the number of records read so far.
pub type ProgressCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Reads `;`-separated clickstream logs: `timestamp;session id;screen path`.
///
/// Lines starting with `#` are comments. Any malformed record aborts the
/// whole read; nothing is skipped.
pub struct LogReader {
    strip_prefix: String,
    progress_callback: Option<ProgressCallback>,
}

impl LogReader {
    pub fn new() -> Self {
        Self {
            strip_prefix: DEFAULT_STRIP_PREFIX.to_string(),
            progress_callback: None,
        }
    }

    pub fn with_strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.strip_prefix = prefix.into();
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<VisitEvent>> {
        info!("Reading visits from {}", path.as_ref().display());
        let file = File::open(path)?;
        self.read_from(file)
    }

    pub fn read_from<R: Read>(&self, rdr: R) -> Result<Vec<VisitEvent>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .comment(Some(b'#'))
            .has_headers(false)
            // field count is checked per record so the error names the line
            .flexible(true)
            .from_reader(rdr);

        let mut events = Vec::new();
        for record in reader.records() {
            let record = record?;
            events.push(self.parse_record(&record)?);

            if events.len() % PROGRESS_INTERVAL == 0
                && let Some(ref callback) = self.progress_callback
            {
                callback(events.len());
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback(events.len());
        }
        debug!("Read {} visit records", events.len());
        Ok(events)
    }

    fn parse_record(&self, record: &StringRecord) -> Result<VisitEvent> {
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() != FIELDS_PER_RECORD {
            return Err(LogError::FieldCount {
                line,
                found: record.len(),
            });
        }

        let raw_timestamp = &record[0];
        let timestamp = parse_timestamp(raw_timestamp).map_err(|e| match e {
            TimestampError::Parse(source) => LogError::InvalidTimestamp {
                line,
                value: raw_timestamp.to_string(),
                source,
            },
            TimestampError::OutOfRange => LogError::TimestampOutOfRange {
                line,
                value: raw_timestamp.to_string(),
            },
        })?;

        let screen_name = screen_name_from_path(&record[2], &self.strip_prefix);
        if is_marker(&screen_name) {
            return Err(LogError::ReservedScreen {
                line,
                name: screen_name,
            });
        }

        Ok(VisitEvent {
            timestamp,
            session_id: record[1].trim().to_string(),
            screen_name,
        })
    }
}

impl Default for LogReader {
    fn default() -> Self {
        Self::new()
    }
}

enum TimestampError {
    Parse(std::num::ParseFloatError),
    OutOfRange,
}

/// Timestamps are real numbers; the fractional part is dropped.
fn parse_timestamp(value: &str) -> std::result::Result<i64, TimestampError> {
    let parsed: f64 = value.trim().parse().map_err(TimestampError::Parse)?;
    if !parsed.is_finite() || parsed <= i64::MIN as f64 || parsed >= i64::MAX as f64 {
        return Err(TimestampError::OutOfRange);
    }
    Ok(parsed.trunc() as i64)
}

/// Removes every occurrence of `prefix` from a screen path and trims the rest.
pub fn screen_name_from_path(path: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        path.trim().to_string()
    } else {
        path.replace(prefix, "").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_truncates_fraction() {
        assert!(matches!(parse_timestamp("12.9"), Ok(12)));
        assert!(matches!(parse_timestamp(" 7 "), Ok(7)));
        assert!(matches!(parse_timestamp("-3.5"), Ok(-3)));
    }

    #[test]
    fn test_parse_timestamp_rejects_non_finite() {
        assert!(matches!(parse_timestamp("inf"), Err(TimestampError::OutOfRange)));
        assert!(matches!(parse_timestamp("NaN"), Err(TimestampError::OutOfRange)));
        assert!(matches!(parse_timestamp("abc"), Err(TimestampError::Parse(_))));
    }
}
