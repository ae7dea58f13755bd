//! Streaming JSONL record parser.
//!
//! Each line is decoded independently. Lines that are blank, not valid JSON,
//! lack a parseable `timestamp`, or fall outside the [`DayWindow`] are dropped
//! without error; a bad line never ends the file.

use crate::day_window::DayWindow;
use crate::models::*;
use crate::timestamp_parser::TimestampParser;
use anyhow::{Context, Result};
use futures::stream::{self, Stream};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// What happened to a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Record(UsageRecord),
    Blank,
    Malformed,
    MissingTimestamp,
    OutsideWindow,
}

/// Per-file line counts, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines: usize,
    pub records: usize,
    pub malformed: usize,
    pub missing_timestamp: usize,
    pub outside_window: usize,
}

impl ParseStats {
    fn count(&mut self, outcome: &LineOutcome) {
        self.lines += 1;
        match outcome {
            LineOutcome::Record(_) => self.records += 1,
            LineOutcome::Malformed => self.malformed += 1,
            LineOutcome::MissingTimestamp => self.missing_timestamp += 1,
            LineOutcome::OutsideWindow => self.outside_window += 1,
            LineOutcome::Blank => {}
        }
    }
}

/// Decode and classify one line.
pub fn classify_line(line: &str, window: &DayWindow) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() {
        return LineOutcome::Blank;
    }

    let entry = match serde_json::from_str::<UsageEntry>(line) {
        Ok(entry) => entry,
        Err(_) => return LineOutcome::Malformed,
    };

    let timestamp = match entry.timestamp.as_deref().map(TimestampParser::parse) {
        Some(Ok(ts)) => ts,
        _ => return LineOutcome::MissingTimestamp,
    };

    if !window.contains(&timestamp) {
        return LineOutcome::OutsideWindow;
    }

    let (model, usage) = match entry.message {
        Some(message) => (message.model, message.usage.unwrap_or_default()),
        None => (None, UsageData::default()),
    };

    let pricing = match (entry.cost_usd, model) {
        (Some(cost), _) => RecordPricing::Precomputed(cost),
        (None, Some(model)) if !model.is_empty() => RecordPricing::Model(model),
        _ => RecordPricing::Unpriced,
    };

    LineOutcome::Record(UsageRecord {
        timestamp,
        pricing,
        usage: usage.into(),
    })
}

/// Decode one line, keeping it only if it is an in-window record.
pub fn parse_line(line: &str, window: &DayWindow) -> Option<UsageRecord> {
    match classify_line(line, window) {
        LineOutcome::Record(record) => Some(record),
        _ => None,
    }
}

/// Lazily yields in-window records from a line-delimited source.
///
/// One pass only; reopen the file to read it again.
pub struct RecordReader<R> {
    reader: R,
    buf: Vec<u8>,
    window: DayWindow,
    source: PathBuf,
    stats: ParseStats,
    done: bool,
}

impl RecordReader<BufReader<File>> {
    pub async fn open(path: &Path, window: DayWindow) -> Result<Self> {
        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        Ok(Self::with_source(BufReader::new(file), window, path))
    }
}

impl<R: AsyncBufRead + Unpin> RecordReader<R> {
    pub fn new(reader: R, window: DayWindow) -> Self {
        Self::with_source(reader, window, Path::new("<stream>"))
    }

    fn with_source(reader: R, window: DayWindow, source: &Path) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(8 * 1024),
            window,
            source: source.to_path_buf(),
            stats: ParseStats::default(),
            done: false,
        }
    }

    /// Next in-window record, or `None` once the source is exhausted.
    ///
    /// A read error ends the stream early; records already yielded stand.
    pub async fn next_record(&mut self) -> Option<UsageRecord> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf).await {
                Ok(0) => {
                    self.done = true;
                    debug!(
                        file = %self.source.display(),
                        lines = self.stats.lines,
                        records = self.stats.records,
                        malformed = self.stats.malformed,
                        "Finished reading log file"
                    );
                }
                Ok(_) => {
                    let outcome = match std::str::from_utf8(&self.buf) {
                        Ok(line) => classify_line(line, &self.window),
                        Err(_) => LineOutcome::Malformed,
                    };
                    self.stats.count(&outcome);
                    if let LineOutcome::Record(record) = outcome {
                        return Some(record);
                    }
                }
                Err(e) => {
                    self.done = true;
                    warn!(
                        file = %self.source.display(),
                        line = self.stats.lines + 1,
                        error = %e,
                        "Stopped reading log file after read error"
                    );
                }
            }
        }
        None
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    pub fn into_stream(self) -> impl Stream<Item = UsageRecord> {
        stream::unfold(self, |mut reader| async move {
            reader.next_record().await.map(|record| (record, reader))
        })
    }
}
