//! Parser for the `gpu_usage` counter dump.
//!
//! The kernel emits one semicolon-delimited record per line:
//!
//! ```text
//! timestamp;25417338413
//! QUEUE;jobs;runtime;active
//! v3d_bin;9;14820417;0
//! v3d_render;9;26040919;0
//! ```
//!
//! Fields may be quoted and lines may end with a `;`. Any record outside the
//! known vocabulary is rejected rather than skipped, so format drift in the
//! kernel shows up as an error instead of as silently wrong percentages.

use std::str::FromStr;

use crate::error::{GpuUsageError, Result};
use crate::queue::is_queue_key;

const TIMESTAMP_TAG: &str = "timestamp";
const QUEUE_NAMES_TAG: &str = "QUEUE";

/// Minimum counters per queue line: job count and busy ticks.
pub const MIN_QUEUE_COUNTERS: usize = 2;

/// One parsed line of the counter dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Timestamp(i64),
    QueueNames(Vec<String>),
    Counters { key: String, values: Vec<i64> },
}

/// Counter vector of a single hardware queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueCounters {
    /// Key exactly as the kernel printed it, prefix included.
    pub key: String,
    pub counters: Vec<i64>,
}

/// Point-in-time reading of every queue plus the kernel timestamp.
///
/// Queues keep the order in which they appear in the dump; that order is the
/// order of the summary line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub timestamp: i64,
    /// Labels from the `QUEUE` header line. Informational only.
    pub queue_names: Vec<String>,
    pub queues: Vec<QueueCounters>,
}

impl Snapshot {
    /// Parse a complete counter dump.
    pub fn parse(text: &str) -> Result<Self> {
        let mut timestamp = None;
        let mut queue_names: Option<Vec<String>> = None;
        let mut queues: Vec<QueueCounters> = Vec::new();

        for line in text.lines() {
            match parse_line(line)? {
                Record::Timestamp(ts) => {
                    if timestamp.replace(ts).is_some() {
                        return Err(GpuUsageError::malformed(
                            &normalize_line(line),
                            "duplicate timestamp line",
                        ));
                    }
                }
                Record::QueueNames(names) => {
                    if queue_names.replace(names).is_some() {
                        return Err(GpuUsageError::malformed(
                            &normalize_line(line),
                            "duplicate QUEUE line",
                        ));
                    }
                }
                Record::Counters { key, values } => {
                    if queues.iter().any(|q| q.key == key) {
                        return Err(GpuUsageError::malformed(
                            &normalize_line(line),
                            "duplicate queue key",
                        ));
                    }
                    queues.push(QueueCounters {
                        key,
                        counters: values,
                    });
                }
            }
        }

        let timestamp = timestamp.ok_or(GpuUsageError::MissingTimestamp)?;
        let snapshot = Self {
            timestamp,
            queue_names: queue_names.unwrap_or_default(),
            queues,
        };
        log::debug!(
            "parsed snapshot at {} with {} queues {:?}",
            snapshot.timestamp,
            snapshot.queues.len(),
            snapshot.queue_names
        );
        Ok(snapshot)
    }

    /// Counters for `key`, matched exactly (prefix included).
    pub fn get(&self, key: &str) -> Option<&[i64]> {
        self.queues
            .iter()
            .find(|q| q.key == key)
            .map(|q| q.counters.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.queues.iter().map(|q| q.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

impl FromStr for Snapshot {
    type Err = GpuUsageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Split a raw line into fields: drop quote characters, trim, strip one
/// trailing `;`, split on `;`.
pub fn normalize_line(line: &str) -> Vec<String> {
    let unquoted: String = line.chars().filter(|c| *c != '\'' && *c != '"').collect();
    let trimmed = unquoted.trim();
    let body = trimmed.strip_suffix(';').unwrap_or(trimmed);
    body.split(';').map(str::to_string).collect()
}

/// Classify one line. Lines that are empty after normalization are
/// malformed like any other unknown record.
pub fn parse_line(line: &str) -> Result<Record> {
    let fields = normalize_line(line);
    let Some((tag, rest)) = fields.split_first() else {
        return Err(GpuUsageError::malformed(&fields, "empty record"));
    };

    let record = match tag.as_str() {
        TIMESTAMP_TAG => {
            let [value] = rest else {
                return Err(GpuUsageError::malformed(
                    &fields,
                    "timestamp line must carry exactly one value",
                ));
            };
            Record::Timestamp(parse_int(&fields, value)?)
        }
        QUEUE_NAMES_TAG => Record::QueueNames(rest.to_vec()),
        key if is_queue_key(key) => {
            if rest.len() < MIN_QUEUE_COUNTERS {
                return Err(GpuUsageError::malformed(
                    &fields,
                    format!("queue line needs at least {MIN_QUEUE_COUNTERS} counters"),
                ));
            }
            let values = rest
                .iter()
                .map(|v| parse_int(&fields, v))
                .collect::<Result<Vec<_>>>()?;
            Record::Counters {
                key: key.to_string(),
                values,
            }
        }
        _ => return Err(GpuUsageError::malformed(&fields, "unknown record type")),
    };
    Ok(record)
}

fn parse_int(fields: &[String], value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|e| GpuUsageError::malformed(fields, format!("bad integer `{value}`: {e}")))
}
