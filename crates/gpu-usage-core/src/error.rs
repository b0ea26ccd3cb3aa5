//! Error type shared by the parser, the delta engine and the monitor.

use std::path::PathBuf;

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, GpuUsageError>;

/// Why two consecutive snapshots cannot be diffed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Incompatibility {
    #[error("timestamp did not advance ({prev} -> {cur})")]
    NonPositiveElapsed { prev: i64, cur: i64 },
    #[error("queue `{key}` disappeared from the counter dump")]
    MissingQueue { key: String },
    #[error("queue `{key}` changed from {prev} to {cur} counters")]
    LengthMismatch { key: String, prev: usize, cur: usize },
    #[error("queue `{key}` has {len} counters, need job count and busy ticks")]
    TooFewCounters { key: String, len: usize },
    #[error("queue `{key}` counter delta overflows")]
    CounterOverflow { key: String },
}

/// Everything that can go wrong between opening the counter file and
/// printing a summary line. All variants are fatal to the monitor loop.
#[derive(Debug, Error)]
pub enum GpuUsageError {
    /// The counter file could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A line matched none of the known record shapes.
    #[error("malformed record {fields:?}: {reason}")]
    MalformedRecord { fields: Vec<String>, reason: String },
    #[error("counter dump has no timestamp line")]
    MissingTimestamp,
    #[error("incompatible snapshots: {0}")]
    IncompatibleSnapshots(#[from] Incompatibility),
}

impl GpuUsageError {
    pub(crate) fn malformed(fields: &[String], reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            fields: fields.to_vec(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this failure.
    ///
    /// `1` means the device or kernel does not expose the counters at all;
    /// `2` means the counters were readable but could not be trusted.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SourceUnavailable { .. } => 1,
            Self::MalformedRecord { .. }
            | Self::MissingTimestamp
            | Self::IncompatibleSnapshots(_) => 2,
        }
    }
}
