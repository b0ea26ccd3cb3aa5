//! # gpu-usage-core
//!
//! Turns the V3D `gpu_usage` debugfs dump into per-interval queue utilization.
//!
//! ## Quick Start
//!
//! ```
//! use gpu_usage_core::{Monitor, Snapshot};
//!
//! let mut monitor = Monitor::new();
//! let first: Snapshot = "timestamp;1000\nQUEUE;bin;render\nbin;5;200\nrender;10;500\n"
//!     .parse()
//!     .unwrap();
//! assert!(monitor.observe(first).unwrap().is_none());
//!
//! let second: Snapshot = "timestamp;2000\nQUEUE;bin;render\nbin;8;350\nrender;12;900\n"
//!     .parse()
//!     .unwrap();
//! let report = monitor.observe(second).unwrap().unwrap();
//! assert_eq!(report.to_string(), "bin: jobs:  3  15.0%, render: jobs:  2  40.0%");
//! ```
//!
//! ## Architecture
//!
//! Source → [`Snapshot`] (parse) → [`DeltaReport`] (diff against baseline) → line
//!
//! Every reader implements the [`CounterSource`] trait. The [`Monitor`] owns the
//! previous snapshot and is the only state carried across reads.

pub mod delta;
pub mod error;
pub mod monitor;
pub mod queue;
pub mod snapshot;
pub mod source;

pub use delta::{DeltaReport, QueueDelta, compute_delta};
pub use error::{GpuUsageError, Incompatibility, Result};
pub use monitor::{Baseline, Monitor};
pub use queue::{DEVICE_PREFIXES, QUEUE_KINDS, is_queue_key, queue_kind};
pub use snapshot::{
    MIN_QUEUE_COUNTERS, QueueCounters, Record, Snapshot, normalize_line, parse_line,
};
pub use source::{CounterSource, DEFAULT_GPU_USAGE_PATH, DebugfsSource, read_snapshot};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
