//! Where counter dumps come from.
//!
//! Every reader implements [`CounterSource`]. The production reader is
//! [`DebugfsSource`], which opens the V3D `gpu_usage` file, reads it whole and
//! closes it again on every call.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{GpuUsageError, Result};
use crate::snapshot::Snapshot;

/// Location of the V3D queue counters on Raspberry Pi kernels.
pub const DEFAULT_GPU_USAGE_PATH: &str = "/sys/kernel/debug/dri/0/gpu_usage";

/// A readable text source of queue counters.
pub trait CounterSource {
    /// Human-readable identity used in diagnostics (usually a path).
    fn name(&self) -> &Path;

    /// Return the full raw dump.
    fn read_raw(&self) -> io::Result<String>;
}

/// The debugfs counter file.
#[derive(Debug, Clone)]
pub struct DebugfsSource {
    path: PathBuf,
}

impl DebugfsSource {
    pub fn new() -> Self {
        Self::with_path(DEFAULT_GPU_USAGE_PATH)
    }

    /// Read from a different file with the same format.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for DebugfsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for DebugfsSource {
    fn name(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}

/// Read and parse one snapshot from `source`.
pub fn read_snapshot(source: &dyn CounterSource) -> Result<Snapshot> {
    let raw = source
        .read_raw()
        .map_err(|e| GpuUsageError::SourceUnavailable {
            path: source.name().to_path_buf(),
            source: e,
        })?;
    Snapshot::parse(&raw)
}
