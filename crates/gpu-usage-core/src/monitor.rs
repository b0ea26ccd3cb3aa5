//! Sampling state carried from one read to the next.

use crate::delta::{DeltaReport, compute_delta};
use crate::error::Result;
use crate::snapshot::Snapshot;
use crate::source::{CounterSource, read_snapshot};

/// What the monitor remembers between reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Baseline {
    #[default]
    NoBaseline,
    HasBaseline(Snapshot),
}

/// Two-state sampler: the first snapshot only becomes the baseline, every
/// later one is diffed against the previous and then replaces it.
#[derive(Debug, Default)]
pub struct Monitor {
    baseline: Baseline,
}

impl Monitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_baseline(&self) -> bool {
        matches!(self.baseline, Baseline::HasBaseline(_))
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Feed a fresh snapshot. Returns `None` on the first call.
    ///
    /// On error the previous baseline is kept.
    pub fn observe(&mut self, snapshot: Snapshot) -> Result<Option<DeltaReport>> {
        let report = match &self.baseline {
            Baseline::NoBaseline => None,
            Baseline::HasBaseline(prev) => Some(compute_delta(prev, &snapshot)?),
        };
        self.baseline = Baseline::HasBaseline(snapshot);
        Ok(report)
    }

    /// Read one snapshot from `source` and feed it to [`Monitor::observe`].
    pub fn tick(&mut self, source: &dyn CounterSource) -> Result<Option<DeltaReport>> {
        let snapshot = read_snapshot(source)?;
        self.observe(snapshot)
    }
}
