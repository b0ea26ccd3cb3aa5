//! Per-interval deltas between two snapshots and the summary line.

use std::fmt;

use crate::error::{Incompatibility, Result};
use crate::snapshot::{MIN_QUEUE_COUNTERS, Snapshot};

/// Counter deltas of one queue over an interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueDelta {
    pub key: String,
    /// Element-wise `cur - prev`. Negative after a counter reset.
    pub deltas: Vec<i64>,
}

impl QueueDelta {
    /// Jobs completed during the interval (counter 0).
    pub fn jobs(&self) -> i64 {
        self.deltas[0]
    }

    /// Ticks the queue was busy during the interval (counter 1).
    pub fn busy_ticks(&self) -> i64 {
        self.deltas[1]
    }

    /// Busy ticks as a percentage of `elapsed`.
    pub fn busy_percent(&self, elapsed: i64) -> f64 {
        100.0 * self.busy_ticks() as f64 / elapsed as f64
    }
}

/// Deltas of every queue over one sampling interval.
///
/// Constructed only by [`compute_delta`], so `elapsed` is always positive and
/// every queue carries at least the job and busy counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaReport {
    pub elapsed: i64,
    pub queues: Vec<QueueDelta>,
}

impl DeltaReport {
    pub fn get(&self, key: &str) -> Option<&QueueDelta> {
        self.queues.iter().find(|q| q.key == key)
    }
}

impl fmt::Display for DeltaReport {
    /// `bin: jobs:  3  15.0%, render: jobs:  2  40.0%`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, q) in self.queues.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(
                f,
                "{}: jobs:{:>3}{:>6.1}%",
                q.key,
                q.jobs(),
                q.busy_percent(self.elapsed)
            )?;
        }
        Ok(())
    }
}

/// Diff `cur` against `prev`.
///
/// Queues are reported in `cur` order. A queue that only exists in `cur` is
/// skipped. A timestamp that did not move forward, a queue that vanished,
/// changed width or lacks the job and busy counters, and a delta that does
/// not fit in `i64` are errors.
pub fn compute_delta(prev: &Snapshot, cur: &Snapshot) -> Result<DeltaReport> {
    let elapsed = cur
        .timestamp
        .checked_sub(prev.timestamp)
        .filter(|e| *e > 0)
        .ok_or(Incompatibility::NonPositiveElapsed {
            prev: prev.timestamp,
            cur: cur.timestamp,
        })?;

    for key in prev.keys() {
        if cur.get(key).is_none() {
            return Err(Incompatibility::MissingQueue {
                key: key.to_string(),
            }
            .into());
        }
    }

    let mut queues = Vec::with_capacity(cur.len());
    for q in &cur.queues {
        let Some(before) = prev.get(&q.key) else {
            log::debug!("queue {} appeared; reporting from next interval", q.key);
            continue;
        };
        if before.len() != q.counters.len() {
            return Err(Incompatibility::LengthMismatch {
                key: q.key.clone(),
                prev: before.len(),
                cur: q.counters.len(),
            }
            .into());
        }
        if q.counters.len() < MIN_QUEUE_COUNTERS {
            return Err(Incompatibility::TooFewCounters {
                key: q.key.clone(),
                len: q.counters.len(),
            }
            .into());
        }
        let deltas = q
            .counters
            .iter()
            .zip(before)
            .map(|(c, p)| c.checked_sub(*p))
            .collect::<Option<Vec<i64>>>()
            .ok_or_else(|| Incompatibility::CounterOverflow { key: q.key.clone() })?;
        if deltas.iter().any(|d| *d < 0) {
            log::warn!("queue {} counters went backwards: {:?}", q.key, deltas);
        }
        queues.push(QueueDelta {
            key: q.key.clone(),
            deltas,
        });
    }

    Ok(DeltaReport { elapsed, queues })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GpuUsageError;
    use crate::snapshot::QueueCounters;

    fn snap(text: &str) -> Snapshot {
        Snapshot::parse(text).unwrap()
    }

    fn incompatibility(err: GpuUsageError) -> Incompatibility {
        match err {
            GpuUsageError::IncompatibleSnapshots(i) => i,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn two_queue_interval() {
        let prev = snap("timestamp;1000\nQUEUE;bin;render\nbin;5;200\nrender;10;500\n");
        let cur = snap("timestamp;2000\nQUEUE;bin;render\nbin;8;350\nrender;12;900\n");
        let report = compute_delta(&prev, &cur).unwrap();
        assert_eq!(report.elapsed, 1000);
        assert_eq!(report.get("bin").unwrap().deltas, [3, 150]);
        assert_eq!(report.get("render").unwrap().deltas, [2, 400]);
        assert_eq!(
            report.to_string(),
            "bin: jobs:  3  15.0%, render: jobs:  2  40.0%"
        );
    }

    #[test]
    fn every_counter_is_diffed() {
        let prev = snap("timestamp;10\nv3d_csd;1;2;3;4\n");
        let cur = snap("timestamp;15\nv3d_csd;2;4;6;8\n");
        let report = compute_delta(&prev, &cur).unwrap();
        assert_eq!(report.elapsed, 5);
        assert_eq!(report.queues[0].deltas, [1, 2, 3, 4]);
        // Counters past busy ticks stay out of the line.
        assert_eq!(report.to_string(), "v3d_csd: jobs:  1  40.0%");
    }

    #[test]
    fn counter_reset_passes_through_negative() {
        let prev = snap("timestamp;100\nbin;50;90\n");
        let cur = snap("timestamp;300\nbin;1;20\n");
        let report = compute_delta(&prev, &cur).unwrap();
        let bin = report.get("bin").unwrap();
        assert_eq!(bin.jobs(), -49);
        assert_eq!(bin.busy_percent(report.elapsed), 100.0 * -70.0 / 200.0);
        assert_eq!(report.to_string(), "bin: jobs:-49 -35.0%");
    }

    #[test]
    fn busy_percent_matches_formula() {
        let q = QueueDelta {
            key: "render".to_string(),
            deltas: vec![0, 1],
        };
        assert_eq!(q.busy_percent(3), 100.0 * 1.0 / 3.0);
        let report = DeltaReport {
            elapsed: 3,
            queues: vec![q],
        };
        assert_eq!(report.to_string(), "render: jobs:  0  33.3%");
    }

    #[test]
    fn timestamp_must_advance() {
        let prev = snap("timestamp;2000\nbin;1;1\n");
        for ts in [2000, 1999, -5] {
            let cur = snap(&format!("timestamp;{ts}\nbin;2;2\n"));
            let err = incompatibility(compute_delta(&prev, &cur).unwrap_err());
            assert_eq!(
                err,
                Incompatibility::NonPositiveElapsed {
                    prev: 2000,
                    cur: ts
                }
            );
        }
    }

    #[test]
    fn vanished_queue_is_rejected() {
        let prev = snap("timestamp;1\nbin;1;1\nrender;1;1\n");
        let cur = snap("timestamp;2\nbin;2;2\n");
        let err = incompatibility(compute_delta(&prev, &cur).unwrap_err());
        assert_eq!(
            err,
            Incompatibility::MissingQueue {
                key: "render".to_string()
            }
        );
    }

    #[test]
    fn width_change_is_rejected() {
        let prev = snap("timestamp;1\nbin;1;1\n");
        let cur = snap("timestamp;2\nbin;2;2;2\n");
        let err = incompatibility(compute_delta(&prev, &cur).unwrap_err());
        assert_eq!(
            err,
            Incompatibility::LengthMismatch {
                key: "bin".to_string(),
                prev: 2,
                cur: 3
            }
        );
    }

    #[test]
    fn hand_built_single_counter_queue_is_rejected() {
        let queue = |ts: i64, jobs: i64| Snapshot {
            timestamp: ts,
            queue_names: Vec::new(),
            queues: vec![QueueCounters {
                key: "bin".to_string(),
                counters: vec![jobs],
            }],
        };
        let err = incompatibility(compute_delta(&queue(1, 1), &queue(2, 2)).unwrap_err());
        assert_eq!(
            err,
            Incompatibility::TooFewCounters {
                key: "bin".to_string(),
                len: 1
            }
        );
    }

    #[test]
    fn overflowing_delta_is_rejected() {
        let prev = snap(&format!("timestamp;1\nbin;{};0\n", i64::MIN));
        let cur = snap(&format!("timestamp;2\nbin;{};0\n", i64::MAX));
        let err = incompatibility(compute_delta(&prev, &cur).unwrap_err());
        assert_eq!(
            err,
            Incompatibility::CounterOverflow {
                key: "bin".to_string()
            }
        );
    }

    #[test]
    fn new_queue_waits_for_a_baseline() {
        let prev = snap("timestamp;1\nbin;1;1\n");
        let cur = snap("timestamp;2\ntfu;4;4\nbin;2;2\n");
        let report = compute_delta(&prev, &cur).unwrap();
        assert_eq!(report.queues.len(), 1);
        assert_eq!(report.queues[0].key, "bin");
    }

    #[test]
    fn report_follows_current_order() {
        let prev = snap("timestamp;1\nbin;0;0\nrender;0;0\n");
        let cur = snap("timestamp;2\nrender;1;1\nbin;1;1\n");
        let report = compute_delta(&prev, &cur).unwrap();
        let keys: Vec<&str> = report.queues.iter().map(|q| q.key.as_str()).collect();
        assert_eq!(keys, ["render", "bin"]);
    }
}
