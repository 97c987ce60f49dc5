// Mon Oct 19 2026 - Alex

use crate::error::{PipelineError, PipelineResult};
use crate::Item;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub count: i64,
    pub sum: i64,
}

impl Totals {
    /// Wraps on overflow, matching [`ObservedTotals::record`].
    pub fn record(&mut self, value: Item) {
        self.count = self.count.wrapping_add(1);
        self.sum = self.sum.wrapping_add(value);
    }
}

/// Totals of everything the sequencer reported. Written from the sequencer's
/// callback, read after the sequencer thread is joined.
#[derive(Debug, Default)]
pub struct ObservedTotals {
    count: AtomicI64,
    sum: AtomicI64,
}

impl ObservedTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, value: Item) {
        self.sum.fetch_add(value, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Totals {
        Totals {
            count: self.count.load(Ordering::Acquire),
            sum: self.sum.load(Ordering::Acquire),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub produced: Totals,
    pub drained: Totals,
    /// Items each relay's collector forwarded into the merged channel.
    pub amounts: Vec<u64>,
    /// Items each relay forwarded to its own output.
    pub relays_forwarded: Vec<u64>,
    pub last_value: Option<Item>,
    pub cancelled: bool,
    #[serde(rename = "elapsed_ms", with = "crate::config::millis")]
    pub elapsed: Duration,
}

impl PipelineReport {
    pub fn distributed(&self) -> i64 {
        self.amounts.iter().map(|&a| a as i64).sum()
    }

    /// Checks sum, then count, then the per-relay split.
    pub fn verify(&self) -> PipelineResult<()> {
        if self.produced.sum != self.drained.sum {
            return Err(PipelineError::SumMismatch {
                produced: self.produced.sum,
                drained: self.drained.sum,
            });
        }

        if self.produced.count != self.drained.count {
            return Err(PipelineError::CountMismatch {
                produced: self.produced.count,
                drained: self.drained.count,
            });
        }

        let distributed = self.distributed();
        if distributed != self.produced.count {
            return Err(PipelineError::DistributionMismatch {
                produced: self.produced.count,
                distributed,
            });
        }

        let relayed: i64 = self.relays_forwarded.iter().map(|&f| f as i64).sum();
        if relayed != self.produced.count {
            return Err(PipelineError::DistributionMismatch {
                produced: self.produced.count,
                distributed: relayed,
            });
        }

        Ok(())
    }
}
