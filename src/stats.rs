use serde::{Deserialize, Serialize};

use crate::scheduler::JobPool;

/// Point-in-time view of the simulation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Jobs currently in the pool
    pub total_active: usize,
    /// Pool jobs that have never been serviced
    pub not_started: usize,
    /// Jobs finished since the last reset
    pub finished: u64,
    pub preemptions: u64,
    /// Simulated time units handed out across all runs
    pub time_serviced: u64,
}

/// Counters that outlive a single run.
///
/// `total_active` and `not_started` are derived from the pool on demand;
/// the rest are incremented by the execution engine.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    finished: u64,
    preemptions: u64,
    time_serviced: u64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self, pool: &JobPool) -> StatsSnapshot {
        StatsSnapshot {
            total_active: pool.len(),
            not_started: pool.not_started_count(),
            finished: self.finished,
            preemptions: self.preemptions,
            time_serviced: self.time_serviced,
        }
    }

    pub fn finished(&self) -> u64 {
        self.finished
    }

    pub fn preemptions(&self) -> u64 {
        self.preemptions
    }

    pub fn time_serviced(&self) -> u64 {
        self.time_serviced
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn record_finished(&mut self) {
        self.finished += 1;
    }

    pub(crate) fn record_preemption(&mut self) {
        self.preemptions += 1;
    }

    pub(crate) fn record_service(&mut self, amount: u64) {
        self.time_serviced += amount;
    }
}
