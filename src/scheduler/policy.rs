use std::cmp::Ordering;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::scheduler::job::Job;
use crate::scheduler::pool::JobPool;

/// Ordering policy applied to the pool before a run.
///
/// Every policy is a total order over two jobs and is applied with a stable
/// sort, so jobs that compare equal keep their previous relative order.
/// Round-robin only fixes the initial cyclic order; the time slicing itself
/// happens in the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// First-come-first-served
    #[value(name = "fcfs")]
    Fcfs,
    /// Shortest remaining job first
    #[value(name = "sjf")]
    Sjf,
    /// Highest priority first, earliest arrival on ties
    #[value(name = "priority")]
    Priority,
    /// Arrival order, serviced in quantum-sized turns
    #[value(name = "rr", alias = "round-robin")]
    RoundRobin,
}

impl Policy {
    pub const ALL: [Policy; 4] = [
        Policy::Fcfs,
        Policy::Sjf,
        Policy::Priority,
        Policy::RoundRobin,
    ];

    pub fn compare(&self, a: &Job, b: &Job) -> Ordering {
        match self {
            Policy::Fcfs | Policy::RoundRobin => a.arrival_time.cmp(&b.arrival_time),
            Policy::Sjf => a.remaining_time().cmp(&b.remaining_time()),
            Policy::Priority => b
                .priority
                .cmp(&a.priority)
                .then_with(|| a.arrival_time.cmp(&b.arrival_time)),
        }
    }

    /// Reorder the pool in place. Job fields are left untouched.
    pub fn apply(&self, pool: &mut JobPool) {
        pool.reorder(|a, b| self.compare(a, b));
    }

    /// Whether jobs give up the CPU when their quantum runs out.
    pub fn is_preemptive(&self) -> bool {
        matches!(self, Policy::RoundRobin)
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::Fcfs => write!(f, "fcfs"),
            Policy::Sjf => write!(f, "sjf"),
            Policy::Priority => write!(f, "priority"),
            Policy::RoundRobin => write!(f, "rr"),
        }
    }
}
