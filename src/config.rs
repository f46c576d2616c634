use std::ops::RangeInclusive;

use crate::scheduler::Policy;

/// Configuration for synthetic job generation.
///
/// Priorities and service times are drawn uniformly from the inclusive
/// ranges below.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub priority_range: RangeInclusive<i32>,
    pub service_time_range: RangeInclusive<u64>,
    /// Upper bound for a random batch size (lower bound is 1)
    pub max_batch: usize,
    /// When set, generation is skipped once the pool holds more jobs than this
    pub pool_cap: Option<usize>,
    /// Seed for reproducible job sets. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            priority_range: 1..=10,
            service_time_range: 1..=10,
            max_batch: 20,
            pool_cap: None,
            seed: None,
        }
    }
}

/// Pacing for the text renderer. The engine itself never sleeps.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Delay after every rendered tick, in milliseconds
    pub tick_delay_ms: u64,
    /// Bound of the event channel between engine and renderer
    pub channel_capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tick_delay_ms: 20,
            channel_capacity: 16,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub policy: Policy,
    pub run_time_budget: i64,
    /// Only consulted by round-robin
    pub quantum: Option<i64>,
    pub generator: GeneratorConfig,
    pub render: RenderConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            policy: Policy::Fcfs,
            run_time_budget: 100,
            quantum: Some(3),
            generator: GeneratorConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn new(policy: Policy, run_time_budget: i64) -> Self {
        Self {
            policy,
            run_time_budget,
            ..Default::default()
        }
    }

    pub fn with_quantum(mut self, quantum: i64) -> Self {
        self.quantum = Some(quantum);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.generator.seed = Some(seed);
        self
    }

    pub fn with_pool_cap(mut self, cap: usize) -> Self {
        self.generator.pool_cap = Some(cap);
        self
    }

    /// Quantum handed to the engine: round-robin gets the configured value,
    /// every other policy runs jobs to completion.
    pub fn effective_quantum(&self) -> Option<i64> {
        if self.policy.is_preemptive() {
            self.quantum
        } else {
            None
        }
    }
}
