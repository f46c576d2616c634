use tokio_util::sync::CancellationToken;

use crate::config::{GeneratorConfig, SimConfig};
use crate::engine::{EventSink, ExecutionEngine, RunReport};
use crate::error::{Result, SimError};
use crate::scheduler::{JobGenerator, JobId, JobPool, Policy};
use crate::stats::{Statistics, StatsSnapshot};

/// Owns the pool, the job generator and the statistics for one simulation.
///
/// Jobs may be added between runs only; a run holds the pool exclusively.
#[derive(Debug)]
pub struct Simulation {
    pool: JobPool,
    generator: JobGenerator,
    stats: Statistics,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl Simulation {
    pub fn new(generator: GeneratorConfig) -> Self {
        Self {
            pool: JobPool::new(),
            generator: JobGenerator::new(generator),
            stats: Statistics::new(),
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.generator.clone())
    }

    pub fn pool(&self) -> &JobPool {
        &self.pool
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot(&self.pool)
    }

    /// Add a job with caller-chosen priority and service time.
    pub fn submit(&mut self, priority: i32, service_time: u64) -> Result<JobId> {
        let job = self.generator.new_job(priority, service_time);
        let id = job.id;
        self.pool.add(job)?;
        Ok(id)
    }

    /// Generate `count` random jobs, or a random-sized batch when `None`.
    ///
    /// With a pool cap configured, nothing is generated once the pool has
    /// grown past it. Returns the number of jobs added.
    pub fn generate(&mut self, count: Option<usize>) -> Result<usize> {
        if let Some(cap) = self.generator.config().pool_cap {
            if self.pool.len() > cap {
                tracing::debug!(pool = self.pool.len(), cap, "Pool over cap, skipping generation");
                return Ok(0);
            }
        }

        let count = match count {
            Some(n) => n,
            None => self.generator.random_batch_size(),
        };
        for _ in 0..count {
            let job = self.generator.random_job();
            self.pool.add(job)?;
        }

        tracing::info!(generated = count, pool = self.pool.len(), "Generated jobs");
        Ok(count)
    }

    /// Reorder the pool by `policy` and run it under `budget`.
    ///
    /// Round-robin needs a positive quantum; other policies ignore it. All
    /// parameters are validated before the pool is touched.
    pub fn run<S: EventSink>(
        &mut self,
        policy: Policy,
        budget: i64,
        quantum: Option<i64>,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> Result<RunReport> {
        let quantum = if policy.is_preemptive() {
            match quantum {
                Some(q) => Some(q),
                None => return Err(SimError::InvalidQuantum(None)),
            }
        } else {
            None
        };
        let engine = ExecutionEngine::new(budget, quantum)?;

        tracing::info!(
            %policy,
            budget = engine.budget(),
            quantum = ?engine.quantum(),
            jobs = self.pool.len(),
            "Scheduling"
        );
        policy.apply(&mut self.pool);
        Ok(engine.run(&mut self.pool, &mut self.stats, cancel, sink))
    }

    /// Run with policy, budget and quantum taken from `config`.
    pub fn run_configured<S: EventSink>(
        &mut self,
        config: &SimConfig,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> Result<RunReport> {
        self.run(
            config.policy,
            config.run_time_budget,
            config.effective_quantum(),
            cancel,
            sink,
        )
    }

    /// Start over: empty pool, zeroed counters, ids from 0.
    pub fn reset(&mut self) {
        self.pool.clear();
        self.stats.reset();
        self.generator.reset();
        tracing::info!("Simulation reset");
    }
}
