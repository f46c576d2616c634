use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::engine::event::{EventSink, ExecutionEvent};
use crate::error::{Result, SimError};
use crate::scheduler::{Job, JobPool};
use crate::stats::Statistics;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    PoolDrained,
    BudgetExhausted,
    Cancelled,
}

/// Outcome of a single run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub stop_reason: StopReason,
    /// Never negative: service is clamped to what is left of the budget.
    pub budget_remaining: i64,
    /// Number of loop iterations that serviced a job
    pub service_steps: u64,
    /// Jobs that reached zero remaining time, in finishing order
    pub finished: Vec<Job>,
}

impl RunReport {
    pub fn cancelled(&self) -> bool {
        self.stop_reason == StopReason::Cancelled
    }
}

/// Time-sliced, single-server execution loop.
///
/// Jobs are serviced through a cyclic cursor over the pool. A finished job
/// is removed in place, which slides the next job under the cursor, so the
/// cursor only advances past jobs that are still alive. With no quantum a
/// job runs until it finishes or the budget runs out; with a quantum it
/// gives up the CPU after at most `quantum` units.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionEngine {
    budget: i64,
    quantum: Option<i64>,
}

impl ExecutionEngine {
    /// Validate run parameters. Nothing is mutated on failure.
    pub fn new(budget: i64, quantum: Option<i64>) -> Result<Self> {
        if budget <= 0 {
            return Err(SimError::InvalidBudget(budget));
        }
        if let Some(q) = quantum {
            if q <= 0 {
                return Err(SimError::InvalidQuantum(Some(q)));
            }
        }
        Ok(Self { budget, quantum })
    }

    pub fn budget(&self) -> i64 {
        self.budget
    }

    pub fn quantum(&self) -> Option<i64> {
        self.quantum
    }

    /// Drain the pool under the budget, emitting every transition to `sink`.
    ///
    /// `cancel` is observed only between service steps; a step that has
    /// started always completes.
    pub fn run<S: EventSink>(
        &self,
        pool: &mut JobPool,
        stats: &mut Statistics,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> RunReport {
        let mut budget = self.budget;
        let mut cursor = 0usize;
        let mut service_steps = 0u64;
        let mut finished = Vec::new();

        tracing::info!(
            jobs = pool.len(),
            budget,
            quantum = ?self.quantum,
            "Starting run"
        );

        let stop_reason = loop {
            if pool.is_empty() {
                break StopReason::PoolDrained;
            }
            if budget <= 0 {
                break StopReason::BudgetExhausted;
            }
            if cancel.is_cancelled() {
                tracing::info!(service_steps, budget, "Run cancelled");
                break StopReason::Cancelled;
            }

            cursor %= pool.len();
            let Some(job) = pool.get_mut(cursor) else {
                break StopReason::PoolDrained;
            };

            let job_id = job.id;
            let before = job.remaining_time();
            let amount = self.service_amount(before, budget);
            let first_service = job.begin_service();
            job.service(amount);
            let after = job.remaining_time();

            budget -= amount as i64;
            stats.record_service(amount);
            service_steps += 1;

            tracing::debug!(job_id, cursor, before, after, budget, "Serviced job");

            if first_service {
                emit(sink, stats, pool, ExecutionEvent::JobStarted { job_id });
            }
            for remaining_time in (after..before).rev() {
                tracing::trace!(job_id, remaining_time, "Tick");
                emit(
                    sink,
                    stats,
                    pool,
                    ExecutionEvent::TickProgress {
                        job_id,
                        remaining_time,
                    },
                );
            }

            if after == 0 {
                let mut done = pool.remove_at(cursor);
                done.finish();
                stats.record_finished();
                tracing::debug!(job_id, total = done.total_time_required, "Job finished");
                finished.push(done);
                emit(sink, stats, pool, ExecutionEvent::JobFinished { job_id });
            } else {
                if let Some(job) = pool.get_mut(cursor) {
                    job.preempt();
                }
                stats.record_preemption();
                cursor += 1;
                emit(
                    sink,
                    stats,
                    pool,
                    ExecutionEvent::JobPreempted {
                        job_id,
                        remaining_time: after,
                    },
                );
            }
        };

        emit(
            sink,
            stats,
            pool,
            ExecutionEvent::RunCompleted {
                budget_remaining: budget,
            },
        );

        tracing::info!(
            stop_reason = ?stop_reason,
            finished = finished.len(),
            remaining_jobs = pool.len(),
            budget_remaining = budget,
            "Run completed"
        );

        RunReport {
            stop_reason,
            budget_remaining: budget,
            service_steps,
            finished,
        }
    }

    fn service_amount(&self, remaining: u64, budget: i64) -> u64 {
        let budget = budget.max(0) as u64;
        let amount = remaining.min(budget);
        match self.quantum {
            Some(q) => amount.min(q as u64),
            None => amount,
        }
    }
}

/// Validate and run in one call.
pub fn run<S: EventSink>(
    pool: &mut JobPool,
    stats: &mut Statistics,
    budget: i64,
    quantum: Option<i64>,
    cancel: &CancellationToken,
    sink: &mut S,
) -> Result<RunReport> {
    let engine = ExecutionEngine::new(budget, quantum)?;
    Ok(engine.run(pool, stats, cancel, sink))
}

fn emit<S: EventSink>(sink: &mut S, stats: &Statistics, pool: &JobPool, event: ExecutionEvent) {
    let snapshot = stats.snapshot(pool);
    sink.emit(event, &snapshot);
}
