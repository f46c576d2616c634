use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::scheduler::JobId;
use crate::stats::StatsSnapshot;

/// State transition emitted by the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExecutionEvent {
    JobStarted { job_id: JobId },
    /// One simulated time unit of service; `remaining_time` is the value
    /// after the tick.
    TickProgress { job_id: JobId, remaining_time: u64 },
    JobPreempted { job_id: JobId, remaining_time: u64 },
    JobFinished { job_id: JobId },
    RunCompleted { budget_remaining: i64 },
}

impl ExecutionEvent {
    pub fn job_id(&self) -> Option<JobId> {
        match *self {
            ExecutionEvent::JobStarted { job_id }
            | ExecutionEvent::TickProgress { job_id, .. }
            | ExecutionEvent::JobPreempted { job_id, .. }
            | ExecutionEvent::JobFinished { job_id } => Some(job_id),
            ExecutionEvent::RunCompleted { .. } => None,
        }
    }
}

/// An event together with the statistics recomputed right after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineUpdate {
    #[serde(flatten)]
    pub event: ExecutionEvent,
    pub stats: StatsSnapshot,
}

/// Consumer of engine output.
pub trait EventSink {
    fn emit(&mut self, event: ExecutionEvent, stats: &StatsSnapshot);
}

impl EventSink for Vec<ExecutionEvent> {
    fn emit(&mut self, event: ExecutionEvent, _stats: &StatsSnapshot) {
        self.push(event);
    }
}

impl EventSink for Vec<EngineUpdate> {
    fn emit(&mut self, event: ExecutionEvent, stats: &StatsSnapshot) {
        self.push(EngineUpdate {
            event,
            stats: *stats,
        });
    }
}

/// Blocks until the receiver has room, so the engine advances at the
/// consumer's pace. Must not be called from inside an async context.
impl EventSink for mpsc::Sender<EngineUpdate> {
    fn emit(&mut self, event: ExecutionEvent, stats: &StatsSnapshot) {
        let update = EngineUpdate {
            event,
            stats: *stats,
        };
        if self.blocking_send(update).is_err() {
            // Receiver dropped, nobody is rendering
            tracing::trace!(?event, "Event dropped, receiver closed");
        }
    }
}
