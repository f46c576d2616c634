use serde::Serialize;

/// Monotonically assigned job identifier.
pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobState {
    NotStarted,
    Running,
    Preempted,
    Finished,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::NotStarted => write!(f, "not_started"),
            JobState::Running => write!(f, "running"),
            JobState::Preempted => write!(f, "preempted"),
            JobState::Finished => write!(f, "finished"),
        }
    }
}

/// A unit of simulated work.
///
/// Fields that the execution engine mutates are private so that
/// `remaining_time` can only ever go down and `Finished` is reached once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: JobId,
    /// Milliseconds since the Unix epoch.
    pub arrival_time: i64,
    pub priority: i32,
    pub total_time_required: u64,
    remaining_time: u64,
    started: bool,
    state: JobState,
}

impl Job {
    pub fn new(id: JobId, arrival_time: i64, priority: i32, service_time: u64) -> Self {
        Self {
            id,
            arrival_time,
            priority,
            total_time_required: service_time,
            remaining_time: service_time,
            started: false,
            state: JobState::NotStarted,
        }
    }

    pub fn remaining_time(&self) -> u64 {
        self.remaining_time
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Time units of service received so far.
    pub fn serviced_time(&self) -> u64 {
        self.total_time_required.saturating_sub(self.remaining_time)
    }

    pub fn is_finished(&self) -> bool {
        self.state == JobState::Finished
    }

    /// Whether the job may sit in a pool: not finished, never serviced past
    /// its demand, and `started` in step with its state.
    pub fn is_live(&self) -> bool {
        !self.is_finished()
            && self.remaining_time <= self.total_time_required
            && self.started == (self.state != JobState::NotStarted)
    }

    /// Move the job onto the CPU. Returns true on its first ever service.
    pub(crate) fn begin_service(&mut self) -> bool {
        debug_assert!(
            self.state != JobState::Finished,
            "Finished job {} cannot be serviced",
            self.id
        );
        self.state = JobState::Running;
        if self.started {
            return false;
        }
        self.started = true;
        true
    }

    pub(crate) fn service(&mut self, amount: u64) {
        debug_assert!(
            amount <= self.remaining_time,
            "Job {} serviced for {} with only {} remaining",
            self.id,
            amount,
            self.remaining_time
        );
        self.remaining_time = self.remaining_time.saturating_sub(amount);
    }

    pub(crate) fn preempt(&mut self) {
        debug_assert_eq!(self.state, JobState::Running);
        self.state = JobState::Preempted;
    }

    pub(crate) fn finish(&mut self) {
        debug_assert_eq!(self.remaining_time, 0);
        debug_assert_eq!(self.state, JobState::Running);
        self.state = JobState::Finished;
    }
}
