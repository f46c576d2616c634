use thiserror::Error;

use crate::scheduler::JobId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("Run-time budget must be positive, got {0}")]
    InvalidBudget(i64),

    #[error("Round-robin requires a positive quantum, got {0:?}")]
    InvalidQuantum(Option<i64>),

    #[error("Job {0} is already in the pool")]
    DuplicateId(JobId),

    #[error("Job {0} is finished or inconsistent and cannot be scheduled")]
    JobNotLive(JobId),
}

pub type Result<T> = std::result::Result<T, SimError>;
