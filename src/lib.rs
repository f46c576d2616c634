pub mod config;
pub mod engine;
pub mod error;
pub mod runner;
pub mod scheduler;
pub mod shutdown;
pub mod simulation;
pub mod stats;

pub use engine::{EngineUpdate, EventSink, ExecutionEvent, RunReport, StopReason};
pub use error::{Result, SimError};
pub use scheduler::{Job, JobId, JobPool, JobState, Policy};
pub use simulation::Simulation;
pub use stats::{Statistics, StatsSnapshot};
