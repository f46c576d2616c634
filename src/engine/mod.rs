//! Execution engine for simulated jobs.
//!
//! The engine drains a [`JobPool`](crate::scheduler::JobPool) under a
//! run-time budget:
//! - **Non-preemptive** (no quantum): FCFS, SJF and priority runs service
//!   each job until it finishes or the budget is gone
//! - **Round-robin** (quantum set): each job gets at most one quantum per turn
//!
//! # Components
//!
//! - [`ExecutionEngine`]: validated run parameters and the service loop
//! - [`ExecutionEvent`]: transitions emitted per job and per tick
//! - [`EventSink`]: where events go (a `Vec`, or a channel to a renderer)
//!
//! # Budget
//!
//! Service is clamped to the remaining budget, so the budget never goes
//! negative. A job cut off by the budget stays in the pool as `Preempted`.

pub mod event;
pub mod executor;

pub use event::{EngineUpdate, EventSink, ExecutionEvent};
pub use executor::{run, ExecutionEngine, RunReport, StopReason};
