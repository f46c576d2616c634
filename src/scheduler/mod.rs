pub mod generator;
pub mod job;
pub mod policy;
pub mod pool;

pub use generator::JobGenerator;
pub use job::{Job, JobId, JobState};
pub use policy::Policy;
pub use pool::JobPool;
