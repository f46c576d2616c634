use std::cmp::Ordering;

use crate::error::{Result, SimError};
use crate::scheduler::job::{Job, JobId};

/// Ordered collection of live jobs.
///
/// Insertion order is arrival order; the active policy reorders it in place
/// before every run. Finished jobs never live here.
#[derive(Debug, Default, Clone)]
pub struct JobPool {
    jobs: Vec<Job>,
}

impl JobPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job. Fails without touching the pool if the id is taken or
    /// the job is not live (e.g. a finished job taken from a run report).
    pub fn add(&mut self, job: Job) -> Result<()> {
        if !job.is_live() {
            return Err(SimError::JobNotLive(job.id));
        }
        if self.contains_id(job.id) {
            return Err(SimError::DuplicateId(job.id));
        }
        self.jobs.push(job);
        Ok(())
    }

    /// Remove the first entry equal to `job`. Absent jobs are a no-op.
    pub fn remove_by_identity(&mut self, job: &Job) -> Option<Job> {
        let index = self.jobs.iter().position(|j| j == job)?;
        Some(self.jobs.remove(index))
    }

    /// Stable in-place sort; equal-ranked jobs keep their relative order.
    pub fn reorder<F>(&mut self, compare: F)
    where
        F: FnMut(&Job, &Job) -> Ordering,
    {
        self.jobs.sort_by(compare);
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Job> {
        self.jobs.get(index)
    }

    pub fn find(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn contains_id(&self, id: JobId) -> bool {
        self.jobs.iter().any(|j| j.id == id)
    }

    pub fn not_started_count(&self) -> usize {
        self.jobs.iter().filter(|j| !j.started()).count()
    }

    pub fn ids(&self) -> Vec<JobId> {
        self.jobs.iter().map(|j| j.id).collect()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Job> {
        self.jobs.get_mut(index)
    }

    /// Order-preserving removal: the following job slides into `index`.
    pub(crate) fn remove_at(&mut self, index: usize) -> Job {
        self.jobs.remove(index)
    }
}
