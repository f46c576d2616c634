use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GeneratorConfig;
use crate::scheduler::job::{Job, JobId};

/// Creates jobs with unique ids and strictly increasing arrival times.
#[derive(Debug)]
pub struct JobGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    next_id: JobId,
    last_arrival: Option<i64>,
}

impl JobGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            rng,
            next_id: 0,
            last_arrival: None,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Create a job with caller-chosen priority and service time.
    ///
    /// Arrival is the wall clock in milliseconds, bumped past the previous
    /// arrival when several jobs land in the same millisecond.
    pub fn new_job(&mut self, priority: i32, service_time: u64) -> Job {
        let id = self.next_id;
        self.next_id += 1;

        let now = Utc::now().timestamp_millis();
        let arrival = match self.last_arrival {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last_arrival = Some(arrival);

        tracing::trace!(job_id = id, priority, service_time, arrival, "Job created");
        Job::new(id, arrival, priority, service_time)
    }

    pub fn random_job(&mut self) -> Job {
        let priority = self.sample_priority();
        let service_time = self.sample_service_time();
        self.new_job(priority, service_time)
    }

    /// Size of a random batch, uniform in `1..=max_batch`.
    pub fn random_batch_size(&mut self) -> usize {
        self.rng.random_range(1..=self.config.max_batch.max(1))
    }

    /// Restart id numbering for a fresh simulation.
    pub fn reset(&mut self) {
        self.next_id = 0;
        self.last_arrival = None;
    }

    fn sample_priority(&mut self) -> i32 {
        let range = self.config.priority_range.clone();
        if range.is_empty() {
            return *range.start();
        }
        self.rng.random_range(range)
    }

    fn sample_service_time(&mut self) -> u64 {
        let range = self.config.service_time_range.clone();
        if range.is_empty() {
            return *range.start();
        }
        self.rng.random_range(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> JobGenerator {
        JobGenerator::new(GeneratorConfig {
            seed: Some(seed),
            ..Default::default()
        })
    }

    #[test]
    fn ids_are_monotonic_and_arrivals_strictly_increase() {
        let mut gen = seeded(1);
        let jobs: Vec<Job> = (0..50).map(|_| gen.random_job()).collect();

        for pair in jobs.windows(2) {
            assert_eq!(pair[1].id, pair[0].id + 1);
            assert!(pair[1].arrival_time > pair[0].arrival_time);
        }
    }

    #[test]
    fn random_jobs_respect_ranges() {
        let mut gen = seeded(2);
        for _ in 0..200 {
            let job = gen.random_job();
            assert!((1..=10).contains(&job.priority));
            assert!((1..=10).contains(&job.total_time_required));
        }
    }

    #[test]
    fn same_seed_same_jobs() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        for _ in 0..20 {
            let (ja, jb) = (a.random_job(), b.random_job());
            assert_eq!(ja.priority, jb.priority);
            assert_eq!(ja.total_time_required, jb.total_time_required);
        }
    }

    #[test]
    fn batch_size_within_bounds() {
        let mut gen = seeded(3);
        for _ in 0..100 {
            let n = gen.random_batch_size();
            assert!((1..=20).contains(&n));
        }
    }

    #[test]
    fn reset_restarts_numbering() {
        let mut gen = seeded(4);
        gen.new_job(1, 1);
        gen.new_job(1, 1);
        gen.reset();
        assert_eq!(gen.new_job(1, 1).id, 0);
    }

    #[test]
    fn degenerate_range_yields_its_start() {
        let mut gen = JobGenerator::new(GeneratorConfig {
            priority_range: 5..=5,
            service_time_range: 3..=3,
            seed: Some(0),
            ..Default::default()
        });
        let job = gen.random_job();
        assert_eq!(job.priority, 5);
        assert_eq!(job.total_time_required, 3);
    }
}
