use std::collections::{HashMap, HashSet};

use sched_sim::engine::{run, EngineUpdate, EventSink, ExecutionEngine, ExecutionEvent};
use sched_sim::{Job, JobPool, JobState, SimError, Statistics, StatsSnapshot, StopReason};
use tokio_util::sync::CancellationToken;

fn pool_with(service_times: &[u64]) -> JobPool {
    let mut pool = JobPool::new();
    for (i, &t) in service_times.iter().enumerate() {
        pool.add(Job::new(i as u64, i as i64, 1, t)).unwrap();
    }
    pool
}

fn preempted(events: &[ExecutionEvent]) -> Vec<(u64, u64)> {
    events
        .iter()
        .filter_map(|e| match *e {
            ExecutionEvent::JobPreempted {
                job_id,
                remaining_time,
            } => Some((job_id, remaining_time)),
            _ => None,
        })
        .collect()
}

fn ticks(events: &[ExecutionEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match *e {
            ExecutionEvent::TickProgress { remaining_time, .. } => Some(remaining_time),
            _ => None,
        })
        .collect()
}

/// Cancels its token as soon as the first service step ends.
struct CancelAfterFirstStep {
    cancel: CancellationToken,
    events: Vec<ExecutionEvent>,
}

impl EventSink for CancelAfterFirstStep {
    fn emit(&mut self, event: ExecutionEvent, _stats: &StatsSnapshot) {
        if matches!(
            event,
            ExecutionEvent::JobFinished { .. } | ExecutionEvent::JobPreempted { .. }
        ) {
            self.cancel.cancel();
        }
        self.events.push(event);
    }
}

#[test]
fn test_round_robin_quantum_cycles() {
    let mut pool = pool_with(&[7]);
    let mut stats = Statistics::new();
    let mut events: Vec<ExecutionEvent> = Vec::new();

    let report = run(
        &mut pool,
        &mut stats,
        100,
        Some(3),
        &CancellationToken::new(),
        &mut events,
    )
    .unwrap();

    // 7 -> 4 -> 1 -> 0
    assert_eq!(report.service_steps, 3);
    assert_eq!(preempted(&events), vec![(0, 4), (0, 1)]);
    assert_eq!(ticks(&events), vec![6, 5, 4, 3, 2, 1, 0]);
    assert_eq!(events.first(), Some(&ExecutionEvent::JobStarted { job_id: 0 }));
    assert_eq!(
        &events[events.len() - 2..],
        &[
            ExecutionEvent::JobFinished { job_id: 0 },
            ExecutionEvent::RunCompleted {
                budget_remaining: 93
            },
        ]
    );
    assert_eq!(stats.preemptions(), 2);
}

#[test]
fn test_non_preemptive_runs_in_pool_order() {
    let mut pool = pool_with(&[3, 1, 2]);
    let mut stats = Statistics::new();
    let mut events: Vec<ExecutionEvent> = Vec::new();

    let report = run(
        &mut pool,
        &mut stats,
        100,
        None,
        &CancellationToken::new(),
        &mut events,
    )
    .unwrap();

    let finished: Vec<u64> = report.finished.iter().map(|j| j.id).collect();
    assert_eq!(finished, vec![0, 1, 2]);
    assert!(preempted(&events).is_empty());
    assert_eq!(report.stop_reason, StopReason::PoolDrained);
    assert_eq!(report.budget_remaining, 94);
    assert!(report.finished.iter().all(|j| j.state() == JobState::Finished));
}

#[test]
fn test_budget_exhaustion_clamps_service() {
    let mut pool = pool_with(&[10]);
    let mut stats = Statistics::new();
    let mut events: Vec<ExecutionEvent> = Vec::new();

    let report = run(
        &mut pool,
        &mut stats,
        5,
        None,
        &CancellationToken::new(),
        &mut events,
    )
    .unwrap();

    assert_eq!(report.stop_reason, StopReason::BudgetExhausted);
    assert_eq!(report.budget_remaining, 0);
    assert!(report.finished.is_empty());

    let job = pool.get(0).unwrap();
    assert_eq!(job.remaining_time(), 5);
    assert_eq!(job.state(), JobState::Preempted);
    assert!(job.started());
    assert_eq!(ticks(&events), vec![9, 8, 7, 6, 5]);
    assert_eq!(
        events.last(),
        Some(&ExecutionEvent::RunCompleted {
            budget_remaining: 0
        })
    );
}

#[test]
fn test_round_robin_budget_never_negative() {
    let mut pool = pool_with(&[10, 10]);
    let mut stats = Statistics::new();
    let mut events: Vec<ExecutionEvent> = Vec::new();

    let report = run(
        &mut pool,
        &mut stats,
        7,
        Some(3),
        &CancellationToken::new(),
        &mut events,
    )
    .unwrap();

    assert_eq!(report.budget_remaining, 0);
    assert_eq!(stats.time_serviced(), 7);
    // 3 + 3 + 1
    assert_eq!(preempted(&events), vec![(0, 7), (1, 7), (0, 6)]);
}

#[test]
fn test_conservation_and_single_finish() {
    let mut pool = pool_with(&[4, 9, 2, 6, 1, 3]);
    let before = pool.len();
    let mut stats = Statistics::new();
    let mut events: Vec<ExecutionEvent> = Vec::new();

    run(
        &mut pool,
        &mut stats,
        15,
        Some(2),
        &CancellationToken::new(),
        &mut events,
    )
    .unwrap();

    assert_eq!(stats.finished() as usize + pool.len(), before);

    let mut seen = HashSet::new();
    for event in &events {
        if let ExecutionEvent::JobFinished { job_id } = event {
            assert!(seen.insert(*job_id), "job {job_id} finished twice");
            assert!(!pool.contains_id(*job_id));
        }
    }
    assert_eq!(seen.len() as u64, stats.finished());
}

#[test]
fn test_remaining_time_is_monotonic() {
    let mut pool = pool_with(&[5, 8, 3]);
    let mut stats = Statistics::new();
    let mut events: Vec<ExecutionEvent> = Vec::new();

    run(
        &mut pool,
        &mut stats,
        100,
        Some(2),
        &CancellationToken::new(),
        &mut events,
    )
    .unwrap();

    let mut last: HashMap<u64, u64> = HashMap::new();
    for event in &events {
        let remaining = match *event {
            ExecutionEvent::TickProgress { remaining_time, .. }
            | ExecutionEvent::JobPreempted { remaining_time, .. } => remaining_time,
            _ => continue,
        };
        let job_id = event.job_id().unwrap();
        if let Some(prev) = last.insert(job_id, remaining) {
            assert!(remaining <= prev, "job {job_id} went from {prev} to {remaining}");
        }
    }
}

#[test]
fn test_cancellation_allows_at_most_one_more_step() {
    let mut pool = pool_with(&[4, 4, 4, 4]);
    let mut stats = Statistics::new();
    let cancel = CancellationToken::new();
    let mut sink = CancelAfterFirstStep {
        cancel: cancel.clone(),
        events: Vec::new(),
    };

    let report = run(&mut pool, &mut stats, 100, Some(2), &cancel, &mut sink).unwrap();

    assert!(report.cancelled());
    assert_eq!(report.service_steps, 1);
    assert_eq!(preempted(&sink.events), vec![(0, 2)]);
    assert_eq!(pool.len(), 4);
    assert_eq!(pool.not_started_count(), 3);
}

#[test]
fn test_rejected_run_leaves_pool_untouched() {
    let mut pool = pool_with(&[3, 2]);
    let snapshot: Vec<Job> = pool.iter().cloned().collect();
    let mut stats = Statistics::new();
    let mut events: Vec<ExecutionEvent> = Vec::new();
    let cancel = CancellationToken::new();

    let err = run(&mut pool, &mut stats, 0, None, &cancel, &mut events).unwrap_err();
    assert_eq!(err, SimError::InvalidBudget(0));

    let err = run(&mut pool, &mut stats, 10, Some(-1), &cancel, &mut events).unwrap_err();
    assert_eq!(err, SimError::InvalidQuantum(Some(-1)));

    assert!(events.is_empty());
    assert_eq!(pool.iter().cloned().collect::<Vec<_>>(), snapshot);
    assert_eq!(stats.time_serviced(), 0);
}

#[test]
fn test_stats_follow_every_event() {
    let mut pool = pool_with(&[2, 2]);
    let mut stats = Statistics::new();
    let mut updates: Vec<EngineUpdate> = Vec::new();
    let engine = ExecutionEngine::new(100, None).unwrap();

    engine.run(&mut pool, &mut stats, &CancellationToken::new(), &mut updates);

    let first_started = &updates[0];
    assert_eq!(first_started.event, ExecutionEvent::JobStarted { job_id: 0 });
    assert_eq!(first_started.stats.not_started, 1);
    assert_eq!(first_started.stats.total_active, 2);

    let finishes: Vec<(usize, u64)> = updates
        .iter()
        .filter(|u| matches!(u.event, ExecutionEvent::JobFinished { .. }))
        .map(|u| (u.stats.total_active, u.stats.finished))
        .collect();
    assert_eq!(finishes, vec![(1, 1), (0, 2)]);
}

#[test]
fn test_events_serialize_with_tag() {
    let event = ExecutionEvent::TickProgress {
        job_id: 3,
        remaining_time: 2,
    };
    let json = serde_json::to_value(event).unwrap();
    assert_eq!(json["event"], "tick_progress");
    assert_eq!(json["job_id"], 3);
    assert_eq!(json["remaining_time"], 2);
}

#[test]
fn test_only_run_completed_has_no_job_id() {
    let mut pool = pool_with(&[2, 1]);
    let mut stats = Statistics::new();
    let mut events: Vec<ExecutionEvent> = Vec::new();

    run(
        &mut pool,
        &mut stats,
        10,
        Some(1),
        &CancellationToken::new(),
        &mut events,
    )
    .unwrap();

    let (last, rest) = events.split_last().unwrap();
    assert_eq!(last.job_id(), None);
    assert!(rest.iter().all(|e| e.job_id().is_some()));
}
