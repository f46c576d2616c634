use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::engine::{EngineUpdate, RunReport};
use crate::error::Result;
use crate::scheduler::Policy;
use crate::simulation::Simulation;

/// Handle to a run executing on the blocking pool.
pub struct RunHandle {
    /// Engine output, in emission order. Ends when the run completes.
    pub updates: ReceiverStream<EngineUpdate>,
    /// Resolves to the simulation (moved back out) and the run result.
    pub task: JoinHandle<(Simulation, Result<RunReport>)>,
}

/// Run `simulation` off the async executor and stream its events.
///
/// The channel is bounded and the engine blocks on a full channel, so a
/// slow renderer paces the run and cancellation lands within a few events
/// of the renderer's position.
pub fn spawn_run(
    mut simulation: Simulation,
    policy: Policy,
    budget: i64,
    quantum: Option<i64>,
    cancel: CancellationToken,
    capacity: usize,
) -> RunHandle {
    let (mut tx, rx) = mpsc::channel::<EngineUpdate>(capacity.max(1));

    let task = tokio::task::spawn_blocking(move || {
        let result = simulation.run(policy, budget, quantum, &cancel, &mut tx);
        if let Err(ref e) = result {
            tracing::warn!(error = %e, %policy, "Run rejected");
        }
        (simulation, result)
    });

    RunHandle {
        updates: ReceiverStream::new(rx),
        task,
    }
}
