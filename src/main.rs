use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use sched_sim::config::{RenderConfig, SimConfig};
use sched_sim::runner::{spawn_run, RunHandle};
use sched_sim::shutdown::install_cancel_handler;
use sched_sim::{EngineUpdate, ExecutionEvent, Job, Policy, RunReport, Simulation, StatsSnapshot};

#[derive(Parser, Debug)]
#[command(name = "sched-sim")]
#[command(version)]
#[command(about = "Simulate CPU scheduling policies over synthetic jobs")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate jobs and run them under a scheduling policy
    Run(RunArgs),

    /// Generate a job set and print it without running
    Generate(GenerateArgs),
}

// =============================================================================
// Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct RunArgs {
    /// Scheduling policy
    #[arg(long, short = 'p', default_value = "fcfs")]
    policy: Policy,

    /// Simulated time units available per run
    #[arg(long, short = 'b', default_value = "100", allow_negative_numbers = true)]
    budget: i64,

    /// Round-robin quantum (ignored by other policies)
    #[arg(long, short = 'q', default_value = "3", allow_negative_numbers = true)]
    quantum: i64,

    /// Number of jobs to generate (random 1-20 if omitted)
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Seed for reproducible job sets
    #[arg(long)]
    seed: Option<u64>,

    /// Number of runs over the same pool
    #[arg(long, default_value = "1")]
    rounds: u32,

    /// Keep generating a batch before every run until interrupted
    #[arg(long)]
    continuous: bool,

    /// Delay per rendered tick in milliseconds
    #[arg(long, default_value = "20")]
    tick_delay_ms: u64,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Number of jobs to generate (random 1-20 if omitted)
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Seed for reproducible job sets
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// JSON Output Types
// =============================================================================

#[derive(Serialize)]
struct RoundOutput<'a> {
    round: u32,
    policy: Policy,
    report: &'a RunReport,
    stats: StatsSnapshot,
}

#[derive(Serialize)]
struct JobListOutput<'a> {
    jobs: Vec<&'a Job>,
    total_count: usize,
}

// =============================================================================
// Rendering
// =============================================================================

fn stats_line(stats: &StatsSnapshot) -> String {
    format!(
        "Jobs: {} | Not started: {} | Finished: {}",
        stats.total_active, stats.not_started, stats.finished
    )
}

async fn render_update(
    update: &EngineUpdate,
    output: &OutputFormat,
    tick_delay: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    if let OutputFormat::Json = output {
        println!("{}", serde_json::to_string(update)?);
    } else {
        match update.event {
            ExecutionEvent::JobStarted { job_id } => {
                println!("Job {:<4} started", job_id);
            }
            ExecutionEvent::TickProgress {
                job_id,
                remaining_time,
            } => {
                println!("Job {:<4} time left: {}TU", job_id, remaining_time);
            }
            ExecutionEvent::JobPreempted {
                job_id,
                remaining_time,
            } => {
                println!("Job {:<4} preempted with {}TU left", job_id, remaining_time);
                println!("  {}", stats_line(&update.stats));
            }
            ExecutionEvent::JobFinished { job_id } => {
                println!("Job {:<4} finished", job_id);
                println!("  {}", stats_line(&update.stats));
            }
            ExecutionEvent::RunCompleted { budget_remaining } => {
                println!("Run completed, budget remaining: {}TU", budget_remaining);
            }
        }
    }

    if matches!(update.event, ExecutionEvent::TickProgress { .. }) && !tick_delay.is_zero() {
        tokio::time::sleep(tick_delay).await;
    }
    Ok(())
}

fn print_round(
    round: u32,
    policy: Policy,
    report: &RunReport,
    stats: StatsSnapshot,
    output: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        OutputFormat::Json => {
            let out = RoundOutput {
                round,
                policy,
                report,
                stats,
            };
            println!("{}", serde_json::to_string(&out)?);
        }
        OutputFormat::Table => {
            println!();
            println!("Round:            {}", round);
            println!("Policy:           {}", policy);
            println!("Stopped:          {:?}", report.stop_reason);
            println!("Service steps:    {}", report.service_steps);
            println!("Budget remaining: {}", report.budget_remaining);
            println!("Finished jobs:    {}", report.finished.len());
            println!("{}", stats_line(&stats));
            println!("Preemptions:      {}", stats.preemptions);
            println!("Time serviced:    {}TU", stats.time_serviced);
        }
    }
    Ok(())
}

fn print_jobs(simulation: &Simulation, output: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        OutputFormat::Json => {
            let jobs: Vec<&Job> = simulation.pool().iter().collect();
            let out = JobListOutput {
                total_count: jobs.len(),
                jobs,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Table => {
            println!(
                "{:<6} {:<16} {:<9} {:<9} {:<9} {:<10}",
                "ID", "ARRIVAL (ms)", "PRIORITY", "DURATION", "SERVICED", "STATE"
            );
            println!("{}", "-".repeat(64));
            for job in simulation.pool().iter() {
                println!(
                    "{:<6} {:<16} {:<9} {:<9} {:<9} {:<10}",
                    job.id,
                    job.arrival_time,
                    job.priority,
                    format!("{}TU", job.remaining_time()),
                    format!("{}TU", job.serviced_time()),
                    job.state()
                );
            }
            println!();
            println!("Total: {} jobs", simulation.pool().len());
        }
    }
    Ok(())
}

// =============================================================================
// Command Handlers
// =============================================================================

fn build_config(args: &RunArgs) -> SimConfig {
    let mut config = SimConfig::new(args.policy, args.budget).with_quantum(args.quantum);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.continuous {
        config = config.with_pool_cap(50);
    }
    config.render = RenderConfig {
        tick_delay_ms: args.tick_delay_ms,
        ..RenderConfig::default()
    };
    config
}

async fn handle_run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args);
    let tick_delay = Duration::from_millis(config.render.tick_delay_ms);

    let cancel = CancellationToken::new();
    install_cancel_handler(cancel.clone());

    let mut simulation = Simulation::from_config(&config);
    simulation.generate(args.jobs)?;

    tracing::info!(
        policy = %config.policy,
        budget = config.run_time_budget,
        quantum = ?config.effective_quantum(),
        jobs = simulation.pool().len(),
        continuous = args.continuous,
        "Starting simulation"
    );

    let mut round = 0u32;
    loop {
        round += 1;

        let RunHandle { mut updates, task } = spawn_run(
            simulation,
            config.policy,
            config.run_time_budget,
            config.effective_quantum(),
            cancel.clone(),
            config.render.channel_capacity,
        );

        while let Some(update) = updates.next().await {
            render_update(&update, &args.output, tick_delay).await?;
        }

        let (sim, result) = task.await?;
        simulation = sim;
        let report = result?;
        print_round(
            round,
            config.policy,
            &report,
            simulation.snapshot(),
            &args.output,
        )?;

        if cancel.is_cancelled() {
            break;
        }
        if args.continuous {
            simulation.generate(None)?;
            continue;
        }
        if round >= args.rounds || simulation.pool().is_empty() {
            break;
        }
    }

    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SimConfig::default();
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut simulation = Simulation::from_config(&config);
    simulation.generate(args.jobs)?;
    print_jobs(&simulation, &args.output)
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Run(run_args) => handle_run(run_args).await?,
        Commands::Generate(generate_args) => handle_generate(generate_args)?,
    }

    Ok(())
}
