use anyhow::{Context, Result};
use std::sync::Arc;
use std::thread;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use value_tracker::config::{load_config, validate_config, Config, DEFAULT_CONFIG_PATH};
use value_tracker::core::VERSION;
use value_tracker::tracker::{
    perform_pending_write, run_process_watch_loop, run_tracking_loop, ChannelNotifier,
    SearchOrchestrator, SharedState, TrackerEvent,
};
use value_tracker::{MemoryScanner, ScanOptions, SystemProcessOpener};

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn spawn_workers(
    config: &Config,
    state: &Arc<SharedState>,
    orchestrator: SearchOrchestrator<SystemProcessOpener, ChannelNotifier>,
) -> Result<Vec<thread::JoinHandle<()>>> {
    let mut workers = Vec::new();

    match (config.tracker.target_pid, config.tracker.process_name.clone()) {
        (Some(pid), _) => {
            info!("Tracking fixed PID {}", pid);
            state.set_process_id(pid);
        }
        (None, Some(name)) => {
            let state = Arc::clone(state);
            let interval = config.tracker.process_poll_interval();
            workers.push(
                thread::Builder::new()
                    .name("process-watch".to_string())
                    .spawn(move || run_process_watch_loop(&state, &name, interval))?,
            );
        }
        (None, None) => warn!("No target_pid or process_name configured; nothing will be scanned"),
    }

    let state = Arc::clone(state);
    let interval = config.tracker.cycle_interval();
    workers.push(
        thread::Builder::new()
            .name("tracking".to_string())
            .spawn(move || run_tracking_loop(&state, &orchestrator, interval))?,
    );

    Ok(workers)
}

fn join_workers(workers: Vec<thread::JoinHandle<()>>) {
    for worker in workers {
        let name = worker.thread().name().unwrap_or("worker").to_string();
        if let Err(panic) = worker.join() {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!("Worker thread {} panicked: {}", name, message);
        }
    }
}

async fn handle_line(state: &Arc<SharedState>, line: &str) -> Result<()> {
    let request = state.write_request();
    if !request.pending || request.input_ready {
        let observation = state.observe_text(line);
        info!("Observed {:?}", observation);
        return Ok(());
    }

    let Ok(value) = line.trim().parse::<i32>() else {
        info!("Write request cancelled");
        state.clear_write_request();
        return Ok(());
    };

    state.supply_write_value(value);
    let state = Arc::clone(state);
    let outcome =
        tokio::task::spawn_blocking(move || perform_pending_write(&state, &SystemProcessOpener))
            .await?;

    match outcome {
        Ok(Some(outcome)) => println!("Wrote {} ({} failed)", outcome.written, outcome.failed),
        Ok(None) => {}
        Err(e) => warn!("Write failed: {}", e),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;
    validate_config(&config).context("invalid configuration")?;

    init_logging(&config.logging.level);
    info!("Starting value-tracker v{}", VERSION);

    let state = Arc::new(SharedState::new());
    let scanner = MemoryScanner::new(ScanOptions::from(&config.scanner))?;
    let (notifier, mut events) = ChannelNotifier::channel();
    let orchestrator = SearchOrchestrator::new(SystemProcessOpener, scanner, notifier);
    let workers = spawn_workers(&config, &state, orchestrator)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
            Some(TrackerEvent::WriteRequested { candidates }) = events.recv() => {
                let list: Vec<String> = candidates.iter().map(ToString::to_string).collect();
                println!("Value found at {}. Enter a value to write:", list.join(", "));
            }
            line = lines.next_line() => match line? {
                Some(line) => handle_line(&state, &line).await?,
                None => break,
            },
        }
    }

    info!("Shutting down value-tracker");
    state.stop();
    tokio::task::spawn_blocking(move || join_workers(workers)).await?;

    Ok(())
}
