//! Long-running loops and the write performer

use crate::core::types::{MemoryError, MemoryResult};
use crate::memory::{write_candidates, WriteOutcome};
use crate::process::{find_process_by_name, ProcessOpener};
use crate::tracker::notifier::WriteNotifier;
use crate::tracker::orchestrator::SearchOrchestrator;
use crate::tracker::state::SharedState;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Run one orchestrator cycle per `interval` until the state is stopped.
///
/// Blocks the calling thread; scans run synchronously inside a cycle.
pub fn run_tracking_loop<O, N>(
    state: &SharedState,
    orchestrator: &SearchOrchestrator<O, N>,
    interval: Duration,
) where
    O: ProcessOpener,
    N: WriteNotifier,
{
    info!("Tracking loop started");
    while state.is_running() {
        let outcome = orchestrator.run_cycle(state);
        debug!("Cycle finished: {:?}", outcome);
        thread::sleep(interval);
    }
    info!("Tracking loop stopped");
}

/// Poll for a process named `name` and publish its id, or 0 when absent
pub fn run_process_watch_loop(state: &SharedState, name: &str, interval: Duration) {
    info!("Watching for process {}", name);
    while state.is_running() {
        let pid = match find_process_by_name(name) {
            Ok(pid) => pid.unwrap_or(0),
            Err(e) => {
                warn!("Process lookup for {} failed: {}", name, e);
                0
            }
        };

        let previous = state.process_id();
        if pid != previous {
            match pid {
                0 => info!("Process {} ({}) exited", name, previous),
                _ => info!("Found process {} with PID {}", name, pid),
            }
            state.set_process_id(pid);
        }

        thread::sleep(interval);
    }
}

/// Apply an answered write request to the current candidates.
///
/// Returns `Ok(None)` when no answered request is waiting. The request is
/// consumed even if the write fails.
pub fn perform_pending_write<O: ProcessOpener>(
    state: &SharedState,
    opener: &O,
) -> MemoryResult<Option<WriteOutcome>> {
    let Some((value, candidates)) = state.take_ready_write() else {
        return Ok(None);
    };

    let pid = state.process_id();
    if pid == 0 {
        return Err(MemoryError::ProcessNotFound(
            "no target process to write to".to_string(),
        ));
    }

    let memory = opener.open_for_read_write(pid)?;
    let outcome = write_candidates(&memory, &candidates, value)?;
    info!(
        "Wrote {} to {} of {} addresses in process {}",
        value,
        outcome.written,
        candidates.len(),
        pid
    );
    Ok(Some(outcome))
}
