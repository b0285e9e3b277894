//! Search orchestrator
//!
//! Decides once per cycle whether to do nothing, scan the whole target, or
//! refine the existing candidates, and raises a write request when the
//! candidate list settles into 1 to 3 addresses.

use crate::core::types::{Address, CandidateList, ProcessId};
use crate::memory::{refine, MemoryScanner};
use crate::process::ProcessOpener;
use crate::tracker::notifier::WriteNotifier;
use crate::tracker::observation::Observation;
use crate::tracker::state::SharedState;
use std::ops::RangeInclusive;
use tracing::{debug, info, warn};

/// Candidate counts that prompt for a value to write
pub const WRITE_REQUEST_RANGE: RangeInclusive<usize> = 1..=3;

/// What one cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A write request was pending or answered; nothing touched
    WriteInFlight,
    /// No target process; search state reset
    NoTarget,
    /// No number observed; write flags cleared and search state reset
    NoObservation,
    /// Observation equal to the last searched value; no I/O
    Unchanged { candidates: usize },
    /// Full scan of the target
    InitialScan { candidates: usize },
    /// Existing candidates narrowed
    Refined { candidates: usize },
}

impl CycleOutcome {
    /// Candidate count after the cycle, when the cycle reached dispatch
    pub fn candidates(&self) -> Option<usize> {
        match *self {
            CycleOutcome::Unchanged { candidates }
            | CycleOutcome::InitialScan { candidates }
            | CycleOutcome::Refined { candidates } => Some(candidates),
            _ => None,
        }
    }
}

pub struct SearchOrchestrator<O, N> {
    opener: O,
    scanner: MemoryScanner,
    notifier: N,
}

impl<O: ProcessOpener, N: WriteNotifier> SearchOrchestrator<O, N> {
    pub fn new(opener: O, scanner: MemoryScanner, notifier: N) -> Self {
        SearchOrchestrator {
            opener,
            scanner,
            notifier,
        }
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Run one cycle against the current contents of `state`
    pub fn run_cycle(&self, state: &SharedState) -> CycleOutcome {
        if state.write_request().in_flight() {
            debug!("Write request in flight, skipping cycle");
            return CycleOutcome::WriteInFlight;
        }

        let pid = state.process_id();
        if pid == 0 {
            if !state.snapshot().is_initial() {
                info!("Target process gone, resetting search");
                state.reset_search();
            }
            return CycleOutcome::NoTarget;
        }

        let observed = match state.observation() {
            Observation::Value(value) => value,
            Observation::Absent => {
                state.clear_write_request();
                if state.snapshot().last_searched_value.is_some() {
                    info!("No value observed, resetting search");
                    state.reset_search();
                }
                return CycleOutcome::NoObservation;
            }
        };

        let snapshot = state.snapshot();
        let outcome = if snapshot.last_searched_value == Some(observed) {
            CycleOutcome::Unchanged {
                candidates: snapshot.candidates.len(),
            }
        } else if snapshot.last_searched_value.is_none() || snapshot.candidates.is_empty() {
            info!("Value {} observed, scanning process {}", observed, pid);
            let candidates = self.initial_scan(pid, observed);
            let count = candidates.len();
            state.commit(Some(observed), candidates);
            CycleOutcome::InitialScan { candidates: count }
        } else {
            info!(
                "Value changed to {}, refining {} candidates",
                observed,
                snapshot.candidates.len()
            );
            let candidates = self.refine_candidates(pid, &snapshot.candidates, observed);
            let count = candidates.len();
            state.commit(Some(observed), candidates);
            CycleOutcome::Refined { candidates: count }
        };

        if let Some(count) = outcome.candidates() {
            self.evaluate_write_request(state, count);
        }

        outcome
    }

    fn initial_scan(&self, pid: ProcessId, value: i32) -> CandidateList {
        match self.opener.open_for_read(pid) {
            Ok(memory) => self.scanner.scan_process(&memory, value).candidates,
            Err(e) => {
                warn!("Failed to open process {} for scanning: {}", pid, e);
                CandidateList::new()
            }
        }
    }

    fn refine_candidates(&self, pid: ProcessId, candidates: &[Address], value: i32) -> CandidateList {
        match self.opener.open_for_read(pid) {
            Ok(memory) => refine(&memory, candidates, value),
            Err(e) => {
                warn!("Failed to open process {} for refinement: {}", pid, e);
                CandidateList::new()
            }
        }
    }

    fn evaluate_write_request(&self, state: &SharedState, count: usize) {
        if !WRITE_REQUEST_RANGE.contains(&count) {
            state.clear_write_request();
            return;
        }

        state.begin_write_request();
        let candidates = state.snapshot().candidates;
        info!("{} candidates left, requesting a value to write", count);

        if let Err(e) = self.notifier.notify_write_requested(&candidates) {
            warn!("Failed to post write request: {}", e);
            state.clear_write_request();
        }
    }
}
