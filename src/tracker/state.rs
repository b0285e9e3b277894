//! Shared state store
//!
//! One instance is built at startup and shared through `Arc` by the tracking
//! loop, the process watcher and whoever services write requests. Search
//! state lives under a single mutex and is swapped as a whole; the handshake
//! flags are atomics observed with acquire/release ordering.

use crate::core::types::{Address, CandidateList, ProcessId};
use crate::tracker::observation::{extract_number, Observation};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Copy of the search state at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSnapshot {
    pub last_searched_value: Option<i32>,
    pub candidates: CandidateList,
}

impl SearchSnapshot {
    /// True when there is nothing to reset
    pub fn is_initial(&self) -> bool {
        self.last_searched_value.is_none() && self.candidates.is_empty()
    }
}

/// Copy of the write handshake flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteRequest {
    pub pending: bool,
    pub input_ready: bool,
    pub value: i32,
}

impl WriteRequest {
    /// A request is waiting on input or on the writer
    pub fn in_flight(&self) -> bool {
        self.pending || self.input_ready
    }
}

#[derive(Debug)]
pub struct SharedState {
    running: AtomicBool,
    process_id: AtomicU32,
    observation: Mutex<Observation>,
    search: Mutex<SearchSnapshot>,
    write_pending: AtomicBool,
    write_input_ready: AtomicBool,
    write_value: AtomicI32,
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

// The guarded data is plain values, so a poisoned lock is still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SharedState {
    pub fn new() -> Self {
        SharedState {
            running: AtomicBool::new(true),
            process_id: AtomicU32::new(0),
            observation: Mutex::new(Observation::Absent),
            search: Mutex::new(SearchSnapshot::default()),
            write_pending: AtomicBool::new(false),
            write_input_ready: AtomicBool::new(false),
            write_value: AtomicI32::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask every loop to exit at its next iteration
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Current target, 0 when there is none
    pub fn process_id(&self) -> ProcessId {
        self.process_id.load(Ordering::Acquire)
    }

    pub fn set_process_id(&self, pid: ProcessId) {
        self.process_id.store(pid, Ordering::Release);
    }

    /// Extract a number from `text` and record it as the current observation
    pub fn observe_text(&self, text: &str) -> Observation {
        let observation = extract_number(text);
        self.set_observation(observation);
        observation
    }

    pub fn set_observation(&self, observation: Observation) {
        *lock(&self.observation) = observation;
    }

    pub fn observation(&self) -> Observation {
        *lock(&self.observation)
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        lock(&self.search).clone()
    }

    /// Replace the last searched value and the candidate list together
    pub fn commit(&self, last_searched_value: Option<i32>, candidates: CandidateList) {
        *lock(&self.search) = SearchSnapshot {
            last_searched_value,
            candidates,
        };
    }

    /// Return the search to its startup state
    pub fn reset_search(&self) {
        self.commit(None, CandidateList::new());
    }

    pub fn write_request(&self) -> WriteRequest {
        WriteRequest {
            pending: self.write_pending.load(Ordering::Acquire),
            input_ready: self.write_input_ready.load(Ordering::Acquire),
            value: self.write_value.load(Ordering::Acquire),
        }
    }

    /// Mark that a value is needed from the user
    pub fn begin_write_request(&self) {
        self.write_input_ready.store(false, Ordering::Release);
        self.write_pending.store(true, Ordering::Release);
    }

    /// Drop any request, answered or not
    pub fn clear_write_request(&self) {
        self.write_pending.store(false, Ordering::Release);
        self.write_input_ready.store(false, Ordering::Release);
    }

    /// Answer a pending request with `value`.
    ///
    /// Returns false if no request was pending.
    pub fn supply_write_value(&self, value: i32) -> bool {
        if !self.write_pending.load(Ordering::Acquire) {
            return false;
        }
        self.write_value.store(value, Ordering::Relaxed);
        self.write_input_ready.store(true, Ordering::Release);
        true
    }

    /// Consume an answered request, returning the value and the candidates to
    /// write. Both flags are cleared.
    pub fn take_ready_write(&self) -> Option<(i32, Vec<Address>)> {
        if self
            .write_input_ready
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }

        let value = self.write_value.load(Ordering::Relaxed);
        let candidates = self.snapshot().candidates;
        self.write_pending.store(false, Ordering::Release);
        Some((value, candidates))
    }
}
