//! Value tracker library
//!
//! Finds the memory locations of an integer shown by another process and
//! follows them as the value changes, narrowing a full scan down to a handful
//! of addresses with cheap re-reads.

pub mod config;
pub mod core;
pub mod memory;
pub mod process;
pub mod tracker;

#[cfg(target_os = "linux")]
pub mod procfs;
#[cfg(windows)]
pub mod windows;

// Re-export main types from core module
pub use core::types::{Address, CandidateList, MemoryError, MemoryResult, ProcessId};

pub use memory::{MemoryScanner, ProcessMemory, ScanOptions};
pub use process::{ProcessHandle, ProcessOpener, SystemProcessOpener};
pub use tracker::{Observation, SearchOrchestrator, SharedState};
