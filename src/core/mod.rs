//! Core module containing the fundamental types shared by every component
//!
//! Addresses, error types and the identifiers passed between the scanner,
//! the refiner and the search orchestrator all live here.

pub mod types;

pub use types::{Address, CandidateList, MemoryError, MemoryResult, ProcessId};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
