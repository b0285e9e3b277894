//! Core type definitions
//!
//! This module contains the address wrapper, the error type and the common
//! aliases used throughout the crate.

mod address;
mod error;

pub use address::{Address, PAGE_SIZE};
pub use error::{MemoryError, MemoryResult};

/// Operating-system process identifier. Zero means "no target".
pub type ProcessId = u32;

/// Addresses believed to hold the tracked value, in discovery order.
pub type CandidateList = Vec<Address>;
