//! Memory operations over a target process
//!
//! This module provides the scanning engine:
//! - Region enumeration of committed, readable memory
//! - Bulk scanning for a 4-byte integer across every readable byte offset
//! - Refinement of a known candidate list against a new value
//! - The single bounded write applied to the surviving candidates

pub mod refiner;
pub mod regions;
pub mod scanner;
pub mod writer;

#[cfg(test)]
pub mod mock;

pub use refiner::{read_i32, refine};
pub use regions::{enumerate_regions, MemoryRegion, RegionEnumerator, RegionInfo, RegionState};
pub use scanner::{scan_buffer, MemoryScanner, ScanOptions, ScanReport};
pub use writer::{write_candidates, WriteOutcome};

#[cfg(test)]
pub use mock::{MockMemory, MockOpener};

use crate::core::types::{Address, MemoryResult};
use std::sync::Arc;

/// Access to the address space of a single target process.
///
/// Implemented by [`crate::process::ProcessHandle`] for live processes and by
/// synthetic memory in tests.
pub trait ProcessMemory: Send + Sync {
    /// Reads into `buffer`, returning the number of bytes actually copied.
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize>;

    /// Writes `data`, returning the number of bytes actually written.
    fn write_memory(&self, address: Address, data: &[u8]) -> MemoryResult<usize>;

    /// Describes the region containing `address`, or the free gap that starts
    /// at it. An error marks the end of the queryable address space.
    fn query_region(&self, address: Address) -> MemoryResult<RegionInfo>;
}

impl<M: ProcessMemory + ?Sized> ProcessMemory for Arc<M> {
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
        (**self).read_memory(address, buffer)
    }

    fn write_memory(&self, address: Address, data: &[u8]) -> MemoryResult<usize> {
        (**self).write_memory(address, data)
    }

    fn query_region(&self, address: Address) -> MemoryResult<RegionInfo> {
        (**self).query_region(address)
    }
}
