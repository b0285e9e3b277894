//! Process access
//!
//! Opening a target process for reading or writing, and locating a process
//! by executable name.

pub mod handle;
pub mod locator;

pub use handle::{ProcessAccess, ProcessHandle};
pub use locator::find_process_by_name;

use crate::core::types::{MemoryResult, ProcessId};
use crate::memory::ProcessMemory;

/// Opens the memory of a target process for one scan, refine or write call.
///
/// The returned value owns any OS resource and releases it when dropped.
pub trait ProcessOpener: Send + Sync {
    type Memory: ProcessMemory;

    /// Open with query and read access
    fn open_for_read(&self, pid: ProcessId) -> MemoryResult<Self::Memory>;

    /// Open with query, read and write access
    fn open_for_read_write(&self, pid: ProcessId) -> MemoryResult<Self::Memory>;
}

/// Opens live processes through the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessOpener;

impl ProcessOpener for SystemProcessOpener {
    type Memory = ProcessHandle;

    fn open_for_read(&self, pid: ProcessId) -> MemoryResult<ProcessHandle> {
        ProcessHandle::open_for_read(pid)
    }

    fn open_for_read_write(&self, pid: ProcessId) -> MemoryResult<ProcessHandle> {
        ProcessHandle::open_for_read_write(pid)
    }
}
