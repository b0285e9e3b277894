//! Memory region enumeration functionality

use super::{MemoryRegion, RegionInfo};
use crate::core::types::Address;
use crate::memory::ProcessMemory;
use tracing::debug;

/// Walks a process address space and yields the scannable regions.
///
/// The walk starts at address zero and advances to `base + size` of every
/// queried region whether or not it qualifies. It ends when a query fails or
/// the cursor would wrap past the top of the address space. The iterator is
/// finite and cannot be restarted.
pub struct RegionEnumerator<'a, M: ?Sized> {
    memory: &'a M,
    cursor: Option<Address>,
    include_copy_on_write: bool,
}

impl<'a, M: ProcessMemory + ?Sized> RegionEnumerator<'a, M> {
    /// Create a new region enumerator for a process
    pub fn new(memory: &'a M) -> Self {
        RegionEnumerator {
            memory,
            cursor: Some(Address::null()),
            include_copy_on_write: false,
        }
    }

    /// Also yield `PAGE_WRITECOPY` / `PAGE_EXECUTE_WRITECOPY` regions
    pub fn include_copy_on_write(mut self, include: bool) -> Self {
        self.include_copy_on_write = include;
        self
    }

    /// Query the next raw region and move the cursor past it
    fn next_info(&mut self) -> Option<RegionInfo> {
        let cursor = self.cursor?;

        let info = match self.memory.query_region(cursor) {
            Ok(info) => info,
            Err(e) => {
                debug!("Region walk finished at {}: {}", cursor, e);
                self.cursor = None;
                return None;
            }
        };

        // A zero-sized or non-advancing answer would loop forever.
        self.cursor = info.end_address().filter(|next| *next > cursor);
        Some(info)
    }
}

impl<'a, M: ProcessMemory + ?Sized> Iterator for RegionEnumerator<'a, M> {
    type Item = MemoryRegion;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(info) = self.next_info() {
            if !info.is_scannable(self.include_copy_on_write) {
                continue;
            }

            let Some(end) = info.end_address() else {
                continue;
            };

            if info.base_address < end {
                return Some(MemoryRegion::new(info.base_address, end));
            }
        }

        None
    }
}

/// Collect every scannable region of a process
pub fn enumerate_regions<M: ProcessMemory + ?Sized>(
    memory: &M,
    include_copy_on_write: bool,
) -> Vec<MemoryRegion> {
    RegionEnumerator::new(memory)
        .include_copy_on_write(include_copy_on_write)
        .collect()
}
