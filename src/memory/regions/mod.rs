//! Memory region model and enumeration
//!
//! A region is reported by the operating system with a state and a
//! protection. Only committed regions with a plain readable protection are
//! handed to the scanner.

pub mod enumerator;
pub mod protection;

pub use enumerator::{enumerate_regions, RegionEnumerator};
pub use protection::ProtectionFlags;

use crate::core::types::Address;

/// State of a memory region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
    /// Memory is committed and backed
    Committed,
    /// Memory is reserved but not committed
    Reserved,
    /// Memory is free/unallocated
    Free,
}

/// Information about a region as reported by the OS query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionInfo {
    /// Base address of the region
    pub base_address: Address,
    /// Size of the region in bytes
    pub size: usize,
    /// Current state of the region
    pub state: RegionState,
    /// Protection flags for the region
    pub protection: ProtectionFlags,
}

impl RegionInfo {
    /// Get the end address of the region, `None` if it would wrap
    pub fn end_address(&self) -> Option<Address> {
        self.base_address.checked_add(self.size)
    }

    /// Check if an address is within this region
    pub fn contains(&self, address: Address) -> bool {
        address >= self.base_address
            && self.end_address().map_or(true, |end| address < end)
    }

    /// Committed, readable, not guarded and not no-access
    pub fn is_scannable(&self, include_copy_on_write: bool) -> bool {
        self.state == RegionState::Committed
            && self.protection.is_scannable(include_copy_on_write)
    }
}

/// A committed, readable range `[start_address, end_address)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MemoryRegion {
    pub start_address: Address,
    pub end_address: Address,
}

impl MemoryRegion {
    pub fn new(start_address: Address, end_address: Address) -> Self {
        debug_assert!(start_address < end_address);
        MemoryRegion {
            start_address,
            end_address,
        }
    }

    pub fn size(&self) -> usize {
        self.end_address.offset_from(self.start_address)
    }
}
