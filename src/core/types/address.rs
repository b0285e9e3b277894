//! Memory address wrapper type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page granularity used when skipping past unreadable memory.
pub const PAGE_SIZE: usize = 0x1000;

/// Represents a memory address in the target process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub usize);

impl Address {
    /// Creates a new address from a usize value
    pub const fn new(value: usize) -> Self {
        Address(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        Address(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns the raw usize value
    pub const fn as_usize(&self) -> usize {
        self.0
    }

    /// Adds a byte offset, returning `None` if the address space would wrap
    pub const fn checked_add(&self, offset: usize) -> Option<Self> {
        match self.0.checked_add(offset) {
            Some(value) => Some(Address(value)),
            None => None,
        }
    }

    /// First page boundary strictly above this address
    pub const fn next_page(&self) -> Option<Self> {
        match (self.0 | (PAGE_SIZE - 1)).checked_add(1) {
            Some(value) => Some(Address(value)),
            None => None,
        }
    }

    /// Distance in bytes from `base` to this address
    pub const fn offset_from(&self, base: Address) -> usize {
        self.0.wrapping_sub(base.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl From<usize> for Address {
    fn from(value: usize) -> Self {
        Address(value)
    }
}

impl From<Address> for usize {
    fn from(address: Address) -> Self {
        address.0
    }
}
