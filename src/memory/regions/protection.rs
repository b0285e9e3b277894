//! Memory protection flags
//!
//! Values follow the Windows `PAGE_*` encoding. Other backends translate
//! their native permissions into the same flags so region qualification is
//! decided in one place.

use std::fmt;

/// Memory protection flags
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtectionFlags {
    value: u32,
}

impl ProtectionFlags {
    // Protection constants
    pub const PAGE_NOACCESS: u32 = 0x01;
    pub const PAGE_READONLY: u32 = 0x02;
    pub const PAGE_READWRITE: u32 = 0x04;
    pub const PAGE_WRITECOPY: u32 = 0x08;
    pub const PAGE_EXECUTE: u32 = 0x10;
    pub const PAGE_EXECUTE_READ: u32 = 0x20;
    pub const PAGE_EXECUTE_READWRITE: u32 = 0x40;
    pub const PAGE_EXECUTE_WRITECOPY: u32 = 0x80;
    pub const PAGE_GUARD: u32 = 0x100;

    const READABLE: u32 = Self::PAGE_READONLY
        | Self::PAGE_READWRITE
        | Self::PAGE_EXECUTE_READ
        | Self::PAGE_EXECUTE_READWRITE;

    const COPY_ON_WRITE: u32 = Self::PAGE_WRITECOPY | Self::PAGE_EXECUTE_WRITECOPY;

    /// Create new protection flags
    pub const fn new(value: u32) -> Self {
        ProtectionFlags { value }
    }

    /// Get raw value
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Access bits with the modifier flags (guard, nocache, writecombine) masked off
    pub const fn base(&self) -> u32 {
        self.value & 0xFF
    }

    /// Check if guard page flag is set
    pub const fn is_guard(&self) -> bool {
        (self.value & Self::PAGE_GUARD) != 0
    }

    /// Check if the region is marked no-access
    pub const fn is_no_access(&self) -> bool {
        (self.value & Self::PAGE_NOACCESS) != 0
    }

    /// Check if protection allows writing
    pub const fn is_writable(&self) -> bool {
        (self.base()
            & (Self::PAGE_READWRITE
                | Self::PAGE_WRITECOPY
                | Self::PAGE_EXECUTE_READWRITE
                | Self::PAGE_EXECUTE_WRITECOPY))
            != 0
    }

    /// Whether the scanner may read this region.
    ///
    /// Copy-on-write pages are only accepted when `include_copy_on_write` is set.
    pub const fn is_scannable(&self, include_copy_on_write: bool) -> bool {
        if self.is_guard() || self.is_no_access() {
            return false;
        }

        let mut accepted = Self::READABLE;
        if include_copy_on_write {
            accepted |= Self::COPY_ON_WRITE;
        }

        (self.base() & accepted) != 0
    }
}

impl fmt::Debug for ProtectionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProtectionFlags(0x{:X})", self.value)
    }
}
