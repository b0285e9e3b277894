//! Owned HANDLE wrapper, closed on drop

use crate::windows::bindings::kernel32;
use std::ptr;
use winapi::um::winnt::HANDLE;

/// Owned Windows HANDLE closed on drop
pub struct Handle {
    handle: HANDLE,
}

impl Handle {
    /// Take ownership of a raw handle
    pub fn new(handle: HANDLE) -> Self {
        Handle { handle }
    }

    /// Create a null handle
    pub fn null() -> Self {
        Handle {
            handle: ptr::null_mut(),
        }
    }

    /// Check if handle is null
    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }

    /// Get the raw handle; it stays owned by `self`
    pub fn raw(&self) -> HANDLE {
        self.handle
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            // Nothing useful can be done if close fails here.
            unsafe {
                let _ = kernel32::close_handle(self.handle);
            }
        }
    }
}

// HANDLEs are process-wide kernel object references.
unsafe impl Send for Handle {}
unsafe impl Sync for Handle {}
