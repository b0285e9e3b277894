//! Process handle with RAII semantics
//!
//! The OS resource behind a [`ProcessHandle`] is released when the handle is
//! dropped, on every exit path.

use crate::core::types::{Address, MemoryError, MemoryResult, ProcessId};
use crate::memory::regions::RegionInfo;
use crate::memory::ProcessMemory;
use std::fmt;

/// Access rights for process handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessAccess {
    value: u32,
}

impl ProcessAccess {
    /// Query information access
    pub const QUERY_INFORMATION: Self = Self { value: 0x0400 };
    /// Read memory access
    pub const VM_READ: Self = Self { value: 0x0010 };
    /// Write memory access
    pub const VM_WRITE: Self = Self { value: 0x0020 };
    /// Memory operations (required alongside VM_WRITE)
    pub const VM_OPERATION: Self = Self { value: 0x0008 };

    /// Combine access rights
    pub const fn combine(rights: &[Self]) -> Self {
        let mut value = 0;
        let mut i = 0;
        while i < rights.len() {
            value |= rights[i].value;
            i += 1;
        }
        Self { value }
    }

    /// Rights needed by the scanner and refiner
    pub const fn read() -> Self {
        Self::combine(&[Self::QUERY_INFORMATION, Self::VM_READ])
    }

    /// Rights needed by the writer
    pub const fn read_write() -> Self {
        Self::combine(&[
            Self::QUERY_INFORMATION,
            Self::VM_READ,
            Self::VM_WRITE,
            Self::VM_OPERATION,
        ])
    }

    /// Get raw value
    pub const fn value(&self) -> u32 {
        self.value
    }

    pub const fn allows_write(&self) -> bool {
        self.value & Self::VM_WRITE.value != 0
    }
}

#[cfg(windows)]
mod backend {
    use super::*;
    use crate::windows::bindings::kernel32;
    use crate::windows::types::Handle;

    pub struct Backend {
        handle: Handle,
    }

    impl Backend {
        pub fn open(pid: ProcessId, access: ProcessAccess) -> MemoryResult<Self> {
            let raw = kernel32::open_process(pid, access.value())?;
            Ok(Backend {
                handle: Handle::new(raw),
            })
        }

        pub fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
            unsafe { kernel32::read_process_memory(self.handle.raw(), address.as_usize(), buffer) }
        }

        pub fn write(&self, address: Address, data: &[u8]) -> MemoryResult<usize> {
            unsafe { kernel32::write_process_memory(self.handle.raw(), address.as_usize(), data) }
        }

        pub fn query(&self, address: Address) -> MemoryResult<RegionInfo> {
            let mbi = unsafe { kernel32::virtual_query_ex(self.handle.raw(), address.as_usize())? };
            Ok(kernel32::region_from_mbi(&mbi))
        }
    }
}

#[cfg(target_os = "linux")]
mod backend {
    use super::*;
    use crate::procfs::{self, MapsEntry};
    use process_memory::{CopyAddress, Pid, PutAddress, TryIntoProcessHandle};

    pub struct Backend {
        handle: process_memory::ProcessHandle,
        // Region snapshot, valid for the handle's lifetime.
        maps: Vec<MapsEntry>,
    }

    impl Backend {
        pub fn open(pid: ProcessId, _access: ProcessAccess) -> MemoryResult<Self> {
            let raw = Pid::try_from(pid)
                .ok()
                .filter(|&raw| raw > 0)
                .ok_or_else(|| MemoryError::ProcessNotFound(format!("PID: {}", pid)))?;

            // Also confirms the process exists and that we may inspect it.
            let maps = procfs::read_maps(pid)?;
            let handle = raw
                .try_into_process_handle()
                .map_err(|e| MemoryError::access_denied(pid, e.to_string()))?;

            Ok(Backend { handle, maps })
        }

        pub fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
            // A short copy is reported as success, so never leave stale bytes behind.
            buffer.fill(0);
            self.handle
                .copy_address(address.as_usize(), buffer)
                .map_err(|e| MemoryError::read_failed(address, e.to_string()))?;
            Ok(buffer.len())
        }

        pub fn write(&self, address: Address, data: &[u8]) -> MemoryResult<usize> {
            self.handle
                .put_address(address.as_usize(), data)
                .map_err(|e| MemoryError::write_failed(address, e.to_string()))?;
            Ok(data.len())
        }

        pub fn query(&self, address: Address) -> MemoryResult<RegionInfo> {
            procfs::query_region(&self.maps, address)
        }
    }
}

#[cfg(not(any(windows, target_os = "linux")))]
mod backend {
    use super::*;

    pub enum Backend {}

    impl Backend {
        pub fn open(_pid: ProcessId, _access: ProcessAccess) -> MemoryResult<Self> {
            Err(MemoryError::UnsupportedOperation(
                "process memory access is not available on this platform".to_string(),
            ))
        }

        pub fn read(&self, _address: Address, _buffer: &mut [u8]) -> MemoryResult<usize> {
            match *self {}
        }

        pub fn write(&self, _address: Address, _data: &[u8]) -> MemoryResult<usize> {
            match *self {}
        }

        pub fn query(&self, _address: Address) -> MemoryResult<RegionInfo> {
            match *self {}
        }
    }
}

/// Owned access to a target process
pub struct ProcessHandle {
    backend: backend::Backend,
    pid: ProcessId,
    access: ProcessAccess,
}

impl ProcessHandle {
    /// Open a process with specified access rights
    pub fn open(pid: ProcessId, access: ProcessAccess) -> MemoryResult<Self> {
        let backend = backend::Backend::open(pid, access)?;
        Ok(ProcessHandle {
            backend,
            pid,
            access,
        })
    }

    /// Open a process for reading memory
    pub fn open_for_read(pid: ProcessId) -> MemoryResult<Self> {
        Self::open(pid, ProcessAccess::read())
    }

    /// Open a process for reading and writing memory
    pub fn open_for_read_write(pid: ProcessId) -> MemoryResult<Self> {
        Self::open(pid, ProcessAccess::read_write())
    }

    /// Get the process ID
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Get the access rights
    pub fn access(&self) -> ProcessAccess {
        self.access
    }
}

impl ProcessMemory for ProcessHandle {
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
        self.backend.read(address, buffer)
    }

    fn write_memory(&self, address: Address, data: &[u8]) -> MemoryResult<usize> {
        if !self.access.allows_write() {
            return Err(MemoryError::write_failed(
                address,
                "handle was opened without write access",
            ));
        }
        self.backend.write(address, data)
    }

    fn query_region(&self, address: Address) -> MemoryResult<RegionInfo> {
        self.backend.query(address)
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("access", &format!("0x{:X}", self.access.value()))
            .finish()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessHandle(pid={})", self.pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_access_constants() {
        assert_eq!(ProcessAccess::QUERY_INFORMATION.value(), 0x0400);
        assert_eq!(ProcessAccess::VM_READ.value(), 0x0010);
        assert_eq!(ProcessAccess::VM_WRITE.value(), 0x0020);
        assert_eq!(ProcessAccess::VM_OPERATION.value(), 0x0008);
    }

    #[test]
    fn test_process_access_combine() {
        assert_eq!(ProcessAccess::read().value(), 0x0410);
        assert_eq!(ProcessAccess::read_write().value(), 0x0438);
        assert!(!ProcessAccess::read().allows_write());
        assert!(ProcessAccess::read_write().allows_write());
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_open_pid_zero_fails() {
        assert!(ProcessHandle::open_for_read(0).is_err());
        assert!(ProcessHandle::open_for_read_write(0).is_err());
    }

    #[test]
    #[cfg(any(windows, target_os = "linux"))]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_read_own_memory() {
        let value: i32 = 0x5EED_1234;
        let boxed = Box::new(value);
        let address = Address::new(&*boxed as *const i32 as usize);

        let handle = ProcessHandle::open_for_read(std::process::id()).unwrap();
        let mut buffer = [0u8; 4];
        let read = handle.read_memory(address, &mut buffer).unwrap();
        assert_eq!(read, 4);
        assert_eq!(i32::from_le_bytes(buffer), value);

        let info = handle.query_region(address).unwrap();
        assert!(info.contains(address));
        assert!(info.is_scannable(false));
    }

    #[test]
    #[cfg(any(windows, target_os = "linux"))]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_read_only_handle_refuses_writes() {
        let target = Box::new(0i32);
        let address = Address::new(&*target as *const i32 as usize);
        let handle = ProcessHandle::open_for_read(std::process::id()).unwrap();
        assert!(handle.write_memory(address, &1i32.to_le_bytes()).is_err());
    }

    #[test]
    #[cfg(any(windows, target_os = "linux"))]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_write_then_read_own_memory() {
        let target = Box::new([0x11i32, 0x22, 0x33]);
        let address = Address::new(target.as_ptr() as usize + 4);
        let handle = ProcessHandle::open_for_read_write(std::process::id()).unwrap();

        let written = handle.write_memory(address, &(-5i32).to_le_bytes()).unwrap();
        assert_eq!(written, 4);

        let mut buffer = [0xFFu8; 12];
        let start = Address::new(target.as_ptr() as usize);
        assert_eq!(handle.read_memory(start, &mut buffer).unwrap(), 12);
        assert_eq!(&buffer[4..8], &(-5i32).to_le_bytes());
        assert_eq!(&buffer[8..12], &0x33i32.to_le_bytes());
        assert_eq!(unsafe { std::ptr::read_volatile(&target[1]) }, -5);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_open_missing_process_fails() {
        // Above the kernel's pid_max ceiling
        let result = ProcessHandle::open_for_read(0x3FFF_FFFF);
        assert!(matches!(result, Err(MemoryError::ProcessNotFound(_))));

        let result = ProcessHandle::open_for_read(u32::MAX);
        assert!(matches!(result, Err(MemoryError::ProcessNotFound(_))));
    }

    #[test]
    #[cfg(any(windows, target_os = "linux"))]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_display_and_debug() {
        let handle = ProcessHandle::open_for_read(std::process::id()).unwrap();
        let pid = std::process::id();
        assert_eq!(format!("{}", handle), format!("ProcessHandle(pid={})", pid));
        assert!(format!("{:?}", handle).contains("0x410"));
    }
}
