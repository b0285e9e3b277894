//! Kernel32.dll bindings for process and memory operations

use crate::core::types::{Address, MemoryError, MemoryResult};
use crate::memory::regions::{ProtectionFlags, RegionInfo, RegionState};
use std::mem;
use winapi::shared::minwindef::{FALSE, LPCVOID, LPVOID};
use winapi::shared::winerror::{ERROR_ACCESS_DENIED, ERROR_PARTIAL_COPY};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{ReadProcessMemory, VirtualQueryEx, WriteProcessMemory};
use winapi::um::processthreadsapi::OpenProcess;
use winapi::um::winnt::{HANDLE, MEMORY_BASIC_INFORMATION, MEM_COMMIT, MEM_RESERVE};

/// Safe wrapper for OpenProcess
pub fn open_process(pid: u32, desired_access: u32) -> MemoryResult<HANDLE> {
    let handle = unsafe { OpenProcess(desired_access, FALSE, pid) };
    if !handle.is_null() {
        return Ok(handle);
    }

    match unsafe { GetLastError() } {
        ERROR_ACCESS_DENIED => Err(MemoryError::access_denied(pid, "OpenProcess denied")),
        code => Err(MemoryError::ProcessNotFound(format!(
            "PID: {} (error {})",
            pid, code
        ))),
    }
}

/// Safe wrapper for CloseHandle
///
/// # Safety
/// The handle must be a valid Windows handle owned by the caller
pub unsafe fn close_handle(handle: HANDLE) -> MemoryResult<()> {
    if handle.is_null() {
        return Ok(());
    }

    if CloseHandle(handle) == FALSE {
        Err(MemoryError::WindowsApi(format!(
            "CloseHandle failed (error {})",
            GetLastError()
        )))
    } else {
        Ok(())
    }
}

/// Safe wrapper for ReadProcessMemory
///
/// A partial copy that transferred some bytes is reported as success with the
/// shorter count.
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_VM_READ`
pub unsafe fn read_process_memory(
    handle: HANDLE,
    address: usize,
    buffer: &mut [u8],
) -> MemoryResult<usize> {
    let mut bytes_read = 0;

    let result = ReadProcessMemory(
        handle,
        address as LPCVOID,
        buffer.as_mut_ptr() as LPVOID,
        buffer.len(),
        &mut bytes_read,
    );

    if result != FALSE {
        return Ok(bytes_read);
    }

    let code = GetLastError();
    if code == ERROR_PARTIAL_COPY && bytes_read > 0 {
        return Ok(bytes_read);
    }

    Err(MemoryError::read_failed(
        Address::new(address),
        format!("ReadProcessMemory failed (error {})", code),
    ))
}

/// Safe wrapper for WriteProcessMemory
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_VM_WRITE`
pub unsafe fn write_process_memory(
    handle: HANDLE,
    address: usize,
    data: &[u8],
) -> MemoryResult<usize> {
    let mut bytes_written = 0;

    let result = WriteProcessMemory(
        handle,
        address as LPVOID,
        data.as_ptr() as LPCVOID,
        data.len(),
        &mut bytes_written,
    );

    if result == FALSE {
        Err(MemoryError::write_failed(
            Address::new(address),
            format!("WriteProcessMemory failed (error {})", GetLastError()),
        ))
    } else {
        Ok(bytes_written)
    }
}

/// Safe wrapper for VirtualQueryEx
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_QUERY_INFORMATION`
pub unsafe fn virtual_query_ex(
    handle: HANDLE,
    address: usize,
) -> MemoryResult<MEMORY_BASIC_INFORMATION> {
    let mut mbi: MEMORY_BASIC_INFORMATION = mem::zeroed();

    let result = VirtualQueryEx(
        handle,
        address as LPCVOID,
        &mut mbi,
        mem::size_of::<MEMORY_BASIC_INFORMATION>(),
    );

    if result == 0 {
        Err(MemoryError::query_failed(
            Address::new(address),
            format!("VirtualQueryEx failed (error {})", GetLastError()),
        ))
    } else {
        Ok(mbi)
    }
}

/// Translate MEMORY_BASIC_INFORMATION into RegionInfo
pub fn region_from_mbi(mbi: &MEMORY_BASIC_INFORMATION) -> RegionInfo {
    let state = match mbi.State {
        MEM_COMMIT => RegionState::Committed,
        MEM_RESERVE => RegionState::Reserved,
        _ => RegionState::Free,
    };

    RegionInfo {
        base_address: Address::new(mbi.BaseAddress as usize),
        size: mbi.RegionSize,
        state,
        protection: ProtectionFlags::new(mbi.Protect),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_null_handle_operations() {
        unsafe {
            assert!(close_handle(ptr::null_mut()).is_ok());

            let mut buffer = vec![0u8; 4];
            assert!(read_process_memory(ptr::null_mut(), 0x1000, &mut buffer).is_err());

            let data = vec![0u8; 4];
            assert!(write_process_memory(ptr::null_mut(), 0x1000, &data).is_err());

            assert!(virtual_query_ex(ptr::null_mut(), 0).is_err());
        }
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_open_invalid_process() {
        assert!(open_process(0, 0x0410).is_err());
    }

    #[test]
    fn test_region_from_mbi() {
        let mut mbi: MEMORY_BASIC_INFORMATION = unsafe { mem::zeroed() };
        mbi.BaseAddress = 0x10000 as _;
        mbi.RegionSize = 0x2000;
        mbi.State = MEM_COMMIT;
        mbi.Protect = ProtectionFlags::PAGE_READWRITE;

        let info = region_from_mbi(&mbi);
        assert_eq!(info.base_address, Address::new(0x10000));
        assert_eq!(info.size, 0x2000);
        assert_eq!(info.state, RegionState::Committed);
        assert!(info.is_scannable(false));
    }
}
