//! ToolHelp32 process snapshot bindings

use crate::core::types::{MemoryError, MemoryResult, ProcessId};
use crate::windows::types::Handle;
use std::mem;
use winapi::shared::minwindef::FALSE;
use winapi::um::handleapi::INVALID_HANDLE_VALUE;
use winapi::um::tlhelp32::{
    CreateToolhelp32Snapshot, Process32First, Process32Next, PROCESSENTRY32, TH32CS_SNAPPROCESS,
};

/// Iterates `(pid, exe name)` over a snapshot of running processes
pub struct ProcessSnapshot {
    snapshot: Handle,
    first_called: bool,
}

impl ProcessSnapshot {
    pub fn new() -> MemoryResult<Self> {
        let raw = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) };
        if raw.is_null() || raw == INVALID_HANDLE_VALUE {
            return Err(MemoryError::WindowsApi(
                "Failed to create process snapshot".to_string(),
            ));
        }

        Ok(ProcessSnapshot {
            snapshot: Handle::new(raw),
            first_called: false,
        })
    }
}

impl Iterator for ProcessSnapshot {
    type Item = (ProcessId, String);

    fn next(&mut self) -> Option<Self::Item> {
        let mut entry: PROCESSENTRY32 = unsafe { mem::zeroed() };
        entry.dwSize = mem::size_of::<PROCESSENTRY32>() as u32;

        let success = unsafe {
            if self.first_called {
                Process32Next(self.snapshot.raw(), &mut entry)
            } else {
                self.first_called = true;
                Process32First(self.snapshot.raw(), &mut entry)
            }
        };

        if success == FALSE {
            return None;
        }

        let name_bytes: Vec<u8> = entry
            .szExeFile
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| c as u8)
            .collect();

        Some((
            entry.th32ProcessID,
            String::from_utf8_lossy(&name_bytes).into_owned(),
        ))
    }
}
