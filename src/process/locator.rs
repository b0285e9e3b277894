//! Locate a running process by executable name

use crate::core::types::{MemoryResult, ProcessId};

/// Case-insensitive executable-name comparison, ignoring a trailing `.exe`
pub fn names_match(candidate: &str, wanted: &str) -> bool {
    fn normalize(name: &str) -> String {
        let lower = name.trim().to_ascii_lowercase();
        match lower.strip_suffix(".exe") {
            Some(stem) => stem.to_string(),
            None => lower,
        }
    }

    let wanted = normalize(wanted);
    !wanted.is_empty() && normalize(candidate) == wanted
}

/// Find the running process with the lowest PID whose executable name
/// matches `name`.
///
/// Returns `Ok(None)` when no process matches.
#[cfg(windows)]
pub fn find_process_by_name(name: &str) -> MemoryResult<Option<ProcessId>> {
    use crate::windows::bindings::tlhelp32::ProcessSnapshot;

    Ok(ProcessSnapshot::new()?
        .filter(|(_, exe)| names_match(exe, name))
        .map(|(pid, _)| pid)
        .min())
}

/// Find the running process with the lowest PID whose executable name
/// matches `name`.
///
/// Compares against both the process name (on Linux truncated by the kernel
/// to 15 bytes) and the basename of the executable path. Threads are skipped.
/// Returns `Ok(None)` when no process matches.
#[cfg(not(windows))]
pub fn find_process_by_name(name: &str) -> MemoryResult<Option<ProcessId>> {
    use sysinfo::{ProcessRefreshKind, RefreshKind, System, UpdateKind};

    let system = System::new_with_specifics(
        RefreshKind::nothing()
            .with_processes(ProcessRefreshKind::nothing().with_exe(UpdateKind::OnlyIfNotSet)),
    );

    Ok(system
        .processes()
        .values()
        .filter(|process| process.thread_kind().is_none())
        .filter(|process| {
            names_match(&process.name().to_string_lossy(), name)
                || process
                    .exe()
                    .and_then(|exe| exe.file_name())
                    .is_some_and(|exe| names_match(&exe.to_string_lossy(), name))
        })
        .map(|process| process.pid().as_u32())
        .min())
}
