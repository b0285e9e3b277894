//! Linux procfs layer
//!
//! `/proc/<pid>/maps` supplies the region list. Mapping permissions are
//! translated into [`ProtectionFlags`] so the region walk behaves the same as
//! it does against `VirtualQueryEx`.

pub mod maps;

pub use maps::{parse_maps, MapsEntry};

use crate::core::types::{Address, MemoryError, MemoryResult, ProcessId};
use crate::memory::regions::{ProtectionFlags, RegionInfo, RegionState};
use std::io;
use std::path::PathBuf;

fn proc_path(pid: ProcessId, file: &str) -> PathBuf {
    PathBuf::from(format!("/proc/{}/{}", pid, file))
}

fn map_open_error(pid: ProcessId, e: io::Error) -> MemoryError {
    match e.kind() {
        io::ErrorKind::NotFound => MemoryError::ProcessNotFound(format!("PID: {}", pid)),
        io::ErrorKind::PermissionDenied => MemoryError::access_denied(pid, e.to_string()),
        _ => MemoryError::IoError(e),
    }
}

/// Read and parse `/proc/<pid>/maps`
pub fn read_maps(pid: ProcessId) -> MemoryResult<Vec<MapsEntry>> {
    let contents =
        std::fs::read_to_string(proc_path(pid, "maps")).map_err(|e| map_open_error(pid, e))?;
    Ok(parse_maps(&contents))
}

/// Answer a region query from a maps snapshot.
///
/// Returns the mapping containing `address`, otherwise the free gap up to
/// the next mapping. Past the last mapping the query fails.
pub fn query_region(entries: &[MapsEntry], address: Address) -> MemoryResult<RegionInfo> {
    let cursor = address.as_usize();
    let index = entries.partition_point(|e| e.end <= cursor);

    let Some(entry) = entries.get(index) else {
        return Err(MemoryError::query_failed(address, "end of address space"));
    };

    if entry.start <= cursor {
        return Ok(RegionInfo {
            base_address: Address::new(entry.start),
            size: entry.end - entry.start,
            state: RegionState::Committed,
            protection: entry.protection(),
        });
    }

    Ok(RegionInfo {
        base_address: address,
        size: entry.start - cursor,
        state: RegionState::Free,
        protection: ProtectionFlags::new(ProtectionFlags::PAGE_NOACCESS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
00400000-00452000 r-xp 00000000 08:02 173521      /usr/bin/dbus-daemon
00651000-00652000 rw-p 00051000 08:02 173521      /usr/bin/dbus-daemon
7ffc0000-7ffc2000 ---p 00000000 00:00 0
";

    #[test]
    fn test_query_inside_mapping() {
        let entries = parse_maps(SAMPLE);
        let info = query_region(&entries, Address::new(0x400100)).unwrap();
        assert_eq!(info.base_address, Address::new(0x400000));
        assert_eq!(info.size, 0x52000);
        assert_eq!(info.state, RegionState::Committed);
        assert!(info.is_scannable(false));
    }

    #[test]
    fn test_query_gap_reports_free_region() {
        let entries = parse_maps(SAMPLE);
        let info = query_region(&entries, Address::new(0x452000)).unwrap();
        assert_eq!(info.base_address, Address::new(0x452000));
        assert_eq!(info.size, 0x651000 - 0x452000);
        assert_eq!(info.state, RegionState::Free);

        let low = query_region(&entries, Address::null()).unwrap();
        assert_eq!(low.size, 0x400000);
    }

    #[test]
    fn test_query_past_last_mapping_fails() {
        let entries = parse_maps(SAMPLE);
        assert!(query_region(&entries, Address::new(0x7ffc2000)).is_err());
    }

    #[test]
    fn test_open_missing_process() {
        // PIDs above the kernel limit never exist.
        match read_maps(u32::MAX) {
            Err(MemoryError::ProcessNotFound(_)) => {}
            other => panic!("expected ProcessNotFound, got {other:?}"),
        }
    }
}
