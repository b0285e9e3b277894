//! `/proc/<pid>/maps` parsing

use crate::memory::regions::ProtectionFlags;

/// One line of a maps file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsEntry {
    pub start: usize,
    pub end: usize,
    pub perms: String,
}

impl MapsEntry {
    pub fn is_readable(&self) -> bool {
        self.perms.starts_with('r')
    }

    pub fn is_writable(&self) -> bool {
        self.perms.chars().nth(1) == Some('w')
    }

    pub fn is_executable(&self) -> bool {
        self.perms.chars().nth(2) == Some('x')
    }

    /// Same protection a Windows query would report for these permissions
    pub fn protection(&self) -> ProtectionFlags {
        let value = match (self.is_readable(), self.is_writable(), self.is_executable()) {
            (true, false, false) => ProtectionFlags::PAGE_READONLY,
            (true, true, false) => ProtectionFlags::PAGE_READWRITE,
            (true, false, true) => ProtectionFlags::PAGE_EXECUTE_READ,
            (true, true, true) => ProtectionFlags::PAGE_EXECUTE_READWRITE,
            (false, _, true) => ProtectionFlags::PAGE_EXECUTE,
            // Write-only mappings cannot be read.
            (false, _, false) => ProtectionFlags::PAGE_NOACCESS,
        };
        ProtectionFlags::new(value)
    }
}

/// Parse maps contents, skipping malformed lines. Output is sorted by start.
pub fn parse_maps(contents: &str) -> Vec<MapsEntry> {
    let mut entries: Vec<MapsEntry> = contents.lines().filter_map(parse_line).collect();
    entries.sort_by_key(|e| e.start);
    entries
}

fn parse_line(line: &str) -> Option<MapsEntry> {
    let mut parts = line.split_whitespace();
    let (start, end) = parts.next()?.split_once('-')?;
    let start = usize::from_str_radix(start, 16).ok()?;
    let end = usize::from_str_radix(end, 16).ok()?;
    if start >= end {
        return None;
    }

    let perms = parts.next()?.to_string();

    Some(MapsEntry { start, end, perms })
}
