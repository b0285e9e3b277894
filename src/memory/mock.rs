//! Synthetic process memory for tests

use crate::core::types::{Address, MemoryError, MemoryResult, ProcessId};
use crate::memory::regions::{ProtectionFlags, RegionInfo, RegionState};
use crate::memory::ProcessMemory;
use crate::process::ProcessOpener;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

struct Segment {
    base: usize,
    size: usize,
    state: RegionState,
    protection: ProtectionFlags,
    bytes: RwLock<Vec<u8>>,
}

impl Segment {
    fn end(&self) -> usize {
        self.base.saturating_add(self.size)
    }

    fn contains(&self, address: usize) -> bool {
        address >= self.base && address < self.end()
    }
}

/// Builder for [`MockMemory`]. Segments must be added in ascending order.
#[derive(Default)]
pub struct MockMemoryBuilder {
    segments: Vec<Segment>,
    failing: Vec<(usize, usize)>,
}

impl MockMemoryBuilder {
    /// Committed region backed by `bytes`
    pub fn region(mut self, base: usize, bytes: Vec<u8>, protection: u32) -> Self {
        self.segments.push(Segment {
            base,
            size: bytes.len(),
            state: RegionState::Committed,
            protection: ProtectionFlags::new(protection),
            bytes: RwLock::new(bytes),
        });
        self
    }

    /// Committed read-write region holding consecutive little-endian `i32`s
    pub fn ints(self, base: usize, values: &[i32]) -> Self {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.region(base, bytes, ProtectionFlags::PAGE_READWRITE)
    }

    /// Reserved (uncommitted) region
    pub fn reserved(mut self, base: usize, size: usize) -> Self {
        self.segments.push(Segment {
            base,
            size,
            state: RegionState::Reserved,
            protection: ProtectionFlags::new(ProtectionFlags::PAGE_NOACCESS),
            bytes: RwLock::new(Vec::new()),
        });
        self
    }

    /// Reads touching `[start, start + len)` fail
    pub fn unreadable(mut self, start: usize, len: usize) -> Self {
        self.failing.push((start, start + len));
        self
    }

    pub fn build(self) -> MockMemory {
        MockMemory {
            segments: self.segments,
            failing: self.failing,
            reads: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
        }
    }
}

/// In-memory stand-in for a target process
pub struct MockMemory {
    segments: Vec<Segment>,
    failing: Vec<(usize, usize)>,
    reads: AtomicUsize,
    queries: AtomicUsize,
}

impl MockMemory {
    pub fn builder() -> MockMemoryBuilder {
        MockMemoryBuilder::default()
    }

    /// Number of read calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of region queries served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Overwrite the `i32` stored at `address`
    pub fn set_i32(&self, address: usize, value: i32) {
        let segment = self
            .segment_at(address)
            .expect("address must fall inside a mock segment");
        let offset = address - segment.base;
        let mut bytes = segment.bytes.write().unwrap();
        bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// The `i32` stored at `address`
    pub fn get_i32(&self, address: usize) -> i32 {
        let segment = self
            .segment_at(address)
            .expect("address must fall inside a mock segment");
        let offset = address - segment.base;
        let bytes = segment.bytes.read().unwrap();
        i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn segment_at(&self, address: usize) -> Option<&Segment> {
        self.segments.iter().find(|s| s.contains(address))
    }

    fn is_failing(&self, start: usize, end: usize) -> bool {
        self.failing.iter().any(|&(s, e)| start < e && s < end)
    }
}

impl ProcessMemory for MockMemory {
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let start = address.as_usize();

        let segment = self
            .segment_at(start)
            .filter(|s| s.state == RegionState::Committed)
            .ok_or_else(|| MemoryError::read_failed(address, "unmapped"))?;

        let end = start.saturating_add(buffer.len()).min(segment.end());
        if self.is_failing(start, end) {
            return Err(MemoryError::read_failed(address, "synthetic read failure"));
        }

        let bytes = segment.bytes.read().unwrap();
        let offset = start - segment.base;
        let count = end - start;
        buffer[..count].copy_from_slice(&bytes[offset..offset + count]);
        Ok(count)
    }

    fn write_memory(&self, address: Address, data: &[u8]) -> MemoryResult<usize> {
        let start = address.as_usize();
        let segment = self
            .segment_at(start)
            .filter(|s| s.state == RegionState::Committed && s.protection.is_writable())
            .ok_or_else(|| MemoryError::write_failed(address, "not writable"))?;

        let end = start.saturating_add(data.len()).min(segment.end());
        let count = end - start;
        let offset = start - segment.base;
        let mut bytes = segment.bytes.write().unwrap();
        bytes[offset..offset + count].copy_from_slice(&data[..count]);
        Ok(count)
    }

    fn query_region(&self, address: Address) -> MemoryResult<RegionInfo> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let cursor = address.as_usize();

        if let Some(segment) = self.segment_at(cursor) {
            return Ok(RegionInfo {
                base_address: Address::new(segment.base),
                size: segment.size,
                state: segment.state,
                protection: segment.protection,
            });
        }

        // Report the free gap up to the next segment, like VirtualQueryEx.
        let next = self
            .segments
            .iter()
            .filter(|s| s.base > cursor)
            .map(|s| s.base)
            .min()
            .ok_or_else(|| MemoryError::query_failed(address, "end of address space"))?;

        Ok(RegionInfo {
            base_address: address,
            size: next - cursor,
            state: RegionState::Free,
            protection: ProtectionFlags::new(ProtectionFlags::PAGE_NOACCESS),
        })
    }
}

/// Opener that always hands out the same synthetic process
pub struct MockOpener {
    memory: Arc<MockMemory>,
    opens: AtomicUsize,
    fail: AtomicBool,
}

impl MockOpener {
    pub fn new(memory: MockMemory) -> Self {
        MockOpener {
            memory: Arc::new(memory),
            opens: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn memory(&self) -> &MockMemory {
        &self.memory
    }

    /// Number of successful and failed open attempts
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Make subsequent opens fail as if the process had exited
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn open(&self, pid: ProcessId) -> MemoryResult<Arc<MockMemory>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(MemoryError::ProcessNotFound(format!("PID: {}", pid)));
        }
        Ok(Arc::clone(&self.memory))
    }
}

impl ProcessOpener for MockOpener {
    type Memory = Arc<MockMemory>;

    fn open_for_read(&self, pid: ProcessId) -> MemoryResult<Self::Memory> {
        self.open(pid)
    }

    fn open_for_read_write(&self, pid: ProcessId) -> MemoryResult<Self::Memory> {
        self.open(pid)
    }
}
