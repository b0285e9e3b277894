//! Bulk scanning for a 4-byte signed integer

use crate::config::ScannerConfig;
use crate::core::types::{Address, CandidateList, MemoryError, MemoryResult};
use crate::memory::regions::{enumerate_regions, MemoryRegion};
use crate::memory::ProcessMemory;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

const VALUE_SIZE: usize = std::mem::size_of::<i32>();

/// Bytes between progress log lines
const PROGRESS_STEP: u64 = 5 * 1024 * 1024;

/// Running byte total of one scan, shared by every region worker
#[derive(Debug, Default)]
struct ScanProgress {
    bytes: AtomicU64,
}

impl ScanProgress {
    /// Add `bytes`; returns the new total when it crossed a progress step
    fn record(&self, bytes: u64) -> Option<u64> {
        let before = self.bytes.fetch_add(bytes, Ordering::Relaxed);
        let after = before + bytes;
        (after / PROGRESS_STEP > before / PROGRESS_STEP).then_some(after)
    }
}

/// Options for memory scanning
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Bytes requested per read; a power of two
    pub chunk_size: usize,
    /// Scan regions on a thread pool
    pub parallel: bool,
    /// Pool size when `parallel` is set
    pub max_threads: usize,
    /// Also scan copy-on-write regions
    pub include_copy_on_write: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            chunk_size: 65536,
            parallel: false,
            max_threads: 1,
            include_copy_on_write: false,
        }
    }
}

impl From<&ScannerConfig> for ScanOptions {
    fn from(config: &ScannerConfig) -> Self {
        ScanOptions {
            chunk_size: config.chunk_size,
            parallel: config.parallel,
            max_threads: config.max_threads,
            include_copy_on_write: config.include_copy_on_write,
        }
    }
}

/// Outcome of a bulk scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub candidates: CandidateList,
    pub regions_scanned: usize,
    pub bytes_scanned: u64,
    pub failed_reads: usize,
}

impl ScanReport {
    fn absorb(&mut self, other: ScanReport) {
        self.candidates.extend(other.candidates);
        self.regions_scanned += other.regions_scanned;
        self.bytes_scanned += other.bytes_scanned;
        self.failed_reads += other.failed_reads;
    }
}

/// Scanner recording every address whose 4 bytes equal a target value
pub struct MemoryScanner {
    options: ScanOptions,
    pool: Option<rayon::ThreadPool>,
}

impl MemoryScanner {
    /// Create a scanner, building a thread pool when parallel scanning is enabled
    pub fn new(options: ScanOptions) -> MemoryResult<Self> {
        if options.chunk_size < VALUE_SIZE {
            return Err(MemoryError::UnsupportedOperation(format!(
                "chunk size {} is smaller than a 4-byte value",
                options.chunk_size
            )));
        }

        let pool = if options.parallel && options.max_threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.max_threads)
                .thread_name(|i| format!("scan-worker-{}", i))
                .build()
                .map_err(|e| MemoryError::ThreadPool(e.to_string()))?;
            Some(pool)
        } else {
            None
        };

        Ok(MemoryScanner { options, pool })
    }

    /// Single-threaded scanner with the given chunk size
    pub fn sequential(chunk_size: usize) -> MemoryResult<Self> {
        Self::new(ScanOptions {
            chunk_size,
            ..ScanOptions::default()
        })
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan the given regions for `target`
    pub fn scan<M: ProcessMemory + ?Sized>(
        &self,
        memory: &M,
        regions: &[MemoryRegion],
        target: i32,
    ) -> CandidateList {
        self.scan_with_report(memory, regions, target).candidates
    }

    /// Enumerate the readable regions of `memory` and scan all of them
    pub fn scan_process<M: ProcessMemory + ?Sized>(&self, memory: &M, target: i32) -> ScanReport {
        let regions = enumerate_regions(memory, self.options.include_copy_on_write);
        info!("Found {} readable memory regions", regions.len());

        let report = self.scan_with_report(memory, &regions, target);
        info!(
            "Search complete. Total memory searched: {} MB, {} matches for {}",
            report.bytes_scanned / (1024 * 1024),
            report.candidates.len(),
            target
        );
        report
    }

    /// Scan the given regions, returning statistics along with the matches.
    ///
    /// Matches are ordered by region and then by address regardless of whether
    /// the regions were scanned in parallel.
    pub fn scan_with_report<M: ProcessMemory + ?Sized>(
        &self,
        memory: &M,
        regions: &[MemoryRegion],
        target: i32,
    ) -> ScanReport {
        let progress = ScanProgress::default();

        match &self.pool {
            Some(pool) => {
                let per_region: Vec<ScanReport> = pool.install(|| {
                    regions
                        .par_iter()
                        .map(|region| {
                            let mut buffer = vec![0u8; self.options.chunk_size];
                            self.scan_region(memory, region, target, &mut buffer, &progress)
                        })
                        .collect()
                });

                let mut report = ScanReport::default();
                for region_report in per_region {
                    report.absorb(region_report);
                }
                report
            }
            None => {
                let mut buffer = vec![0u8; self.options.chunk_size];
                let mut report = ScanReport::default();
                for region in regions {
                    report.absorb(self.scan_region(memory, region, target, &mut buffer, &progress));
                }
                report
            }
        }
    }

    /// Scan one region in chunks.
    ///
    /// Consecutive chunks overlap by 3 bytes so a value straddling the seam is
    /// seen exactly once. A failed or too-short read skips to the next page.
    fn scan_region<M: ProcessMemory + ?Sized>(
        &self,
        memory: &M,
        region: &MemoryRegion,
        target: i32,
        buffer: &mut [u8],
        progress: &ScanProgress,
    ) -> ScanReport {
        let mut report = ScanReport {
            regions_scanned: 1,
            ..ScanReport::default()
        };

        let end = region.end_address.as_usize();
        let mut cursor = region.start_address;

        debug!(
            "Searching region {} - {} ({} KB)",
            region.start_address,
            region.end_address,
            region.size() / 1024
        );

        while cursor.as_usize() < end && end - cursor.as_usize() >= VALUE_SIZE {
            let wanted = buffer.len().min(end - cursor.as_usize());

            match memory.read_memory(cursor, &mut buffer[..wanted]) {
                Ok(read) if read >= VALUE_SIZE => {
                    let read = read.min(wanted);
                    scan_buffer(&buffer[..read], cursor, target, &mut report.candidates);
                    report.bytes_scanned += read as u64;
                    if let Some(total) = progress.record(read as u64) {
                        debug!("Searched {} MB...", total / (1024 * 1024));
                    }

                    if cursor.as_usize() + read >= end {
                        break;
                    }
                    cursor = Address::new(cursor.as_usize() + read - (VALUE_SIZE - 1));
                }
                outcome => {
                    report.failed_reads += 1;
                    if let Err(e) = outcome {
                        debug!("Skipping page after failed read: {}", e);
                    }
                    match cursor.next_page() {
                        Some(next) => cursor = next,
                        None => break,
                    }
                }
            }
        }

        report
    }
}

/// Append the address of every byte offset in `bytes` whose 4 little-endian
/// bytes equal `target`. Offsets are not required to be aligned.
pub fn scan_buffer(bytes: &[u8], base: Address, target: i32, out: &mut CandidateList) {
    let needle = target.to_le_bytes();
    out.extend(
        bytes
            .windows(VALUE_SIZE)
            .enumerate()
            .filter(|(_, window)| *window == needle)
            .map(|(offset, _)| Address::new(base.as_usize() + offset)),
    );
}
