//! Candidate refinement
//!
//! Re-reads a known address list instead of walking the whole address space
//! again. Cost is one 4-byte read per candidate.

use crate::core::types::{Address, CandidateList, MemoryError, MemoryResult};
use crate::memory::ProcessMemory;
use tracing::debug;

/// Read exactly 4 bytes at `address` as a little-endian `i32`
pub fn read_i32<M: ProcessMemory + ?Sized>(memory: &M, address: Address) -> MemoryResult<i32> {
    let mut buffer = [0u8; 4];
    let read = memory.read_memory(address, &mut buffer)?;
    if read != buffer.len() {
        return Err(MemoryError::read_failed(
            address,
            format!("Partial read: expected 4 bytes, read {} bytes", read),
        ));
    }
    Ok(i32::from_le_bytes(buffer))
}

/// Keep the candidates that currently hold `new_value`, preserving order.
///
/// A candidate whose read fails is dropped, not retried.
pub fn refine<M: ProcessMemory + ?Sized>(
    memory: &M,
    candidates: &[Address],
    new_value: i32,
) -> CandidateList {
    let mut dropped_on_error = 0usize;

    let survivors: CandidateList = candidates
        .iter()
        .copied()
        .filter(|&address| match read_i32(memory, address) {
            Ok(value) => value == new_value,
            Err(_) => {
                dropped_on_error += 1;
                false
            }
        })
        .collect();

    debug!(
        "Refined {} -> {} candidates for {} ({} unreadable)",
        candidates.len(),
        survivors.len(),
        new_value,
        dropped_on_error
    );

    survivors
}
