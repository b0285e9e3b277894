//! The single bounded write applied to the surviving candidates

use crate::core::types::{Address, MemoryError, MemoryResult};
use crate::memory::ProcessMemory;
use tracing::{info, warn};

/// Largest candidate list the writer will touch
pub const MAX_WRITE_TARGETS: usize = 3;

/// Per-call write counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub written: usize,
    pub failed: usize,
}

/// Write `value` as 4 little-endian bytes to every candidate.
///
/// Partial writes count as failures. Refuses lists longer than
/// [`MAX_WRITE_TARGETS`].
pub fn write_candidates<M: ProcessMemory + ?Sized>(
    memory: &M,
    candidates: &[Address],
    value: i32,
) -> MemoryResult<WriteOutcome> {
    if candidates.len() > MAX_WRITE_TARGETS {
        return Err(MemoryError::UnsupportedOperation(format!(
            "refusing to write {} addresses (limit {})",
            candidates.len(),
            MAX_WRITE_TARGETS
        )));
    }

    let data = value.to_le_bytes();
    let mut outcome = WriteOutcome::default();

    for &address in candidates {
        match memory.write_memory(address, &data) {
            Ok(written) if written == data.len() => {
                info!("Wrote {} to {}", value, address);
                outcome.written += 1;
            }
            Ok(written) => {
                warn!(
                    "Partial write at {}: expected {} bytes, wrote {} bytes",
                    address,
                    data.len(),
                    written
                );
                outcome.failed += 1;
            }
            Err(e) => {
                warn!("Write failed at {}: {}", address, e);
                outcome.failed += 1;
            }
        }
    }

    Ok(outcome)
}
