//! Value tracking
//!
//! The per-cycle search state machine, the state it shares with the host,
//! and the loops that drive it.

pub mod notifier;
pub mod observation;
pub mod orchestrator;
pub mod runner;
pub mod state;

pub use notifier::{ChannelNotifier, NotifyError, TrackerEvent, WriteNotifier};
pub use observation::{extract_number, Observation};
pub use orchestrator::{CycleOutcome, SearchOrchestrator, WRITE_REQUEST_RANGE};
pub use runner::{perform_pending_write, run_process_watch_loop, run_tracking_loop};
pub use state::{SearchSnapshot, SharedState, WriteRequest};
