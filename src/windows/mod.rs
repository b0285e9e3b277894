//! Windows API layer
//!
//! Safe wrappers around the kernel32 and ToolHelp32 calls the engine needs.
//! All unsafe FFI calls are contained within this module.

pub mod bindings;
pub mod types;

pub use bindings::{kernel32, tlhelp32};
pub use types::Handle;
