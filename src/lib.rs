/*!
 * OS Services Substrate
 *
 * Primitives the runtime's allocators, collectors and schedulers build on:
 * intrusive lists, timed condition-variable waits, a spin-lock facade, a
 * result-code taxonomy and memory event hooks.
 */

pub mod core;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::{
    format_error, message_for, print_error, SysError, SysResult, SysReturn,
};
pub use crate::core::sync::{timed_wait, Deadline, SpinLock};
pub use crate::core::types::{Address, Size};
pub use memory::{BlockPool, MemoryHooks};
pub use monitoring::init_tracing;
