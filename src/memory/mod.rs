/*!
 * Memory Module
 * Memory lifecycle hooks and the block pool that reports to them
 */

pub mod hooks;
pub mod pool;
pub mod types;

// Re-export for convenience
pub use hooks::{
    set_allocate_hook, set_deallocate_hook, set_release_physical_hook, set_relocate_hook,
    MemoryHooks, MemoryHooksBuilder,
};
pub use pool::BlockPool;
pub use types::*;
