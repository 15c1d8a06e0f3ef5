/*!
 * Core Module
 * Fundamental types, error taxonomy, lists and synchronization
 */

pub mod errors;
pub mod limits;
pub mod list;
pub mod sync;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use types::*;
