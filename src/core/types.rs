/*!
 * Core Types
 * Common types shared by the substrate and its collaborators
 */

/// Address type for memory operations
pub type Address = usize;

/// Size type for memory operations
pub type Size = usize;

/// Flags word passed through relocation events
pub type RelocateFlags = u64;
