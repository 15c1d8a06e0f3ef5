/*!
 * Memory Types
 * Callback shapes for memory lifecycle events
 */

use crate::core::types::{Address, RelocateFlags, Size};

/// Called after a block is handed out: `(size, address)`
pub type AllocateHook = fn(Size, Address);

/// Called after a block is returned: `(size, address)`
pub type DeallocateHook = fn(Size, Address);

/// Called when the physical backing of a free block is given back: `(size, address)`
pub type ReleasePhysicalHook = fn(Size, Address);

/// Called after a block moves: `(size, from, to, flags)`
pub type RelocateHook = fn(Size, Address, Address, RelocateFlags);

/// Memory lifecycle event kinds, one hook slot each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryEventKind {
    Allocate,
    Deallocate,
    ReleasePhysical,
    Relocate,
}

/// Which hook slots are currently set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstalledHooks {
    pub allocate: bool,
    pub deallocate: bool,
    pub release_physical: bool,
    pub relocate: bool,
}

impl InstalledHooks {
    #[inline]
    pub fn contains(&self, kind: MemoryEventKind) -> bool {
        match kind {
            MemoryEventKind::Allocate => self.allocate,
            MemoryEventKind::Deallocate => self.deallocate,
            MemoryEventKind::ReleasePhysical => self.release_physical,
            MemoryEventKind::Relocate => self.relocate,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.allocate || self.deallocate || self.release_physical || self.relocate)
    }
}
