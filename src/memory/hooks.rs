/*!
 * Memory Event Hook Registry
 *
 * One atomically swappable function-pointer slot per memory event. The
 * allocator reads a slot on every allocate/deallocate/relocate/release and
 * calls the hook if one is set, so an observer (leak detector, relocating
 * collector bookkeeping) can follow object lifecycles without the allocator
 * depending on it.
 *
 * # Concurrency
 *
 * Slots are `ArcSwapOption`s: stores publish with release ordering and
 * loads acquire, so a hook installed on one thread is seen whole on any
 * other. Hooks are still meant to be installed during runtime start-up,
 * before allocation traffic begins; an allocation racing a setter may see
 * either the old or the new hook.
 *
 * There is a process-wide registry (`MemoryHooks::global()` and the free
 * `set_*_hook` functions), and `MemoryHooks` values can also be built and
 * injected into an allocator directly.
 */

use super::types::{
    AllocateHook, DeallocateHook, InstalledHooks, MemoryEventKind, ReleasePhysicalHook,
    RelocateHook,
};
use crate::core::types::{Address, RelocateFlags, Size};
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tracing::debug;

static GLOBAL_HOOKS: MemoryHooks = MemoryHooks::new();

/// Set of memory event hook slots
pub struct MemoryHooks {
    allocate: ArcSwapOption<AllocateHook>,
    deallocate: ArcSwapOption<DeallocateHook>,
    release_physical: ArcSwapOption<ReleasePhysicalHook>,
    relocate: ArcSwapOption<RelocateHook>,
}

impl MemoryHooks {
    /// All slots unset
    pub const fn new() -> Self {
        Self {
            allocate: ArcSwapOption::const_empty(),
            deallocate: ArcSwapOption::const_empty(),
            release_physical: ArcSwapOption::const_empty(),
            relocate: ArcSwapOption::const_empty(),
        }
    }

    /// The process-wide registry
    #[inline]
    pub fn global() -> &'static MemoryHooks {
        &GLOBAL_HOOKS
    }

    pub fn builder() -> MemoryHooksBuilder {
        MemoryHooksBuilder::new()
    }

    /// Replace the allocate hook; `None` clears it
    pub fn set_allocate_hook(&self, hook: Option<AllocateHook>) {
        log_change(MemoryEventKind::Allocate, hook.is_some());
        self.allocate.store(hook.map(Arc::new));
    }

    /// Replace the deallocate hook; `None` clears it
    pub fn set_deallocate_hook(&self, hook: Option<DeallocateHook>) {
        log_change(MemoryEventKind::Deallocate, hook.is_some());
        self.deallocate.store(hook.map(Arc::new));
    }

    /// Replace the release-physical hook; `None` clears it
    pub fn set_release_physical_hook(&self, hook: Option<ReleasePhysicalHook>) {
        log_change(MemoryEventKind::ReleasePhysical, hook.is_some());
        self.release_physical.store(hook.map(Arc::new));
    }

    /// Replace the relocate hook; `None` clears it
    pub fn set_relocate_hook(&self, hook: Option<RelocateHook>) {
        log_change(MemoryEventKind::Relocate, hook.is_some());
        self.relocate.store(hook.map(Arc::new));
    }

    /// Clear every slot
    pub fn clear(&self) {
        self.set_allocate_hook(None);
        self.set_deallocate_hook(None);
        self.set_release_physical_hook(None);
        self.set_relocate_hook(None);
    }

    pub fn installed(&self) -> InstalledHooks {
        InstalledHooks {
            allocate: self.allocate.load().is_some(),
            deallocate: self.deallocate.load().is_some(),
            release_physical: self.release_physical.load().is_some(),
            relocate: self.relocate.load().is_some(),
        }
    }

    /// Allocate event: invoke the hook if set
    #[inline]
    pub fn on_allocate(&self, size: Size, address: Address) {
        if let Some(hook) = self.allocate.load().as_deref().copied() {
            hook(size, address);
        }
    }

    /// Deallocate event: invoke the hook if set
    #[inline]
    pub fn on_deallocate(&self, size: Size, address: Address) {
        if let Some(hook) = self.deallocate.load().as_deref().copied() {
            hook(size, address);
        }
    }

    /// Release-physical event: invoke the hook if set
    #[inline]
    pub fn on_release_physical(&self, size: Size, address: Address) {
        if let Some(hook) = self.release_physical.load().as_deref().copied() {
            hook(size, address);
        }
    }

    /// Relocate event: invoke the hook if set
    #[inline]
    pub fn on_relocate(&self, size: Size, from: Address, to: Address, flags: RelocateFlags) {
        if let Some(hook) = self.relocate.load().as_deref().copied() {
            hook(size, from, to, flags);
        }
    }
}

impl Default for MemoryHooks {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHooks")
            .field("installed", &self.installed())
            .finish()
    }
}

fn log_change(kind: MemoryEventKind, set: bool) {
    debug!(event = ?kind, set, "memory hook updated");
}

/// Install the process-wide allocate hook
pub fn set_allocate_hook(hook: Option<AllocateHook>) {
    GLOBAL_HOOKS.set_allocate_hook(hook);
}

/// Install the process-wide deallocate hook
pub fn set_deallocate_hook(hook: Option<DeallocateHook>) {
    GLOBAL_HOOKS.set_deallocate_hook(hook);
}

/// Install the process-wide release-physical hook
pub fn set_release_physical_hook(hook: Option<ReleasePhysicalHook>) {
    GLOBAL_HOOKS.set_release_physical_hook(hook);
}

/// Install the process-wide relocate hook
pub fn set_relocate_hook(hook: Option<RelocateHook>) {
    GLOBAL_HOOKS.set_relocate_hook(hook);
}

/// Builder for a hook set injected into an allocator at construction
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryHooksBuilder {
    allocate: Option<AllocateHook>,
    deallocate: Option<DeallocateHook>,
    release_physical: Option<ReleasePhysicalHook>,
    relocate: Option<RelocateHook>,
}

impl MemoryHooksBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allocate(mut self, hook: AllocateHook) -> Self {
        self.allocate = Some(hook);
        self
    }

    pub fn with_deallocate(mut self, hook: DeallocateHook) -> Self {
        self.deallocate = Some(hook);
        self
    }

    pub fn with_release_physical(mut self, hook: ReleasePhysicalHook) -> Self {
        self.release_physical = Some(hook);
        self
    }

    pub fn with_relocate(mut self, hook: RelocateHook) -> Self {
        self.relocate = Some(hook);
        self
    }

    pub fn build(self) -> MemoryHooks {
        let hooks = MemoryHooks::new();
        hooks.allocate.store(self.allocate.map(Arc::new));
        hooks.deallocate.store(self.deallocate.map(Arc::new));
        hooks.release_physical.store(self.release_physical.map(Arc::new));
        hooks.relocate.store(self.relocate.map(Arc::new));
        hooks
    }
}
