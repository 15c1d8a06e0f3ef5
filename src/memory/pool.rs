/*!
 * Block Pool
 * Fixed-size block allocator over an intrusive free list
 *
 * A small allocator in the shape the hook registry expects: it hands out
 * simulated addresses from a contiguous range, keeps free blocks on an
 * intrusive list guarded by a spin lock, and reports every lifecycle event
 * to a `MemoryHooks` set. Hooks run after the lock is dropped.
 */

use super::hooks::MemoryHooks;
use crate::container_of;
use crate::core::errors::{SysError, SysResult, SysReturn};
use crate::core::limits::{DEFAULT_POOL_BLOCKS, DEFAULT_POOL_BLOCK_SIZE};
use crate::core::list::{self, ListLink};
use crate::core::sync::SpinLock;
use crate::core::types::{Address, RelocateFlags, Size};
use std::ptr;
use std::sync::Arc;
use tracing::{debug, trace};

#[repr(C)]
struct BlockSlot {
    link: ListLink,
    index: usize,
    in_use: bool,
    released: bool,
}

/// Raw handles to the heap storage behind a pool
///
/// Every link address is derived from these pointers with `addr_of_mut!`
/// and nothing ever reborrows the storage as `&mut`, so the neighbour
/// pointers stored in the free list stay usable for the pool's lifetime.
struct PoolState {
    free: *mut ListLink,
    blocks: *mut BlockSlot,
    count: usize,
}

impl PoolState {
    fn alloc(count: usize) -> Self {
        let blocks: Box<[BlockSlot]> = (0..count)
            .map(|index| BlockSlot {
                link: ListLink::new(),
                index,
                in_use: false,
                released: false,
            })
            .collect();

        let state = Self {
            free: Box::into_raw(Box::new(ListLink::new())),
            blocks: Box::into_raw(blocks) as *mut BlockSlot,
            count,
        };

        // Safety: freshly allocated and not shared yet.
        unsafe {
            list::init(state.free);
            for index in 0..count {
                list::add_before(state.free, state.link(index));
            }
        }
        state
    }

    #[inline]
    fn slot(&self, index: usize) -> *mut BlockSlot {
        debug_assert!(index < self.count);
        // Safety: in bounds of the `blocks` allocation.
        unsafe { self.blocks.add(index) }
    }

    #[inline]
    fn link(&self, index: usize) -> *mut ListLink {
        // Safety: `slot` is in bounds; no reference to the slot is created.
        unsafe { ptr::addr_of_mut!((*self.slot(index)).link) }
    }

    /// Pop the first free block and mark it in use
    ///
    /// # Safety
    /// The pool lock must be held.
    unsafe fn take_free(&self) -> Option<usize> {
        let link = list::remove_head(self.free)?;
        let slot = container_of!(link.as_ptr(), BlockSlot, link);
        (*slot).in_use = true;
        (*slot).released = false;
        Some((*slot).index)
    }

    /// Mark a block free and push it to the front for reuse
    ///
    /// # Safety
    /// The pool lock must be held and `index` must be in use, so its link
    /// is not on the free list.
    unsafe fn put_free(&self, index: usize) {
        (*self.slot(index)).in_use = false;
        list::add_after(self.free, self.link(index));
    }

    /// # Safety
    /// The pool lock must be held.
    #[inline]
    unsafe fn in_use(&self, index: usize) -> bool {
        (*self.slot(index)).in_use
    }
}

impl Drop for PoolState {
    fn drop(&mut self) {
        // Safety: both pointers came from `Box::into_raw` in `alloc` and
        // are freed exactly once here.
        unsafe {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                self.blocks,
                self.count,
            )));
            drop(Box::from_raw(self.free));
        }
    }
}

enum HookSource {
    Global,
    Injected(Arc<MemoryHooks>),
}

impl HookSource {
    #[inline]
    fn get(&self) -> &MemoryHooks {
        match self {
            HookSource::Global => MemoryHooks::global(),
            HookSource::Injected(hooks) => hooks,
        }
    }
}

/// Fixed-size block allocator reporting to memory hooks
///
/// # Example
///
/// ```
/// use os_substrate::memory::BlockPool;
///
/// let pool = BlockPool::new(0x10_0000, 4096, 4).unwrap();
/// let addr = pool.allocate().unwrap();
/// assert_eq!(pool.available(), 3);
/// pool.deallocate(addr).unwrap();
/// ```
pub struct BlockPool {
    lock: SpinLock,
    state: PoolState,
    base: Address,
    block_size: Size,
    capacity: usize,
    hooks: HookSource,
}

// Safety: the storage behind `state` is only touched with `lock` held
// (see `with_state`).
unsafe impl Send for BlockPool {}
unsafe impl Sync for BlockPool {}

impl BlockPool {
    /// Pool over `[base, base + block_size * count)` reporting to the global hooks
    pub fn new(base: Address, block_size: Size, count: usize) -> SysResult<Self> {
        Self::build(base, block_size, count, HookSource::Global)
    }

    /// Pool reporting to an injected hook set instead of the global one
    pub fn with_hooks(
        base: Address,
        block_size: Size,
        count: usize,
        hooks: Arc<MemoryHooks>,
    ) -> SysResult<Self> {
        Self::build(base, block_size, count, HookSource::Injected(hooks))
    }

    /// Pool with the default geometry starting at `base`
    pub fn with_defaults(base: Address) -> SysResult<Self> {
        Self::new(base, DEFAULT_POOL_BLOCK_SIZE, DEFAULT_POOL_BLOCKS)
    }

    fn build(base: Address, block_size: Size, count: usize, hooks: HookSource) -> SysResult<Self> {
        if block_size == 0 || count == 0 {
            return Err(SysError::new(SysReturn::INVALID_ARGUMENT));
        }
        block_size
            .checked_mul(count)
            .and_then(|span| base.checked_add(span))
            .ok_or_else(|| SysError::new(SysReturn::INVALID_ARGUMENT))?;

        let state = PoolState::alloc(count);
        debug!(base, block_size, count, "block pool created");

        Ok(Self {
            lock: SpinLock::new(),
            state,
            base,
            block_size,
            capacity: count,
            hooks,
        })
    }

    #[inline]
    fn with_state<R>(&self, f: impl FnOnce(&PoolState) -> R) -> R {
        let _guard = self.lock.guard();
        f(&self.state)
    }

    #[inline]
    fn address_of(&self, index: usize) -> Address {
        self.base + index * self.block_size
    }

    fn index_of(&self, address: Address) -> SysResult<usize> {
        let offset = address
            .checked_sub(self.base)
            .ok_or_else(|| SysError::new(SysReturn::INVALID_ADDRESS))?;
        if offset % self.block_size != 0 || offset / self.block_size >= self.capacity {
            return Err(SysError::new(SysReturn::INVALID_ADDRESS));
        }
        Ok(offset / self.block_size)
    }

    /// Hand out a free block
    ///
    /// Fails with NO_MEMORY when every block is in use.
    pub fn allocate(&self) -> SysResult<Address> {
        // Safety: `with_state` holds the lock.
        let index = self
            .with_state(|state| unsafe { state.take_free() })
            .ok_or_else(|| SysError::new(SysReturn::NO_MEMORY))?;
        let address = self.address_of(index);
        trace!(address, "block allocated");
        self.hooks.get().on_allocate(self.block_size, address);
        Ok(address)
    }

    /// Return a block to the pool
    ///
    /// INVALID_ADDRESS if the address is not a block of this pool,
    /// INVALID_STATE if the block is already free.
    pub fn deallocate(&self, address: Address) -> SysResult<()> {
        let index = self.index_of(address)?;
        self.with_state(|state| unsafe {
            if !state.in_use(index) {
                return Err(SysError::new(SysReturn::INVALID_STATE));
            }
            state.put_free(index);
            Ok(())
        })?;
        trace!(address, "block deallocated");
        self.hooks.get().on_deallocate(self.block_size, address);
        Ok(())
    }

    /// Give back the physical backing of a free block
    ///
    /// The block stays on the free list and is reusable. Releasing an
    /// already released block is a no-op that fires no event.
    pub fn release_physical(&self, address: Address) -> SysResult<()> {
        let index = self.index_of(address)?;
        let fire = self.with_state(|state| unsafe {
            let slot = state.slot(index);
            if (*slot).in_use {
                return Err(SysError::new(SysReturn::INVALID_STATE));
            }
            let first = !(*slot).released;
            (*slot).released = true;
            Ok(first)
        })?;
        if fire {
            trace!(address, "block physical backing released");
            self.hooks
                .get()
                .on_release_physical(self.block_size, address);
        }
        Ok(())
    }

    /// Move an in-use block to a free slot and free the old one
    ///
    /// Returns the new address. `flags` is passed through to the hook.
    pub fn relocate(&self, from: Address, flags: RelocateFlags) -> SysResult<Address> {
        let from_index = self.index_of(from)?;
        let to_index = self.with_state(|state| unsafe {
            if !state.in_use(from_index) {
                return Err(SysError::new(SysReturn::INVALID_STATE));
            }
            let to_index = state
                .take_free()
                .ok_or_else(|| SysError::new(SysReturn::NO_MEMORY))?;
            state.put_free(from_index);
            Ok(to_index)
        })?;
        let to = self.address_of(to_index);
        trace!(from, to, flags, "block relocated");
        self.hooks
            .get()
            .on_relocate(self.block_size, from, to, flags);
        Ok(to)
    }

    /// Number of free blocks
    pub fn available(&self) -> usize {
        self.with_state(|state| unsafe { list::len(state.free) })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn block_size(&self) -> Size {
        self.block_size
    }

    /// True if `address` is a block of this pool that is currently in use
    pub fn is_allocated(&self, address: Address) -> bool {
        match self.index_of(address) {
            Ok(index) => self.with_state(|state| unsafe { state.in_use(index) }),
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for BlockPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockPool")
            .field("base", &format_args!("{:#x}", self.base))
            .field("block_size", &self.block_size)
            .field("capacity", &self.capacity)
            .field("available", &self.available())
            .finish()
    }
}
