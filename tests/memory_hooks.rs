/*!
 * Memory Hook Integration Tests
 *
 * Global registry tests are serialised: they share the process-wide slots.
 */

use os_substrate::core::types::RelocateFlags;
use os_substrate::memory::{
    set_allocate_hook, set_deallocate_hook, set_release_physical_hook, set_relocate_hook,
    BlockPool, MemoryEventKind, MemoryHooks,
};
use os_substrate::{Address, Size};
use parking_lot::{const_mutex, Mutex};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Allocate(Size, Address),
    Deallocate(Size, Address),
    ReleasePhysical(Size, Address),
    Relocate(Size, Address, Address, RelocateFlags),
}

static GLOBAL_EVENTS: Mutex<Vec<Event>> = const_mutex(Vec::new());

fn record_allocate(size: Size, address: Address) {
    GLOBAL_EVENTS.lock().push(Event::Allocate(size, address));
}

fn record_deallocate(size: Size, address: Address) {
    GLOBAL_EVENTS.lock().push(Event::Deallocate(size, address));
}

fn record_release(size: Size, address: Address) {
    GLOBAL_EVENTS.lock().push(Event::ReleasePhysical(size, address));
}

fn record_relocate(size: Size, from: Address, to: Address, flags: RelocateFlags) {
    GLOBAL_EVENTS
        .lock()
        .push(Event::Relocate(size, from, to, flags));
}

static OTHER_ALLOCATE: AtomicUsize = AtomicUsize::new(0);

fn count_other_allocate(_size: Size, _address: Address) {
    OTHER_ALLOCATE.fetch_add(1, Ordering::SeqCst);
}

fn reset_global() {
    MemoryHooks::global().clear();
    GLOBAL_EVENTS.lock().clear();
    OTHER_ALLOCATE.store(0, Ordering::SeqCst);
}

#[test]
#[serial]
fn test_global_allocate_hook_fires_exactly_once() {
    reset_global();
    set_allocate_hook(Some(record_allocate));

    let pool = BlockPool::new(0x4000, 64, 4).unwrap();
    let address = pool.allocate().unwrap();

    assert_eq!(*GLOBAL_EVENTS.lock(), vec![Event::Allocate(64, address)]);
    assert_eq!(OTHER_ALLOCATE.load(Ordering::SeqCst), 0);
    reset_global();
}

#[test]
#[serial]
fn test_replacing_hook_switches_target() {
    reset_global();
    set_allocate_hook(Some(record_allocate));
    set_allocate_hook(Some(count_other_allocate));

    let pool = BlockPool::new(0x4000, 64, 4).unwrap();
    pool.allocate().unwrap();

    assert!(GLOBAL_EVENTS.lock().is_empty());
    assert_eq!(OTHER_ALLOCATE.load(Ordering::SeqCst), 1);
    reset_global();
}

#[test]
#[serial]
fn test_cleared_hooks_fire_nothing() {
    reset_global();
    set_allocate_hook(Some(record_allocate));
    set_deallocate_hook(Some(record_deallocate));
    set_allocate_hook(None);
    set_deallocate_hook(None);

    let pool = BlockPool::new(0x4000, 64, 4).unwrap();
    let address = pool.allocate().unwrap();
    pool.deallocate(address).unwrap();

    assert!(GLOBAL_EVENTS.lock().is_empty());
    assert!(MemoryHooks::global().installed().is_empty());
}

#[test]
#[serial]
fn test_global_lifecycle_sequence() {
    reset_global();
    set_allocate_hook(Some(record_allocate));
    set_deallocate_hook(Some(record_deallocate));
    set_release_physical_hook(Some(record_release));
    set_relocate_hook(Some(record_relocate));

    let pool = BlockPool::new(0x8000, 0x40, 2).unwrap();
    let a = pool.allocate().unwrap();
    let b = pool.relocate(a, 3).unwrap();
    pool.release_physical(a).unwrap();
    pool.deallocate(b).unwrap();

    assert_eq!(
        *GLOBAL_EVENTS.lock(),
        vec![
            Event::Allocate(0x40, 0x8000),
            Event::Relocate(0x40, 0x8000, 0x8040, 3),
            Event::ReleasePhysical(0x40, 0x8000),
            Event::Deallocate(0x40, 0x8040),
        ]
    );
    reset_global();
}

#[test]
#[serial]
fn test_failed_operations_fire_no_events() {
    reset_global();
    set_allocate_hook(Some(record_allocate));
    set_deallocate_hook(Some(record_deallocate));

    let pool = BlockPool::new(0x8000, 0x40, 1).unwrap();
    let a = pool.allocate().unwrap();
    assert!(pool.allocate().is_err());
    assert!(pool.deallocate(0x9000).is_err());
    pool.deallocate(a).unwrap();
    assert!(pool.deallocate(a).is_err());

    assert_eq!(
        *GLOBAL_EVENTS.lock(),
        vec![Event::Allocate(0x40, a), Event::Deallocate(0x40, a)]
    );
    reset_global();
}

// Injected hook sets never touch the global registry, so these run in parallel.

static INJECTED_MOVES: AtomicUsize = AtomicUsize::new(0);
static INJECTED_FLAGS: AtomicUsize = AtomicUsize::new(0);

fn injected_relocate(_size: Size, _from: Address, _to: Address, flags: RelocateFlags) {
    INJECTED_MOVES.fetch_add(1, Ordering::SeqCst);
    INJECTED_FLAGS.store(flags as usize, Ordering::SeqCst);
}

#[test]
fn test_injected_hooks_are_isolated() {
    let hooks = Arc::new(MemoryHooks::builder().with_relocate(injected_relocate).build());
    assert!(hooks.installed().contains(MemoryEventKind::Relocate));

    let pool = BlockPool::with_hooks(0x2_0000, 0x1000, 3, hooks.clone()).unwrap();
    let a = pool.allocate().unwrap();
    pool.relocate(a, 0xff).unwrap();

    assert_eq!(INJECTED_MOVES.load(Ordering::SeqCst), 1);
    assert_eq!(INJECTED_FLAGS.load(Ordering::SeqCst), 0xff);

    hooks.set_relocate_hook(None);
    let b = pool.allocate().unwrap();
    pool.relocate(b, 1).unwrap();
    assert_eq!(INJECTED_MOVES.load(Ordering::SeqCst), 1);
}

static RELEASES: AtomicUsize = AtomicUsize::new(0);

fn count_release(_size: Size, _address: Address) {
    RELEASES.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_release_physical_fires_once_per_free_period() {
    let hooks = Arc::new(
        MemoryHooks::builder()
            .with_release_physical(count_release)
            .build(),
    );
    let pool = BlockPool::with_hooks(0x3_0000, 0x100, 1, hooks).unwrap();

    let a = pool.allocate().unwrap();
    pool.deallocate(a).unwrap();
    pool.release_physical(a).unwrap();
    pool.release_physical(a).unwrap();
    assert_eq!(RELEASES.load(Ordering::SeqCst), 1);

    // Reallocation re-arms the block
    let a = pool.allocate().unwrap();
    pool.deallocate(a).unwrap();
    pool.release_physical(a).unwrap();
    assert_eq!(RELEASES.load(Ordering::SeqCst), 2);
}
