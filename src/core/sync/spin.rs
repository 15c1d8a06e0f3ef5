/*!
 * Spin Lock Facade
 *
 * Naming layer over a native mutex for short critical sections. It is not
 * a user-space spin loop: it behaves exactly like `parking_lot::RawMutex`
 * (which itself spins briefly before parking). No recursion, no priority
 * inheritance.
 */

use crate::core::errors::SysReturn;
use parking_lot::lock_api::RawMutex as RawMutexApi;
use parking_lot::RawMutex;

/// Short-hold mutual exclusion without associated data
pub struct SpinLock {
    raw: RawMutex,
}

impl SpinLock {
    /// Create an unlocked spin lock
    pub const fn new() -> Self {
        Self {
            raw: <RawMutex as RawMutexApi>::INIT,
        }
    }

    /// Reset to the unlocked state
    ///
    /// Takes `&mut self`, so no other thread can be holding it.
    pub fn init(&mut self) {
        debug_assert!(!self.is_locked(), "init on a held spin lock");
        *self = Self::new();
    }

    /// Acquire, blocking the calling thread until available
    #[inline]
    pub fn lock(&self) {
        self.raw.lock();
    }

    /// Try to acquire without blocking
    ///
    /// Returns NONE when acquired and TRY_AGAIN when another holder has it.
    #[inline]
    pub fn try_lock(&self) -> SysReturn {
        if self.raw.try_lock() {
            SysReturn::NONE
        } else {
            SysReturn::TRY_AGAIN
        }
    }

    /// Release the lock
    ///
    /// # Safety
    /// The calling context must hold the lock (acquired through `lock` or a
    /// successful `try_lock` and not yet released).
    #[inline]
    pub unsafe fn unlock(&self) {
        self.raw.unlock();
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Acquire and return a guard that releases on drop
    #[inline]
    pub fn guard(&self) -> SpinGuard<'_> {
        self.lock();
        SpinGuard { lock: self }
    }

    /// Non-blocking variant of [`guard`](Self::guard)
    #[inline]
    pub fn try_guard(&self) -> Option<SpinGuard<'_>> {
        self.try_lock().is_success().then(|| SpinGuard { lock: self })
    }
}

impl Default for SpinLock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SpinLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpinLock")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// Holds a [`SpinLock`] until dropped
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct SpinGuard<'a> {
    lock: &'a SpinLock,
}

impl Drop for SpinGuard<'_> {
    fn drop(&mut self) {
        // Safety: a guard only exists while its lock is held.
        unsafe { self.lock.unlock() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lock_unlock() {
        let lock = SpinLock::new();
        lock.lock();
        assert!(lock.is_locked());
        unsafe { lock.unlock() };
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_try_lock_busy() {
        let lock = SpinLock::new();
        assert_eq!(lock.try_lock(), SysReturn::NONE);
        assert_eq!(lock.try_lock(), SysReturn::TRY_AGAIN);
        unsafe { lock.unlock() };
        assert_eq!(lock.try_lock(), SysReturn::NONE);
        unsafe { lock.unlock() };
    }

    #[test]
    fn test_init_resets() {
        let mut lock = SpinLock::new();
        lock.init();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let lock = SpinLock::new();
        {
            let _guard = lock.guard();
            assert!(lock.try_guard().is_none());
        }
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_concurrent_increments() {
        struct Shared {
            lock: SpinLock,
            counter: AtomicUsize,
        }

        let shared = Arc::new(Shared {
            lock: SpinLock::new(),
            counter: AtomicUsize::new(0),
        });
        let mut handles = vec![];

        for _ in 0..8 {
            let shared = shared.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    let _guard = shared.lock.guard();
                    // Non-atomic read-modify-write, only correct under the lock
                    let value = shared.counter.load(Ordering::Relaxed);
                    shared.counter.store(value + 1, Ordering::Relaxed);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.counter.load(Ordering::Relaxed), 8_000);
    }
}
