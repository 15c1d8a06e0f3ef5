/*!
 * Native Wait Abstraction
 *
 * The seam between the timed-wait layer and the platform condition
 * variable. `parking_lot::Condvar` is the production implementation; other
 * backends (or test doubles) can report raw platform errors through
 * `NativeWait::Failed`.
 */

use super::deadline::Deadline;
use crate::core::errors::SysReturn;
use parking_lot::{Condvar, MutexGuard};

/// Outcome of a single native wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeWait {
    /// Woken by a notify (or spuriously, the native layer cannot tell)
    Signaled,
    /// The deadline passed
    Expired,
    /// Platform error number other than a timeout
    Failed(i32),
}

impl NativeWait {
    /// Map onto the result-code taxonomy
    ///
    /// Platform failures pass through unchanged.
    #[inline]
    pub fn into_code(self) -> SysReturn {
        match self {
            NativeWait::Signaled => SysReturn::NONE,
            NativeWait::Expired => SysReturn::TIMED_OUT,
            NativeWait::Failed(errno) => SysReturn::from_raw(errno),
        }
    }
}

/// A condition variable that can block until an absolute deadline
///
/// `G` is the guard of the mutex associated with the condvar. The
/// implementation must release the mutex while blocked and hold it again
/// before returning, whatever the outcome.
pub trait NativeCondvar<G: ?Sized> {
    fn wait_until(&self, guard: &mut G, deadline: Deadline) -> NativeWait;
}

impl<'a, T: ?Sized> NativeCondvar<MutexGuard<'a, T>> for Condvar {
    fn wait_until(&self, guard: &mut MutexGuard<'a, T>, deadline: Deadline) -> NativeWait {
        let result = self.wait_for(guard, deadline.remaining());
        if result.timed_out() {
            NativeWait::Expired
        } else {
            NativeWait::Signaled
        }
    }
}
