/*!
 * Synchronization Primitives
 *
 * Blocking coordination for the runtime built on native mutex and
 * condition-variable primitives:
 * - Spin lock facade for short critical sections
 * - Timed wait with overflow-safe absolute deadlines
 *
 * # Result codes
 *
 * Everything here reports through `SysReturn` directly; nothing retries on
 * the caller's behalf.
 */

mod deadline;
mod spin;
mod timed_wait;
mod traits;

pub use deadline::{nanos_to_millis, Deadline, WallTime};
pub use spin::{SpinGuard, SpinLock};
pub use timed_wait::{timed_wait, timed_wait_while};
pub use traits::{NativeCondvar, NativeWait};

/// Mutex paired with [`OsCondvar`] for timed waits
pub type OsMutex<T> = parking_lot::Mutex<T>;

/// Condition variable used by [`timed_wait`]
pub type OsCondvar = parking_lot::Condvar;
