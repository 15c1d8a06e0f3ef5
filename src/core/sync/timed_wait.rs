/*!
 * Timed Wait
 *
 * Block on a condition variable until signaled or until a relative
 * interval elapses. One native wait per call: there is no retry on
 * spurious wakeup, so callers re-check their own predicate (or use
 * `timed_wait_while`, which does exactly that).
 */

use super::deadline::Deadline;
use super::traits::NativeCondvar;
use crate::core::errors::SysReturn;
use std::time::{Duration, Instant};

/// Wait on `cond` for up to `nanos` nanoseconds
///
/// The mutex behind `guard` is released while blocked and re-acquired
/// before returning. Returns NONE on a wake, TIMED_OUT when the deadline
/// passes, and any other platform error code unchanged.
///
/// # Example
///
/// ```
/// use os_substrate::core::sync::{timed_wait, OsCondvar, OsMutex};
/// use os_substrate::SysReturn;
///
/// let mutex = OsMutex::new(false);
/// let cond = OsCondvar::new();
/// let mut guard = mutex.lock();
/// assert_eq!(timed_wait(&cond, &mut guard, 1_000_000), SysReturn::TIMED_OUT);
/// ```
pub fn timed_wait<G, C>(cond: &C, guard: &mut G, nanos: i64) -> SysReturn
where
    G: ?Sized,
    C: NativeCondvar<G> + ?Sized,
{
    let deadline = Deadline::after_nanos(nanos);
    cond.wait_until(guard, deadline).into_code()
}

/// Wait while `condition` holds, for at most `nanos` nanoseconds in total
///
/// The condition is checked before the first wait and after every wake, and
/// each wait is re-issued with the interval that is left. Returns NONE once
/// the condition is false, TIMED_OUT if it is still true when time runs out,
/// or the first platform error.
pub fn timed_wait_while<G, C, F>(cond: &C, guard: &mut G, nanos: i64, mut condition: F) -> SysReturn
where
    G: ?Sized,
    C: NativeCondvar<G> + ?Sized,
    F: FnMut(&mut G) -> bool,
{
    let start = Instant::now();
    let budget = Duration::from_nanos(nanos.max(0) as u64);

    while condition(guard) {
        let elapsed = start.elapsed();
        if elapsed >= budget {
            return SysReturn::TIMED_OUT;
        }
        let remaining = (budget - elapsed).as_nanos().min(i64::MAX as u128) as i64;

        match timed_wait(cond, guard, remaining) {
            SysReturn::NONE => continue,
            SysReturn::TIMED_OUT => {
                return if condition(guard) {
                    SysReturn::TIMED_OUT
                } else {
                    SysReturn::NONE
                };
            }
            other => return other,
        }
    }

    SysReturn::NONE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::{NativeWait, OsCondvar, OsMutex};
    use std::cell::Cell;
    use std::sync::Arc;
    use std::thread;

    /// Condvar double that replays a fixed outcome
    struct Scripted {
        outcome: NativeWait,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn new(outcome: NativeWait) -> Self {
            Self {
                outcome,
                calls: Cell::new(0),
            }
        }
    }

    impl NativeCondvar<()> for Scripted {
        fn wait_until(&self, _guard: &mut (), _deadline: Deadline) -> NativeWait {
            self.calls.set(self.calls.get() + 1);
            self.outcome
        }
    }

    #[test]
    fn test_signal_maps_to_none() {
        let cond = Scripted::new(NativeWait::Signaled);
        assert_eq!(timed_wait(&cond, &mut (), 1_000), SysReturn::NONE);
    }

    #[test]
    fn test_expiry_maps_to_timed_out() {
        let cond = Scripted::new(NativeWait::Expired);
        assert_eq!(timed_wait(&cond, &mut (), 1_000), SysReturn::TIMED_OUT);
    }

    #[test]
    fn test_platform_error_passes_through() {
        let cond = Scripted::new(NativeWait::Failed(4));
        assert_eq!(timed_wait(&cond, &mut (), 1_000), SysReturn::from_raw(4));
    }

    #[test]
    fn test_single_native_wait_per_call() {
        let cond = Scripted::new(NativeWait::Signaled);
        timed_wait(&cond, &mut (), 1_000_000);
        assert_eq!(cond.calls.get(), 1);
    }

    #[test]
    fn test_wait_while_stops_on_error() {
        let cond = Scripted::new(NativeWait::Failed(22));
        let result = timed_wait_while(&cond, &mut (), 1_000_000_000, |_| true);
        assert_eq!(result, SysReturn::INVALID_ARGUMENT);
        assert_eq!(cond.calls.get(), 1);
    }

    #[test]
    fn test_wait_while_false_predicate_skips_wait() {
        let cond = Scripted::new(NativeWait::Expired);
        let result = timed_wait_while(&cond, &mut (), 1_000_000_000, |_| false);
        assert_eq!(result, SysReturn::NONE);
        assert_eq!(cond.calls.get(), 0);
    }

    #[test]
    fn test_parking_lot_timeout() {
        let mutex = OsMutex::new(());
        let cond = OsCondvar::new();
        let mut guard = mutex.lock();
        let start = Instant::now();
        let result = timed_wait(&cond, &mut guard, 50_000_000);
        assert_eq!(result, SysReturn::TIMED_OUT);
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_parking_lot_wake() {
        let pair = Arc::new((OsMutex::new(false), OsCondvar::new()));
        let waiter = pair.clone();

        let handle = thread::spawn(move || {
            let (mutex, cond) = &*waiter;
            let mut ready = mutex.lock();
            timed_wait_while(cond, &mut ready, 2_000_000_000, |ready| !**ready)
        });

        thread::sleep(Duration::from_millis(50));
        {
            let (mutex, cond) = &*pair;
            *mutex.lock() = true;
            cond.notify_all();
        }

        assert_eq!(handle.join().unwrap(), SysReturn::NONE);
    }
}
