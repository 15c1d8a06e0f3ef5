/*!
 * Absolute Deadlines
 *
 * Converts a relative wait interval into the absolute wall-clock time the
 * native condition variable waits until. The whole-seconds part is capped
 * at `MAX_WAIT_SECONDS` so effectively infinite requests stay well inside
 * the seconds field, and the sub-second remainder carries into seconds when
 * it overflows.
 */

use crate::core::limits::{
    MAX_WAIT_SECONDS, MICROS_PER_MILLI, MICROS_PER_SEC, MILLIS_PER_SEC, NANOS_PER_MICRO,
    NANOS_PER_MILLI,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Wall-clock reading split into seconds and microsecond-of-second
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WallTime {
    pub secs: i64,
    pub micros: i64,
}

impl WallTime {
    /// Read the current wall clock
    ///
    /// No protection against clock adjustment: a deadline built from this is
    /// only as monotonic as the wall clock itself.
    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Self {
            secs: since_epoch.as_secs() as i64,
            micros: since_epoch.subsec_micros() as i64,
        }
    }
}

/// Absolute wake time (seconds + nanoseconds since the Unix epoch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline {
    secs: i64,
    nanos: u32,
}

impl Deadline {
    /// Build the deadline `interval_ms` after `now`
    ///
    /// Negative intervals are treated as zero (expire immediately). `now`
    /// is normalised first, so a `micros` outside one second carries into
    /// `secs`; the resulting seconds saturate at `i64::MAX`.
    pub fn compute(now: WallTime, interval_ms: i64) -> Self {
        let interval_ms = interval_ms.max(0);

        let mut secs = interval_ms / MILLIS_PER_SEC;
        let rem_ms = interval_ms % MILLIS_PER_SEC;

        if secs > MAX_WAIT_SECONDS {
            debug!(
                requested_secs = secs,
                max_secs = MAX_WAIT_SECONDS,
                "clamping timed-wait interval"
            );
            secs = MAX_WAIT_SECONDS;
        }

        let base_secs = now
            .secs
            .saturating_add(now.micros.div_euclid(MICROS_PER_SEC));
        let mut micros = now.micros.rem_euclid(MICROS_PER_SEC) + rem_ms * MICROS_PER_MILLI;
        if micros >= MICROS_PER_SEC {
            secs += 1;
            micros -= MICROS_PER_SEC;
        }

        // 0 <= micros < MICROS_PER_SEC here, so nanos fits in u32
        Self {
            secs: base_secs.saturating_add(secs),
            nanos: (micros * NANOS_PER_MICRO) as u32,
        }
    }

    /// Deadline `nanos` nanoseconds from now
    ///
    /// The interval is truncated to whole milliseconds before use.
    pub fn after_nanos(nanos: i64) -> Self {
        Self::compute(WallTime::now(), nanos_to_millis(nanos))
    }

    #[inline]
    pub fn secs(&self) -> i64 {
        self.secs
    }

    #[inline]
    pub fn subsec_nanos(&self) -> u32 {
        self.nanos
    }

    /// Deadline as total nanoseconds since the epoch
    #[inline]
    pub fn as_nanos(&self) -> i128 {
        self.secs as i128 * 1_000_000_000 + self.nanos as i128
    }

    pub fn to_system_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::new(self.secs.max(0) as u64, self.nanos)
    }

    /// Time left until the deadline, zero once it has passed
    pub fn remaining(&self) -> Duration {
        self.to_system_time()
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO)
    }

    #[inline]
    pub fn has_passed(&self) -> bool {
        self.remaining().is_zero()
    }
}

/// Nanosecond interval to whole milliseconds, negatives clamped to zero
#[inline]
pub fn nanos_to_millis(nanos: i64) -> i64 {
    nanos.max(0) / NANOS_PER_MILLI
}
