/*!
 * System Limits and Constants
 *
 * Centralized location for the substrate's limits and unit conversions.
 * Organized by domain for discoverability.
 */

// =============================================================================
// TIMED WAIT
// =============================================================================

/// Ceiling on the whole-seconds part of a timed-wait interval (50M seconds)
/// Requests above this are clamped before the absolute deadline is built,
/// so "wait forever" style intervals cannot overflow the seconds field.
pub const MAX_WAIT_SECONDS: i64 = 50_000_000;

pub const NANOS_PER_MILLI: i64 = 1_000_000;
pub const MILLIS_PER_SEC: i64 = 1_000;
pub const MICROS_PER_MILLI: i64 = 1_000;
pub const MICROS_PER_SEC: i64 = 1_000_000;
pub const NANOS_PER_MICRO: i64 = 1_000;

// =============================================================================
// BLOCK POOL
// =============================================================================

/// Default block size for the reference block pool (4KB)
pub const DEFAULT_POOL_BLOCK_SIZE: usize = 4 * 1024;

/// Default number of blocks for the reference block pool
pub const DEFAULT_POOL_BLOCKS: usize = 256;

// =============================================================================
// LOGGING
// =============================================================================

/// Environment variable switching the tracing output to JSON
pub const TRACE_JSON_ENV: &str = "SUBSTRATE_TRACE_JSON";

/// Filter used when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "info";
