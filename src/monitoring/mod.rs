/*!
 * Monitoring
 * Logging facility for the substrate
 */

mod tracer;

pub use tracer::{init_tracing, try_init_tracing};
