//! Batch execution shell.
//!
//! Runs the matching pipeline over one batch of raw records, either inline or
//! on a dedicated worker thread, and returns a ranked batch or a structured
//! failure.

mod executor;
mod pipeline;
mod types;

pub use executor::*;
pub use pipeline::process_batch;
pub use types::*;
