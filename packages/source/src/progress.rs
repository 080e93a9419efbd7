//! Step progress for the cleaning pipeline and the feature scorers.
//!
//! The cleaning pipeline reports one unit per step and the scorer one
//! unit per ranking, each labelled with the step or scorer running. The
//! CLI renders these with `indicatif`; tests pass [`NullProgress`].

use std::sync::Arc;

/// Receives progress from a multi-step run.
pub trait ProgressCallback: Send + Sync {
    /// Number of steps the run will take.
    fn set_total(&self, total: u64);

    /// Marks `delta` more steps as done.
    fn inc(&self, delta: u64);

    /// Names the step now running.
    fn set_message(&self, msg: String);

    /// Ends the run with a summary line.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Shared [`NullProgress`] for runs nobody watches.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
