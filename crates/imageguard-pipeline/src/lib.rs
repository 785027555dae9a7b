//! ImageGuard Pipeline
//!
//! Orchestrates the moderation stages in fixed order and owns the
//! fail-closed error policy:
//!
//! 1. Nudity detection (must complete first; cross-validation depends on it)
//! 2. Pose, face, and description stages, dispatched concurrently
//! 3. Cross-signal validation
//! 4. Risk fusion
//! 5. Context policy evaluation
//!
//! Analyzer failures are absorbed into fail-closed signal fallbacks and
//! reported in the signal trace; only catastrophic input errors surface to
//! callers as `Err`.

pub mod pipeline;
pub mod state;

pub use pipeline::{ModerationOutcome, ModerationPipeline, SignalTrace};
pub use state::{Defaults, Snapshot, SnapshotStore};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::pipeline::{ModerationOutcome, ModerationPipeline, SignalTrace};
    pub use crate::state::{Defaults, SnapshotStore};
    pub use imageguard_analyzers::stage::AnalyzerSet;
    pub use imageguard_core::prelude::*;
}
