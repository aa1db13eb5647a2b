//! Split pipeline: orchestration, cancellation and partial outputs.

mod cancel;
mod orchestrator;
mod partial;

pub use cancel::CancelToken;
pub use orchestrator::{ExportedSegment, Pipeline, SplitRequest, SplitSummary};
pub use partial::{PartialOutput, cleanup_all_partials};
