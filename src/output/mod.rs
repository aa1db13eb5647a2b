//! Progress and result reporting.

mod human;
pub mod json_envelope;
pub mod progress;
mod reporter;

pub use human::HumanReporter;
pub use reporter::{
    JsonProgressReporter, NullReporter, ProgressReporter, ProgressThrottler, create_reporter,
    tracklist_payload,
};
