//! Segment planning from an ordered tracklist.

mod planner;

pub use planner::{PlanWarning, Segment, SegmentPlan, plan_segments};
