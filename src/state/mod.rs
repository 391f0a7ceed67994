//! State module for tracking scan progress
//!
//! # Components
//!
//! - `ScanStage`: Tracks the stage of a single site scan (fetching, parsing, classifying, ...)
//! - `FollowWindow`: Tracks follow actions inside a rolling time window for rate capping

mod follow_window;
mod scan_stage;

// Re-export main types
pub use follow_window::FollowWindow;
pub use scan_stage::{ScanStage, StageTracker};
