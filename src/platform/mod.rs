//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (monotonic seconds for the wall-clock time source)

pub mod time;

pub use time::{Clock, ManualClock, SystemClock};
