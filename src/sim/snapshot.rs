//! Per-tick snapshot handed to the presentation layer

use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::state::RoundPhase;

/// Everything needed to draw a frame; never feeds back into the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub player: Rect,
    /// Front to back
    pub obstacles: Vec<Rect>,
    pub score: u64,
    pub high_score: u64,
    pub loop_count: u32,
    pub phase: RoundPhase,
}
