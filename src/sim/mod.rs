//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Elapsed time is an input, never read from a clock here
//! - No rendering, audio or platform dependencies

pub mod beatmap;
pub mod collision;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use beatmap::Beatmap;
pub use collision::Rect;
pub use scheduler::{Scheduler, SpawnRule};
pub use snapshot::RenderSnapshot;
pub use state::{GameEvent, GameState, Obstacle, Player, RoundPhase, RoundSummary};
pub use tick::{AUTOPILOT_LOOKAHEAD, TickInput, autopilot_wants_jump, tick};
