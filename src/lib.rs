//! Rhythm Hopper - A beat-synchronized endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (beatmap, spawn scheduling, physics, round state)
//! - `driver`: Fixed-step driver that owns the simulation and its collaborators
//! - `audio`: Background track transport and loop-wrap detection
//! - `platform`: Browser/native platform abstraction (time)
//! - `persistence`: High score storage backends
//! - `settings`: Data-driven tempo and physics configuration

pub mod audio;
pub mod driver;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use driver::{ActionOutcome, Driver};
pub use error::{Error, Result};
pub use highscores::HighScoreBook;
pub use settings::{PhysicsParams, Settings, TimeSourceMode};

/// Game configuration constants
pub mod consts {
    /// Tick rate the physics constants are calibrated for
    pub const REFERENCE_TICK_RATE: f64 = 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 400.0;
    pub const GROUND_Y: f32 = CANVAS_HEIGHT - 50.0;

    /// Per-tick physics at 60 Hz
    pub const GRAVITY: f32 = 0.5;
    pub const JUMP_IMPULSE: f32 = -12.0;
    pub const OBSTACLE_SPEED: f32 = 5.0;

    /// Player defaults
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_SIZE: f32 = 50.0;

    /// Obstacle defaults
    pub const OBSTACLE_WIDTH: f32 = 30.0;
    pub const BASE_OBSTACLE_HEIGHT: f32 = 80.0;
    pub const TALL_OBSTACLE_HEIGHT: f32 = 120.0;

    /// Background track
    pub const DEFAULT_BPM: f64 = 140.0;
    pub const LEAD_IN_SECS: f64 = 2.0;
    pub const MUSIC_DURATION_SECS: f64 = 180.0;

    /// Tall obstacles only appear after this much elapsed time
    pub const TALL_OBSTACLE_AFTER_SECS: f64 = 45.0;
    pub const TALL_BASE_CHANCE: f64 = 0.2;
    pub const TALL_CHANCE_PER_LOOP: f64 = 0.1;
}
