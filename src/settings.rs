//! Game settings: tempo, physics and spawn tuning
//!
//! Persisted as JSON (LocalStorage on web, a file on native). Every field has
//! a default, so a partial document only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Where the scheduler reads elapsed time from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeSourceMode {
    /// Monotonic timer started when the round enters Running
    #[default]
    ElapsedWallClock,
    /// Playback position of the looping background track
    AudioPosition,
}

impl TimeSourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSourceMode::ElapsedWallClock => "elapsed_wall_clock",
            TimeSourceMode::AudioPosition => "audio_position",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "elapsed_wall_clock" | "wall_clock" | "wall" => Some(TimeSourceMode::ElapsedWallClock),
            "audio_position" | "audio" => Some(TimeSourceMode::AudioPosition),
            _ => None,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Track ===
    /// Tempo in beats per minute
    pub bpm: f64,
    /// Silence before the first beat counts (seconds)
    pub lead_in_secs: f64,
    /// Length of one pass through the track (seconds)
    pub music_duration_secs: f64,

    // === Simulation ===
    /// Ticks per second
    pub tick_rate: f64,
    /// Downward acceleration per tick, calibrated at 60 Hz
    pub gravity: f32,
    /// Vertical velocity applied on jump, calibrated at 60 Hz
    pub jump_impulse: f32,
    /// Leftward obstacle movement per tick, calibrated at 60 Hz
    pub obstacle_speed: f32,

    // === Playfield ===
    pub canvas_width: f32,
    pub ground_y: f32,
    pub player_x: f32,
    pub player_size: f32,
    pub obstacle_width: f32,

    // === Obstacles ===
    pub base_obstacle_height: f32,
    pub tall_obstacle_height: f32,
    /// Tall obstacles are only rolled for after this many seconds
    pub tall_obstacle_after_secs: f64,
    pub tall_base_chance: f64,
    pub tall_chance_per_loop: f64,

    // === Timing ===
    pub time_source: TimeSourceMode,
    /// Restart the wall clock at each music loop wrap
    pub rebase_clock_on_loop: bool,
    /// Fixed RNG seed (None = seed from time)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            lead_in_secs: LEAD_IN_SECS,
            music_duration_secs: MUSIC_DURATION_SECS,

            tick_rate: REFERENCE_TICK_RATE,
            gravity: GRAVITY,
            jump_impulse: JUMP_IMPULSE,
            obstacle_speed: OBSTACLE_SPEED,

            canvas_width: CANVAS_WIDTH,
            ground_y: GROUND_Y,
            player_x: PLAYER_X,
            player_size: PLAYER_SIZE,
            obstacle_width: OBSTACLE_WIDTH,

            base_obstacle_height: BASE_OBSTACLE_HEIGHT,
            tall_obstacle_height: TALL_OBSTACLE_HEIGHT,
            tall_obstacle_after_secs: TALL_OBSTACLE_AFTER_SECS,
            tall_base_chance: TALL_BASE_CHANCE,
            tall_chance_per_loop: TALL_CHANCE_PER_LOOP,

            time_source: TimeSourceMode::ElapsedWallClock,
            rebase_clock_on_loop: true,
            seed: None,
        }
    }
}

/// Physics constants converted to the configured tick rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    pub gravity: f32,
    pub jump_impulse: f32,
    pub obstacle_speed: f32,
    pub ground_y: f32,
}

impl Settings {
    /// Seconds per tick
    pub fn tick_dt(&self) -> f64 {
        1.0 / self.tick_rate
    }

    /// Scale per-tick constants so motion per second matches the 60 Hz tuning
    pub fn physics(&self) -> PhysicsParams {
        let s = (REFERENCE_TICK_RATE / self.tick_rate) as f32;
        PhysicsParams {
            gravity: self.gravity * s * s,
            jump_impulse: self.jump_impulse * s,
            obstacle_speed: self.obstacle_speed * s,
            ground_y: self.ground_y,
        }
    }

    /// Repair values that would break the simulation outright.
    ///
    /// Non-positive tempo or duration is left as-is: it yields an empty
    /// beatmap, which is a playable (if obstacle-free) round.
    pub fn sanitized(mut self) -> Self {
        if !self.tick_rate.is_finite() || self.tick_rate <= 0.0 {
            log::warn!("Invalid tick rate {}, using {}", self.tick_rate, REFERENCE_TICK_RATE);
            self.tick_rate = REFERENCE_TICK_RATE;
        }
        for (name, value) in [
            ("player_size", &mut self.player_size),
            ("obstacle_width", &mut self.obstacle_width),
            ("base_obstacle_height", &mut self.base_obstacle_height),
            ("tall_obstacle_height", &mut self.tall_obstacle_height),
        ] {
            if !(*value >= 0.0) {
                log::warn!("Invalid {} {}, clamping to 0", name, value);
                *value = 0.0;
            }
        }
        if self.lead_in_secs < 0.0 {
            log::warn!("Negative lead-in {}, using 0", self.lead_in_secs);
            self.lead_in_secs = 0.0;
        }
        self
    }

    /// Parse settings from JSON, falling back to defaults for missing fields
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str::<Self>(json)?.sanitized())
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "rhythm_hopper_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from a JSON file; missing or unreadable files give defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Cannot read settings {}: {}, using defaults", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
