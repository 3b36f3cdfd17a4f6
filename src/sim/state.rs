//! Game state and core simulation types
//!
//! One owned `GameState` per round. The driver passes it explicitly to the
//! tick; nothing here lives at process scope.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::beatmap::Beatmap;
use super::collision::Rect;
use super::scheduler::{Scheduler, SpawnRule};
use super::snapshot::RenderSnapshot;
use crate::settings::{PhysicsParams, Settings};

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waiting for the first interaction; nothing moves
    Ready,
    /// Physics, spawning and scoring are live
    Running,
    /// Frozen until an external restart
    GameOver,
}

/// The player-controlled runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner; x never changes
    pub pos: Vec2,
    pub size: Vec2,
    pub vel_y: f32,
    pub airborne: bool,
}

impl Player {
    /// Player standing on the ground line
    pub fn new(x: f32, ground_y: f32, size: f32) -> Self {
        Self {
            pos: Vec2::new(x, ground_y - size),
            size: Vec2::splat(size),
            vel_y: 0.0,
            airborne: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    /// Single-jump model: ignored while airborne
    pub fn jump(&mut self, impulse: f32) -> bool {
        if self.airborne {
            return false;
        }
        self.vel_y = impulse;
        self.airborne = true;
        true
    }

    /// Apply gravity, integrate, then clamp to the ground line
    pub fn integrate(&mut self, physics: &PhysicsParams) {
        self.vel_y += physics.gravity;
        self.pos.y += self.vel_y;

        if self.pos.y + self.size.y > physics.ground_y {
            self.pos.y = physics.ground_y - self.size.y;
            self.vel_y = 0.0;
            self.airborne = false;
        }
    }
}

/// A scrolling obstacle; only x changes after spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Obstacle {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size: size.max(Vec2::ZERO),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    /// Fully past the left edge of the screen
    #[inline]
    pub fn off_screen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }
}

/// Final numbers for a finished round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub score: u64,
    pub high_score: u64,
    /// Score beat the previous high score
    pub new_record: bool,
}

/// Things that happened during a tick, for audio/presentation/logging
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    RoundStarted,
    Jumped,
    ObstacleSpawned { height: f32 },
    LoopWrapped { loop_count: u32 },
    GameOver(RoundSummary),
}

/// Complete state of one round
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the scheduler RNG was built from
    pub seed: u64,
    pub phase: RoundPhase,
    pub player: Player,
    /// Spawn order == screen order, front to back
    pub obstacles: Vec<Obstacle>,
    pub scheduler: Scheduler,
    /// One point per Running tick
    pub score: u64,
    /// Best score known to this session
    pub high_score: u64,
    /// Running ticks so far
    pub time_ticks: u64,
    pub physics: PhysicsParams,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh round in the Ready phase
    pub fn new(settings: &Settings, high_score: u64, seed: u64) -> Self {
        let beatmap = Beatmap::generate(
            settings.bpm,
            settings.lead_in_secs,
            settings.music_duration_secs,
        );
        let physics = settings.physics();

        Self {
            seed,
            phase: RoundPhase::Ready,
            player: Player::new(settings.player_x, physics.ground_y, settings.player_size.max(0.0)),
            obstacles: Vec::new(),
            scheduler: Scheduler::new(beatmap, SpawnRule::from_settings(settings), seed),
            score: 0,
            high_score,
            time_ticks: 0,
            physics,
            events: Vec::new(),
        }
    }

    /// Ready -> Running. Any other phase is left alone.
    pub fn start(&mut self) -> bool {
        if self.phase != RoundPhase::Ready {
            return false;
        }
        self.phase = RoundPhase::Running;
        self.events.push(GameEvent::RoundStarted);
        true
    }

    /// Jump if Running and grounded; otherwise silently dropped
    pub fn request_jump(&mut self) -> bool {
        if self.phase != RoundPhase::Running {
            return false;
        }
        let jumped = self.player.jump(self.physics.jump_impulse);
        if jumped {
            self.events.push(GameEvent::Jumped);
        }
        jumped
    }

    /// Running -> GameOver, committing the high score.
    ///
    /// Returns the summary only on the transition; later calls are no-ops.
    pub fn end_round(&mut self) -> Option<RoundSummary> {
        if self.phase != RoundPhase::Running {
            return None;
        }
        self.phase = RoundPhase::GameOver;

        let new_record = self.score > self.high_score;
        if new_record {
            self.high_score = self.score;
        }
        let summary = RoundSummary {
            score: self.score,
            high_score: self.high_score,
            new_record,
        };
        self.events.push(GameEvent::GameOver(summary));
        Some(summary)
    }

    /// Forward a detected track wrap to the scheduler
    pub fn on_music_loop_wrap(&mut self) {
        self.scheduler.on_music_loop_wrap();
        let loop_count = self.scheduler.loop_count();
        log::debug!("Music loop wrapped (loop {})", loop_count + 1);
        self.events.push(GameEvent::LoopWrapped { loop_count });
    }

    pub fn loop_count(&self) -> u32 {
        self.scheduler.loop_count()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view for the presentation layer
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            player: self.player.rect(),
            obstacles: self.obstacles.iter().map(Obstacle::rect).collect(),
            score: self.score,
            high_score: self.high_score,
            loop_count: self.loop_count(),
            phase: self.phase,
        }
    }
}
