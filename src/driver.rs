//! Simulation driver
//!
//! Owns one round plus its collaborators (clock, music, high score store)
//! and is the only place that reads real time. Call `frame` from a display
//! callback with the frame delta, or `step` once per fixed-interval timer.

use crate::audio::{AudioTransport, LoopWrapDetector};
use crate::consts::MAX_SUBSTEPS;
use crate::highscores::HighScoreBook;
use crate::persistence::ScoreStore;
use crate::platform::Clock;
use crate::settings::{Settings, TimeSourceMode};
use crate::sim::{GameEvent, GameState, RenderSnapshot, RoundPhase, RoundSummary, TickInput, tick};

/// Longest frame delta fed to the accumulator (seconds)
const MAX_FRAME_DT: f64 = 0.1;

/// What the primary action did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Started,
    Jumped,
    /// Airborne, or the round is over
    Ignored,
}

pub struct Driver {
    settings: Settings,
    state: GameState,
    audio: Box<dyn AudioTransport>,
    clock: Box<dyn Clock>,
    high_scores: HighScoreBook,
    wrap_detector: LoopWrapDetector,
    /// Pushed wrap notification waiting for the next tick
    wrap_pending: bool,
    accumulator: f64,
    round_started_at: f64,
    loop_started_at: f64,
    /// Clock reading when a Running round was stopped
    stopped_at: Option<f64>,
    /// Time source actually in use this round
    time_source: TimeSourceMode,
    audio_live: bool,
    warned_position_gap: bool,
    active: bool,
    autoplay: bool,
    summary: Option<RoundSummary>,
}

impl Driver {
    pub fn new(
        settings: Settings,
        audio: Box<dyn AudioTransport>,
        clock: Box<dyn Clock>,
        store: Box<dyn ScoreStore>,
        seed: u64,
    ) -> Self {
        let settings = settings.sanitized();
        let high_scores = HighScoreBook::load(store);
        let seed = settings.seed.unwrap_or(seed);
        let state = GameState::new(&settings, high_scores.best(), seed);
        let now = clock.now_secs();

        Self {
            time_source: settings.time_source,
            settings,
            state,
            audio,
            clock,
            high_scores,
            wrap_detector: LoopWrapDetector::new(),
            wrap_pending: false,
            accumulator: 0.0,
            round_started_at: now,
            loop_started_at: now,
            stopped_at: None,
            audio_live: false,
            warned_position_gap: false,
            active: false,
            autoplay: false,
            summary: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    pub fn time_source(&self) -> TimeSourceMode {
        self.time_source
    }

    pub fn high_score(&self) -> u64 {
        self.high_scores.best()
    }

    /// Ticking is enabled
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_autoplay(&mut self, autoplay: bool) {
        self.autoplay = autoplay;
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        self.state.snapshot()
    }

    /// Tap/click/key: start in Ready, jump in Running, nothing in GameOver
    pub fn primary_action(&mut self) -> ActionOutcome {
        match self.state.phase {
            RoundPhase::Ready => {
                if self.start_round() {
                    ActionOutcome::Started
                } else {
                    ActionOutcome::Ignored
                }
            }
            RoundPhase::Running => {
                if self.state.request_jump() {
                    ActionOutcome::Jumped
                } else {
                    ActionOutcome::Ignored
                }
            }
            RoundPhase::GameOver => ActionOutcome::Ignored,
        }
    }

    fn start_round(&mut self) -> bool {
        if !self.state.start() {
            return false;
        }

        let now = self.clock.now_secs();
        self.round_started_at = now;
        self.loop_started_at = now;
        self.stopped_at = None;
        self.accumulator = 0.0;
        self.wrap_detector.reset();
        self.wrap_pending = false;
        self.warned_position_gap = false;
        self.summary = None;

        self.audio_live = match self.audio.play(true) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Music unavailable ({}), continuing without audio", e);
                false
            }
        };
        self.time_source = match self.settings.time_source {
            TimeSourceMode::AudioPosition if !self.audio_live => {
                log::warn!("Falling back to wall-clock timing for this round");
                TimeSourceMode::ElapsedWallClock
            }
            mode => mode,
        };
        self.active = true;

        log::info!(
            "Round started (seed {}, {} timing from {}, high score {})",
            self.state.seed,
            self.time_source.as_str(),
            if self.settings.rebase_clock_on_loop {
                "each loop start"
            } else {
                "round start"
            },
            self.high_scores.best()
        );
        self.handle_events();
        true
    }

    /// Stop ticking. The round keeps its state and the music is paused.
    pub fn stop(&mut self) {
        if self.active && self.state.phase == RoundPhase::Running {
            self.stopped_at = Some(self.clock.now_secs());
            if let Err(e) = self.audio.pause() {
                log::warn!("Failed to pause music: {}", e);
            }
        }
        self.active = false;
        self.accumulator = 0.0;
    }

    /// Re-enable ticking for a stopped Running round.
    ///
    /// Time spent stopped is excluded from the wall clock, so beats due
    /// during the stop are not released on resume.
    pub fn resume(&mut self) -> bool {
        if self.state.phase != RoundPhase::Running {
            return false;
        }
        if let Some(stopped_at) = self.stopped_at.take() {
            let gap = (self.clock.now_secs() - stopped_at).max(0.0);
            self.round_started_at += gap;
            self.loop_started_at += gap;
            self.wrap_detector.reset();
            if self.audio_live {
                if let Err(e) = self.audio.play(true) {
                    log::warn!("Music did not resume ({}), using wall clock", e);
                    self.audio_live = false;
                    self.time_source = TimeSourceMode::ElapsedWallClock;
                }
            }
            log::info!("Round resumed after {:.1}s", gap);
        }
        self.active = true;
        true
    }

    /// Replace a finished round with a fresh Ready one
    pub fn restart(&mut self) -> bool {
        if self.state.phase != RoundPhase::GameOver {
            log::debug!("Restart ignored in {:?}", self.state.phase);
            return false;
        }
        self.active = false;
        self.accumulator = 0.0;
        self.stopped_at = None;
        let seed = self.state.seed.wrapping_add(1);
        self.state = GameState::new(&self.settings, self.high_scores.best(), seed);
        self.summary = None;
        log::info!("Round reset (seed {})", seed);
        true
    }

    /// The music reported a wrap. Consumed by the next tick; several
    /// notifications for one wrap collapse into one.
    pub fn notify_loop_wrapped(&mut self) {
        self.wrap_pending = true;
    }

    /// Run as many fixed ticks as `dt_secs` of real time covers
    pub fn frame(&mut self, dt_secs: f64) -> u32 {
        if !self.active {
            return 0;
        }
        if dt_secs.is_finite() {
            self.accumulator += dt_secs.clamp(0.0, MAX_FRAME_DT);
        }

        let tick_dt = self.settings.tick_dt();
        let mut substeps = 0;
        while self.accumulator >= tick_dt && substeps < MAX_SUBSTEPS {
            if !self.step() {
                self.accumulator = 0.0;
                break;
            }
            self.accumulator -= tick_dt;
            substeps += 1;
        }
        substeps
    }

    /// Run exactly one tick. Returns false when not ticking.
    pub fn step(&mut self) -> bool {
        if !self.active || self.state.phase != RoundPhase::Running {
            return false;
        }

        let now = self.clock.now_secs();
        self.poll_loop_wrap(now);
        let input = TickInput {
            elapsed_secs: self.elapsed_secs(now),
            jump: false,
            autoplay: self.autoplay,
        };
        tick(&mut self.state, &input);
        self.handle_events();
        true
    }

    /// End-of-round numbers, handed out once per GameOver
    pub fn take_summary(&mut self) -> Option<RoundSummary> {
        self.summary.take()
    }

    fn wrap_refractory_secs(&self) -> f64 {
        (self.settings.music_duration_secs * 0.5).max(0.0)
    }

    fn poll_loop_wrap(&mut self, now: f64) {
        let mut wrapped = std::mem::take(&mut self.wrap_pending);
        match self.audio.position_secs() {
            Some(position) => wrapped |= self.wrap_detector.observe(position),
            // No track to listen to: the loop turns over on the wall clock
            None => {
                let duration = self.settings.music_duration_secs;
                wrapped |= duration > 0.0 && now - self.loop_started_at >= duration;
            }
        }

        if wrapped && now - self.loop_started_at >= self.wrap_refractory_secs() {
            self.loop_started_at = now;
            self.state.on_music_loop_wrap();
        }
    }

    fn elapsed_secs(&mut self, now: f64) -> f64 {
        if self.time_source == TimeSourceMode::AudioPosition {
            if let Some(position) = self.audio.position_secs() {
                return position;
            }
            if !self.warned_position_gap {
                log::warn!("Playback position unavailable, using wall clock");
                self.warned_position_gap = true;
            }
        }

        let origin = if self.settings.rebase_clock_on_loop {
            self.loop_started_at
        } else {
            self.round_started_at
        };
        now - origin
    }

    fn handle_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::GameOver(summary) => {
                    if let Err(e) = self.audio.pause() {
                        log::warn!("Failed to pause music: {}", e);
                    }
                    self.high_scores.commit(summary.score);
                    self.summary = Some(summary);
                    self.active = false;
                }
                GameEvent::LoopWrapped { loop_count } => {
                    log::info!("Loop {} (tall chance {:.2})", loop_count + 1, self.state.scheduler.tall_chance());
                }
                GameEvent::RoundStarted | GameEvent::Jumped | GameEvent::ObstacleSpawned { .. } => {
                    log::trace!("{:?}", event);
                }
            }
        }
    }
}
