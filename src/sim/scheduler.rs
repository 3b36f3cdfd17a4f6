//! Beat-synchronized obstacle spawning
//!
//! Walks a cursor along the beatmap as elapsed time passes. At most one
//! obstacle is released per call, so a late clock drains a backlog one tick
//! at a time instead of stacking obstacles on the same frame.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::beatmap::Beatmap;
use super::state::Obstacle;
use crate::settings::Settings;

/// Spawn geometry and tall-obstacle odds
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRule {
    /// Obstacles enter at the right edge of the playfield
    pub spawn_x: f32,
    pub ground_y: f32,
    pub width: f32,
    pub base_height: f32,
    pub tall_height: f32,
    pub tall_after_secs: f64,
    pub tall_base_chance: f64,
    pub tall_chance_per_loop: f64,
}

impl SpawnRule {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            spawn_x: settings.canvas_width,
            ground_y: settings.ground_y,
            width: settings.obstacle_width.max(0.0),
            base_height: settings.base_obstacle_height.max(0.0),
            tall_height: settings.tall_obstacle_height.max(0.0),
            tall_after_secs: settings.tall_obstacle_after_secs,
            tall_base_chance: settings.tall_base_chance,
            tall_chance_per_loop: settings.tall_chance_per_loop,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    beatmap: Beatmap,
    rule: SpawnRule,
    /// Index of the next beatmap entry to fire, in [0, beatmap.len()]
    cursor: usize,
    loop_count: u32,
    rng: Pcg32,
}

impl Scheduler {
    pub fn new(beatmap: Beatmap, rule: SpawnRule, seed: u64) -> Self {
        Self {
            beatmap,
            rule,
            cursor: 0,
            loop_count: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn beatmap(&self) -> &Beatmap {
        &self.beatmap
    }

    /// Probability that a spawn past the threshold is tall.
    ///
    /// Grows by a fixed step per loop; capped at 1.0, which cannot change
    /// the outcome since the roll is always below 1.
    pub fn tall_chance(&self) -> f64 {
        (self.rule.tall_base_chance + self.rule.tall_chance_per_loop * self.loop_count as f64)
            .min(1.0)
    }

    /// Release the obstacle due at `elapsed_secs`, if any
    pub fn maybe_spawn(&mut self, elapsed_secs: f64) -> Option<Obstacle> {
        let due = self.beatmap.get(self.cursor)?;
        if elapsed_secs < due {
            return None;
        }
        self.cursor += 1;

        let height = self.roll_height(elapsed_secs);
        Some(Obstacle::new(
            Vec2::new(self.rule.spawn_x, self.rule.ground_y - height),
            Vec2::new(self.rule.width, height),
        ))
    }

    fn roll_height(&mut self, elapsed_secs: f64) -> f32 {
        if elapsed_secs > self.rule.tall_after_secs {
            let roll: f64 = self.rng.random();
            if roll < self.tall_chance() {
                return self.rule.tall_height;
            }
        }
        self.rule.base_height
    }

    /// The background track restarted: replay the chart one notch harder
    pub fn on_music_loop_wrap(&mut self) {
        self.loop_count = self.loop_count.saturating_add(1);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    fn scheduler(times: &[f64]) -> Scheduler {
        // 60 BPM, no lead-in: beats land on whole seconds
        let duration = times.len() as f64 * 2.0;
        let map = Beatmap::generate(60.0, 0.0, duration);
        assert_eq!(map.as_slice(), times);
        Scheduler::new(map, SpawnRule::from_settings(&Settings::default()), 7)
    }

    #[test]
    fn test_nothing_before_first_timestamp() {
        let mut s = scheduler(&[2.0, 4.0]);
        assert!(s.maybe_spawn(0.0).is_none());
        assert!(s.maybe_spawn(1.99).is_none());
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_spawn_at_timestamp() {
        let mut s = scheduler(&[2.0, 4.0]);
        let obstacle = s.maybe_spawn(2.0).unwrap();
        assert_eq!(s.cursor(), 1);
        assert_eq!(obstacle.pos.x, CANVAS_WIDTH);
        assert_eq!(obstacle.size, Vec2::new(OBSTACLE_WIDTH, BASE_OBSTACLE_HEIGHT));
        assert_eq!(obstacle.pos.y, GROUND_Y - BASE_OBSTACLE_HEIGHT);
    }

    #[test]
    fn test_one_spawn_per_call_when_behind() {
        let mut s = scheduler(&[2.0, 4.0, 6.0]);
        // Clock jumped past every entry: still one per call
        assert!(s.maybe_spawn(100.0).is_some());
        assert_eq!(s.cursor(), 1);
        assert!(s.maybe_spawn(100.0).is_some());
        assert!(s.maybe_spawn(100.0).is_some());
        assert_eq!(s.cursor(), 3);
        // Exhausted
        assert!(s.maybe_spawn(100.0).is_none());
        assert_eq!(s.cursor(), 3);
    }

    #[test]
    fn test_empty_beatmap_never_spawns() {
        let mut s = Scheduler::new(
            Beatmap::generate(0.0, 2.0, 180.0),
            SpawnRule::from_settings(&Settings::default()),
            1,
        );
        assert!(s.maybe_spawn(1000.0).is_none());
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_loop_wrap_resets_cursor() {
        let mut s = scheduler(&[2.0, 4.0]);
        s.maybe_spawn(5.0);
        s.maybe_spawn(5.0);
        assert_eq!(s.cursor(), 2);

        s.on_music_loop_wrap();
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.loop_count(), 1);
        assert!(s.maybe_spawn(1.0).is_none());
        assert!(s.maybe_spawn(2.0).is_some());
    }

    #[test]
    fn test_never_tall_before_threshold() {
        let mut s = scheduler(&[2.0, 4.0]);
        for _ in 0..20 {
            s.on_music_loop_wrap();
        }
        // Chance is saturated, but we're before the threshold
        assert_eq!(s.maybe_spawn(45.0).unwrap().size.y, BASE_OBSTACLE_HEIGHT);
    }

    #[test]
    fn test_tall_chance_growth_and_cap() {
        let mut s = scheduler(&[2.0]);
        assert!((s.tall_chance() - 0.2).abs() < 1e-12);
        for _ in 0..3 {
            s.on_music_loop_wrap();
        }
        assert!((s.tall_chance() - 0.5).abs() < 1e-12);
        for _ in 0..10 {
            s.on_music_loop_wrap();
        }
        assert_eq!(s.tall_chance(), 1.0);
        // Always tall once the chance is saturated
        assert_eq!(s.maybe_spawn(50.0).unwrap().size.y, TALL_OBSTACLE_HEIGHT);
    }

    #[test]
    fn test_tall_frequency_matches_chance() {
        let mut s = scheduler(&[2.0]);
        for _ in 0..3 {
            s.on_music_loop_wrap();
        }

        let trials = 10_000;
        let mut tall = 0;
        for _ in 0..trials {
            s.cursor = 0;
            let obstacle = s.maybe_spawn(50.0).unwrap();
            if obstacle.size.y == TALL_OBSTACLE_HEIGHT {
                assert_eq!(obstacle.pos.y, GROUND_Y - TALL_OBSTACLE_HEIGHT);
                tall += 1;
            }
        }
        let freq = tall as f64 / trials as f64;
        assert!((freq - 0.5).abs() < 0.03, "tall frequency {}", freq);
    }

    #[test]
    fn test_same_seed_same_heights() {
        let heights = |seed| {
            let mut s = Scheduler::new(
                Beatmap::generate(140.0, 2.0, 180.0),
                SpawnRule::from_settings(&Settings::default()),
                seed,
            );
            (0..200)
                .filter_map(|_| s.maybe_spawn(60.0).map(|o| o.size.y))
                .collect::<Vec<_>>()
        };
        assert_eq!(heights(42), heights(42));
    }
}
