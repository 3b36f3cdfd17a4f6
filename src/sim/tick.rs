//! Fixed timestep simulation tick
//!
//! Core game loop that advances one round deterministically. Per tick:
//! score, player motion, beat spawn, obstacle scroll + collision, cleanup.

use super::state::{GameEvent, GameState, RoundPhase};

/// How close (in units) the nearest obstacle's left edge gets to the
/// player's right edge before autoplay jumps
pub const AUTOPILOT_LOOKAHEAD: f32 = 80.0;

/// Inputs for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Seconds on the active time source (wall clock or track position)
    pub elapsed_secs: f64,
    /// Primary action arrived since the last tick
    pub jump: bool,
    /// Demo mode - jump automatically in front of obstacles
    pub autoplay: bool,
}

/// Advance the round by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    // Ready waits for input, GameOver waits for restart
    if state.phase != RoundPhase::Running {
        return;
    }

    state.time_ticks += 1;
    state.score += 1;

    if input.jump || (input.autoplay && autopilot_wants_jump(state)) {
        state.request_jump();
    }

    let physics = state.physics;
    state.player.integrate(&physics);

    if let Some(obstacle) = state.scheduler.maybe_spawn(input.elapsed_secs) {
        log::debug!(
            "Spawn #{} at {:.3}s (height {})",
            state.scheduler.cursor(),
            input.elapsed_secs,
            obstacle.size.y
        );
        state.events.push(GameEvent::ObstacleSpawned {
            height: obstacle.size.y,
        });
        state.obstacles.push(obstacle);
    }

    // Move everything first, then resolve: several simultaneous hits end the round once
    let player = state.player.rect();
    let mut hit = false;
    for obstacle in &mut state.obstacles {
        obstacle.pos.x -= physics.obstacle_speed;
        hit |= player.overlaps(&obstacle.rect());
    }
    if hit {
        if let Some(summary) = state.end_round() {
            log::info!(
                "Game over: score {} (high {}{})",
                summary.score,
                summary.high_score,
                if summary.new_record { ", new record" } else { "" }
            );
        }
    }

    state.obstacles.retain(|o| !o.off_screen());
}

/// Grounded, and the nearest obstacle still ahead is within lookahead
pub fn autopilot_wants_jump(state: &GameState) -> bool {
    if state.player.airborne {
        return false;
    }
    let player = state.player.rect();
    state
        .obstacles
        .iter()
        .find(|o| o.rect().right() > player.left())
        .is_some_and(|o| o.pos.x - player.right() <= AUTOPILOT_LOOKAHEAD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Settings;
    use crate::sim::state::Obstacle;
    use glam::Vec2;
    use proptest::prelude::*;

    fn no_obstacles() -> Settings {
        Settings {
            bpm: 0.0,
            ..Default::default()
        }
    }

    fn running(settings: &Settings) -> GameState {
        let mut state = GameState::new(settings, 0, 12345);
        state.start();
        state.drain_events();
        state
    }

    fn at(secs: f64) -> TickInput {
        TickInput {
            elapsed_secs: secs,
            ..Default::default()
        }
    }

    #[test]
    fn test_ready_does_not_advance() {
        let mut state = GameState::new(&Settings::default(), 0, 1);
        for i in 0..10 {
            tick(&mut state, &at(i as f64));
        }
        assert_eq!(state.score, 0);
        assert_eq!(state.time_ticks, 0);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.scheduler.cursor(), 0);
    }

    #[test]
    fn test_jump_input() {
        let mut state = running(&no_obstacles());
        tick(
            &mut state,
            &TickInput {
                jump: true,
                ..Default::default()
            },
        );
        assert!(state.player.airborne);
        // Impulse, then one tick of gravity
        assert_eq!(state.player.vel_y, JUMP_IMPULSE + GRAVITY);
        assert_eq!(state.player.pos.y, GROUND_Y - PLAYER_SIZE + JUMP_IMPULSE + GRAVITY);
        assert_eq!(state.drain_events(), vec![GameEvent::Jumped]);
    }

    #[test]
    fn test_spawn_follows_beatmap() {
        let mut state = running(&Settings::default());
        let first = state.scheduler.beatmap().get(0).unwrap();

        tick(&mut state, &at(first - 0.01));
        assert!(state.obstacles.is_empty());

        tick(&mut state, &at(first));
        assert_eq!(state.obstacles.len(), 1);
        // Spawned at the right edge and scrolled once in the same tick
        assert_eq!(state.obstacles[0].pos.x, CANVAS_WIDTH - OBSTACLE_SPEED);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::ObstacleSpawned {
                height: BASE_OBSTACLE_HEIGHT
            }]
        );
    }

    #[test]
    fn test_obstacle_removed_once_off_screen() {
        // Player out of the way; width chosen so (width + 30) / 5 is not whole
        let settings = Settings {
            bpm: 60.0,
            lead_in_secs: 0.0,
            music_duration_secs: 2.0,
            canvas_width: 802.0,
            player_x: -1000.0,
            ..Default::default()
        };
        let mut state = running(&settings);

        let expected = ((802.0 + OBSTACLE_WIDTH) / OBSTACLE_SPEED).ceil() as u32;
        assert_eq!(expected, 167);

        for _ in 0..expected - 1 {
            tick(&mut state, &at(2.0));
        }
        assert_eq!(state.obstacles.len(), 1);
        tick(&mut state, &at(2.0));
        assert!(state.obstacles.is_empty());
        assert_eq!(state.phase, RoundPhase::Running);
    }

    #[test]
    fn test_removal_preserves_order() {
        let mut state = running(&Settings {
            player_x: -1000.0,
            ..no_obstacles()
        });
        let size = Vec2::new(OBSTACLE_WIDTH, BASE_OBSTACLE_HEIGHT);
        state.obstacles.push(Obstacle::new(Vec2::new(-28.0, 270.0), size));
        state.obstacles.push(Obstacle::new(Vec2::new(300.0, 270.0), size));
        state.obstacles.push(Obstacle::new(Vec2::new(600.0, 230.0), size));

        tick(&mut state, &at(0.0));
        let xs: Vec<f32> = state.obstacles.iter().map(|o| o.pos.x).collect();
        assert_eq!(xs, vec![295.0, 595.0]);
    }

    #[test]
    fn test_collision_ends_round_once() {
        let mut state = running(&no_obstacles());
        state.high_score = 0;
        // Two obstacles right on top of the player
        let size = Vec2::new(OBSTACLE_WIDTH, BASE_OBSTACLE_HEIGHT);
        state.obstacles.push(Obstacle::new(Vec2::new(110.0, 270.0), size));
        state.obstacles.push(Obstacle::new(Vec2::new(120.0, 270.0), size));

        tick(&mut state, &at(0.0));
        assert_eq!(state.phase, RoundPhase::GameOver);
        assert_eq!(state.score, 1);
        assert_eq!(state.high_score, 1);

        let game_overs = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver(_)))
            .count();
        assert_eq!(game_overs, 1);

        let frozen: Vec<Vec2> = state.obstacles.iter().map(|o| o.pos).collect();
        for i in 0..100 {
            tick(&mut state, &at(100.0 + i as f64));
        }
        assert_eq!(state.score, 1);
        assert_eq!(state.scheduler.cursor(), 0);
        assert!(state.drain_events().is_empty());
        let after: Vec<Vec2> = state.obstacles.iter().map(|o| o.pos).collect();
        assert_eq!(frozen, after);
    }

    #[test]
    fn test_autopilot_clears_opening_obstacles() {
        let mut state = running(&Settings::default());
        let mut ticks = 0u64;
        while state.scheduler.cursor() < 6 || ticks < 1000 {
            let input = TickInput {
                elapsed_secs: ticks as f64 / REFERENCE_TICK_RATE,
                autoplay: true,
                ..Default::default()
            };
            tick(&mut state, &input);
            ticks += 1;
            assert_eq!(state.phase, RoundPhase::Running, "hit at tick {}", ticks);
        }
        assert_eq!(state.score, ticks);
    }

    #[test]
    fn test_autopilot_waits_for_obstacle() {
        let mut state = running(&no_obstacles());
        assert!(!autopilot_wants_jump(&state));

        let size = Vec2::new(OBSTACLE_WIDTH, BASE_OBSTACLE_HEIGHT);
        state.obstacles.push(Obstacle::new(Vec2::new(400.0, 270.0), size));
        assert!(!autopilot_wants_jump(&state));

        state.obstacles[0].pos.x = PLAYER_X + PLAYER_SIZE + AUTOPILOT_LOOKAHEAD;
        assert!(autopilot_wants_jump(&state));

        state.player.airborne = true;
        assert!(!autopilot_wants_jump(&state));
    }

    #[test]
    fn test_determinism() {
        // Two rounds with the same seed produce identical results
        let run = || {
            let mut state = running(&Settings::default());
            for t in 0..6000u64 {
                let input = TickInput {
                    elapsed_secs: t as f64 / REFERENCE_TICK_RATE,
                    autoplay: true,
                    ..Default::default()
                };
                tick(&mut state, &input);
            }
            (state.score, state.phase, state.snapshot())
        };
        assert_eq!(run(), run());
    }

    proptest! {
        #[test]
        fn prop_score_counts_running_ticks(n in 0usize..2000, jumps in proptest::collection::vec(any::<bool>(), 0..2000)) {
            let mut state = running(&no_obstacles());
            for i in 0..n {
                let input = TickInput {
                    elapsed_secs: i as f64 / REFERENCE_TICK_RATE,
                    jump: jumps.get(i).copied().unwrap_or(false),
                    ..Default::default()
                };
                tick(&mut state, &input);
            }
            prop_assert_eq!(state.score, n as u64);
            prop_assert_eq!(state.time_ticks, n as u64);
        }

        #[test]
        fn prop_game_over_is_terminal(extra in 1usize..300) {
            let mut state = running(&Settings::default());
            state.score = 41;
            state.end_round();
            state.drain_events();
            let high = state.high_score;
            for i in 0..extra {
                tick(&mut state, &at(60.0 + i as f64));
            }
            prop_assert_eq!(state.score, 41);
            prop_assert_eq!(state.high_score, high);
            prop_assert!(state.obstacles.is_empty());
            prop_assert!(state.events.is_empty());
        }
    }
}
