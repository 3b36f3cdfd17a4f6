//! Rhythm Hopper entry point
//!
//! Native: runs a headless autoplay round on a simulated clock.
//! Web: wires canvas input and the animation frame loop to the driver.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use rhythm_hopper::audio::{AudioTransport, HtmlAudioTransport, SilentAudio};
    use rhythm_hopper::persistence::LocalStorageStore;
    use rhythm_hopper::platform::SystemClock;
    use rhythm_hopper::sim::RoundPhase;
    use rhythm_hopper::{Driver, Settings};

    // Presentation hooks; the page draws, the game only hands over snapshots
    #[wasm_bindgen(inline_js = "
        export function present_snapshot(json) {
            if (typeof window.rhythmHopperDraw === 'function') {
                window.rhythmHopperDraw(JSON.parse(json));
            }
        }

        export function present_round_end(score, highScore) {
            if (typeof window.rhythmHopperRoundEnd === 'function') {
                window.rhythmHopperRoundEnd(score, highScore);
            }
        }
    ")]
    extern "C" {
        fn present_snapshot(json: &str);
        fn present_round_end(score: f64, high_score: f64);
    }

    /// Game instance holding the driver and frame timing
    struct Game {
        driver: Driver,
        last_time: f64,
    }

    impl Game {
        /// Tap/click/Space. GameOver restarts to a fresh Ready round.
        fn handle_interaction(&mut self) {
            if self.driver.phase() == RoundPhase::GameOver {
                self.driver.restart();
            } else {
                self.driver.primary_action();
            }
        }

        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time) / 1000.0
            } else {
                0.0
            };
            self.last_time = time;

            self.driver.frame(dt);

            if let Some(summary) = self.driver.take_summary() {
                present_round_end(summary.score as f64, summary.high_score as f64);
            }
            match serde_json::to_string(&self.driver.snapshot()) {
                Ok(json) => present_snapshot(&json),
                Err(e) => log::warn!("Snapshot encode failed: {}", e),
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Rhythm Hopper starting...");

        let settings = Settings::load();
        let audio: Box<dyn AudioTransport> = match HtmlAudioTransport::from_element_id("bgm") {
            Ok(audio) => Box::new(audio),
            Err(e) => {
                log::warn!("{}, playing without music", e);
                Box::new(SilentAudio)
            }
        };
        let seed = js_sys::Date::now() as u64;
        let driver = Driver::new(
            settings,
            audio,
            Box::new(SystemClock::new()),
            Box::new(LocalStorageStore::new()),
            seed,
        );
        let game = Rc::new(RefCell::new(Game {
            driver,
            last_time: 0.0,
        }));

        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("gameCanvas"))
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok());
        let Some(canvas) = canvas else {
            log::error!("No #gameCanvas element");
            return;
        };

        setup_input_handlers(&canvas, game.clone());
        request_animation_frame(game);

        log::info!("Rhythm Hopper running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse click
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                game.borrow_mut().handle_interaction();
            });
            let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().handle_interaction();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let Some(window) = web_sys::window() else {
                return;
            };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.code().as_str() {
                    "Space" => {
                        event.prevent_default();
                        g.handle_interaction();
                    }
                    "KeyI" => {
                        let autoplay = !g.driver.autoplay();
                        g.driver.set_autoplay(autoplay);
                        log::info!("Autoplay: {}", autoplay);
                    }
                    _ => {}
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game.borrow_mut().update(time);
            request_animation_frame(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// High score file for native runs
#[cfg(not(target_arch = "wasm32"))]
const HIGH_SCORE_FILE: &str = "rhythm_hopper_highscore.json";

/// Usage: rhythm-hopper [settings.json] [max-seconds] [time-source]
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rhythm_hopper::audio::SilentAudio;
    use rhythm_hopper::persistence::JsonFileStore;
    use rhythm_hopper::platform::ManualClock;
    use rhythm_hopper::{Driver, Settings, TimeSourceMode};

    env_logger::init();
    log::info!("Rhythm Hopper (native) starting...");
    log::info!("Native mode runs a headless autoplay round - build for wasm32 to play");

    let mut args = std::env::args().skip(1);
    let mut settings = match args.next() {
        Some(path) => Settings::load_from(std::path::Path::new(&path)),
        None => Settings::default(),
    };
    let max_secs: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(600.0);
    if let Some(name) = args.next() {
        match TimeSourceMode::from_str(&name) {
            Some(mode) => settings.time_source = mode,
            None => log::warn!("Unknown time source {:?}, keeping {}", name, settings.time_source.as_str()),
        }
    }

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let clock = ManualClock::new();
    let store = JsonFileStore::new(HIGH_SCORE_FILE);
    log::info!("High score file: {}", store.path().display());
    let mut driver = Driver::new(
        settings,
        Box::new(SilentAudio),
        Box::new(clock.clone()),
        Box::new(store),
        seed,
    );
    driver.set_autoplay(true);
    driver.primary_action();

    let dt = driver.settings().tick_dt();
    let max_ticks = (max_secs / dt).max(0.0) as u64;
    for _ in 0..max_ticks {
        clock.advance(dt);
        if !driver.step() {
            break;
        }
    }

    match driver.take_summary() {
        Some(summary) => println!(
            "GAME OVER  score {}  high score {}{}",
            summary.score,
            summary.high_score,
            if summary.new_record { "  (new record!)" } else { "" }
        ),
        None => {
            let snapshot = driver.snapshot();
            println!(
                "Survived {:.0}s  score {}  loop {}  high score {}",
                max_secs,
                snapshot.score,
                snapshot.loop_count + 1,
                snapshot.high_score
            );
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
