//! Bomber Girl entry point
//!
//! Handles platform-specific initialization. The browser build drives a
//! session from requestAnimationFrame and switches screens on the outcome;
//! the native build plays one headless session with a random bot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent};

    use bomber_girl::view::board_text;
    use bomber_girl::{Command, Session, SessionHost, Settings, command_for_key};

    const SCREEN_START: &str = "start";
    const SCREEN_PLAYING: &str = "playing";
    const SCREEN_GAME_OVER: &str = "game-over";
    const SCREEN_WIN: &str = "win";
    const SCREENS: [&str; 4] = [SCREEN_START, SCREEN_PLAYING, SCREEN_GAME_OVER, SCREEN_WIN];

    /// Shows exactly one screen section at a time
    struct ScreenHost {
        document: Document,
    }

    impl ScreenHost {
        fn show(&self, id: &str) {
            for screen in SCREENS {
                if let Some(el) = self.document.get_element_by_id(screen) {
                    let classes = el.class_list();
                    let _ = if screen == id {
                        classes.remove_1("hidden")
                    } else {
                        classes.add_1("hidden")
                    };
                }
            }
        }
    }

    impl SessionHost for ScreenHost {
        fn on_win(&mut self) {
            self.show(SCREEN_WIN);
        }

        fn on_game_over(&mut self) {
            self.show(SCREEN_GAME_OVER);
        }
    }

    struct Game {
        session: Session<ScreenHost>,
        last_time: f64,
        /// Sub-millisecond remainder carried between frames
        carry_ms: f64,
    }

    impl Game {
        /// Returns true if the key was one of ours
        fn handle_key(&mut self, key: &str) -> bool {
            let Some(command) = command_for_key(key) else {
                return false;
            };
            let starting = command == Command::Confirm && !self.session.is_running();
            self.session.apply(command);
            if starting && self.session.is_running() {
                self.session.host().show(SCREEN_PLAYING);
            }
            true
        }

        fn update(&mut self, time: f64) {
            if self.last_time > 0.0 {
                self.carry_ms += (time - self.last_time).max(0.0);
            }
            self.last_time = time;

            let whole = self.carry_ms.floor();
            self.carry_ms -= whole;
            self.session.advance(whole as u64);
        }

        /// Update board and HUD elements in DOM
        fn update_hud(&self) {
            let Some(snapshot) = self.session.snapshot() else {
                return;
            };
            let document = &self.session.host().document;

            if let Some(el) = document.get_element_by_id("board") {
                el.set_text_content(Some(&board_text(&snapshot)));
            }
            if let Some(el) = document.get_element_by_id("enemies-remaining") {
                el.set_text_content(Some(&snapshot.enemies_remaining.to_string()));
            }
        }
    }

    /// Settings JSON from `<... id="game" data-settings='{...}'>`, else defaults
    fn read_settings(document: &Document) -> Settings {
        let Some(json) = document
            .get_element_by_id("game")
            .and_then(|el| el.get_attribute("data-settings"))
        else {
            return Settings::default();
        };
        match Settings::from_json(&json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring data-settings: {}", e);
                Settings::default()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Bomber Girl starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document to attach to");
            return;
        };

        let settings = read_settings(&document);
        let seed = js_sys::Date::now() as u64;
        let host = ScreenHost {
            document: document.clone(),
        };
        host.show(SCREEN_START);

        let game = Rc::new(RefCell::new(Game {
            session: Session::seeded(settings, host, seed),
            last_time: 0.0,
            carry_ms: 0.0,
        }));
        log::info!("Game initialized with seed: {}", seed);

        setup_keyboard(game.clone());
        request_animation_frame(game);
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if game.borrow_mut().handle_key(&event.key()) {
                event.prevent_default();
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use std::error::Error;

    use rand::Rng;

    use bomber_girl::sim::{Direction, GamePhase, RngState};
    use bomber_girl::view::board_text;
    use bomber_girl::{Command, Session, SessionHost, Settings};

    const DEFAULT_SEED: u64 = 42;
    const MAX_STEPS: u32 = 2_000;
    /// Chance per step that the bot drops a bomb instead of moving
    const BOMB_CHANCE: f64 = 0.08;

    /// Logs the outcome instead of switching screens
    #[derive(Debug, Default)]
    struct LogHost {
        wins: u32,
        losses: u32,
    }

    impl SessionHost for LogHost {
        fn on_win(&mut self) {
            self.wins += 1;
            log::info!("Host notified: all enemies cleared");
        }

        fn on_game_over(&mut self) {
            self.losses += 1;
            log::info!("Host notified: game over");
        }
    }

    /// `bomber-girl [settings.json] [seed]`
    pub fn run() -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args().skip(1);
        let settings = match args.next() {
            Some(path) => Settings::from_json(&std::fs::read_to_string(&path)?)?,
            None => Settings::default(),
        };
        let seed = match args.next() {
            Some(raw) => raw.parse()?,
            None => DEFAULT_SEED,
        };

        let tick_ms = u64::from(settings.tick_ms);
        let mut session = Session::seeded(settings.clone(), LogHost::default(), seed);
        session.new_session(settings)?;
        let mut bot = RngState::new(seed.wrapping_add(1)).to_rng();

        let mut steps = 0;
        while session.is_running() && steps < MAX_STEPS {
            let command = if bot.random::<f64>() < BOMB_CHANCE {
                Command::PlaceBomb
            } else {
                Command::Move(Direction::ALL[bot.random_range(0..Direction::ALL.len())])
            };
            session.apply(command);
            session.advance(tick_ms);
            steps += 1;
        }

        if let Some(snapshot) = session.snapshot() {
            print!("{}", board_text(&snapshot));
            println!(
                "Tick {}, enemies remaining: {}",
                snapshot.time_ticks, snapshot.enemies_remaining
            );
        }
        match session.phase() {
            GamePhase::Won => println!("Outcome: win"),
            GamePhase::Lost => println!("Outcome: game over"),
            GamePhase::Initializing | GamePhase::Running => {
                println!("Outcome: unfinished after {} steps", steps)
            }
        }
        log::debug!("Host saw {:?}", session.host());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bomber Girl (native) starting...");
    log::info!("Native mode plays one headless session - build for wasm32 to play in a browser");

    if let Err(e) = autoplay::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
