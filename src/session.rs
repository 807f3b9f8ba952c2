//! Session driver
//!
//! Wraps a `SimulationState` with what the screen host needs: a fixed-step
//! clock, explosion clear timers, restart, and the win/game-over callbacks.
//! Each callback fires at most once per session.

use crate::consts::MAX_CATCHUP_TICKS;
use crate::error::SessionError;
use crate::input::Command;
use crate::settings::Settings;
use crate::sim::{
    self, Direction, GameEvent, GamePhase, RandomSource, RngState, SimulationState, Snapshot,
};

/// Receives the two terminal outcomes
pub trait SessionHost {
    fn on_win(&mut self);
    fn on_game_over(&mut self);
}

/// Adapts a pair of closures into a `SessionHost`
pub struct Callbacks<W, L> {
    pub on_win: W,
    pub on_game_over: L,
}

impl<W: FnMut(), L: FnMut()> SessionHost for Callbacks<W, L> {
    fn on_win(&mut self) {
        (self.on_win)()
    }

    fn on_game_over(&mut self) {
        (self.on_game_over)()
    }
}

/// An explosion batch waiting to be taken off the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingClear {
    generation: u64,
    due_ms: u64,
}

pub struct Session<H: SessionHost> {
    settings: Settings,
    host: H,
    rng: Box<dyn RandomSource>,
    state: Option<SimulationState>,
    /// Host time consumed so far
    clock_ms: u64,
    /// Host time of the last tick (or session start)
    last_tick_ms: u64,
    pending_clears: Vec<PendingClear>,
    /// Host already told about the outcome
    notified: bool,
    sessions_started: u32,
}

impl<H: SessionHost> Session<H> {
    /// Create an idle session; call `new_session` to start playing
    pub fn new(settings: Settings, host: H, rng: Box<dyn RandomSource>) -> Self {
        Self {
            settings,
            host,
            rng,
            state: None,
            clock_ms: 0,
            last_tick_ms: 0,
            pending_clears: Vec::new(),
            notified: false,
            sessions_started: 0,
        }
    }

    /// Idle session drawing from a seeded PCG stream
    pub fn seeded(settings: Settings, host: H, seed: u64) -> Self {
        Self::new(settings, host, Box::new(RngState::new(seed).to_rng()))
    }

    /// Throw away any previous game and start a fresh one.
    ///
    /// On error the session is left idle (`Initializing`), never half-built.
    pub fn new_session(&mut self, settings: Settings) -> Result<(), SessionError> {
        self.state = None;
        self.pending_clears.clear();
        self.notified = false;
        self.settings = settings;

        let state = SimulationState::new(&self.settings, self.rng.as_mut())?;
        self.install(state);
        log::info!("Session {} started", self.sessions_started);
        Ok(())
    }

    /// Start again with the current settings
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.new_session(self.settings.clone())
    }

    /// Resume from a prepared state (its settings replace the current ones)
    pub fn load_state(&mut self, state: SimulationState) {
        self.pending_clears.clear();
        self.notified = false;
        self.settings = state.settings.clone();
        self.install(state);
        self.notify_host();
    }

    fn install(&mut self, state: SimulationState) {
        self.state = Some(state);
        self.last_tick_ms = self.clock_ms;
        self.sessions_started += 1;
    }

    pub fn phase(&self) -> GamePhase {
        self.state
            .as_ref()
            .map_or(GamePhase::Initializing, |s| s.phase)
    }

    pub fn is_running(&self) -> bool {
        self.phase() == GamePhase::Running
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> Option<&SimulationState> {
        self.state.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn sessions_started(&self) -> u32 {
        self.sessions_started
    }

    pub fn snapshot(&self) -> Option<Snapshot<'_>> {
        self.state.as_ref().map(SimulationState::snapshot)
    }

    /// Snapshot as JSON (`null` before the first session)
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot())
    }

    pub fn move_player(&mut self, dir: Direction) -> bool {
        self.state
            .as_mut()
            .is_some_and(|s| sim::move_player(s, dir))
    }

    pub fn place_bomb(&mut self) -> bool {
        self.state.as_mut().is_some_and(sim::place_bomb)
    }

    /// Apply a decoded key press. `Confirm` (re)starts an idle or finished session.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Move(dir) => self.move_player(dir),
            Command::PlaceBomb => self.place_bomb(),
            Command::Confirm => {
                if self.is_running() {
                    return false;
                }
                match self.restart() {
                    Ok(()) => true,
                    Err(e) => {
                        log::error!("Could not start session: {}", e);
                        false
                    }
                }
            }
        }
    }

    /// Run one tick now and schedule clears for any new explosions
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };
        let events = sim::tick(state, self.rng.as_mut());
        self.last_tick_ms = self.clock_ms;

        for event in &events {
            if let GameEvent::ExplosionStarted {
                generation,
                clear_after_ms,
            } = *event
            {
                self.pending_clears.push(PendingClear {
                    generation,
                    due_ms: self.clock_ms + u64::from(clear_after_ms),
                });
            }
        }

        self.notify_host();
        events
    }

    /// Take one explosion batch off the board, whatever else is on display
    pub fn clear_explosion(&mut self, generation: u64) -> bool {
        self.pending_clears.retain(|c| c.generation != generation);
        self.state
            .as_mut()
            .is_some_and(|s| s.clear_explosion(generation))
    }

    /// Advance host time. Runs every tick and explosion clear that falls due,
    /// in time order; a clear due at the same instant as a tick runs first.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<GameEvent> {
        let target = self.clock_ms + elapsed_ms;
        let tick_ms = u64::from(self.settings.tick_ms.max(1));
        let mut events = Vec::new();
        let mut ticks = 0;

        loop {
            let next_clear = self
                .pending_clears
                .iter()
                .map(|c| c.due_ms)
                .min()
                .filter(|&t| t <= target);
            let next_tick = self
                .is_running()
                .then_some(self.last_tick_ms + tick_ms)
                .filter(|&t| t <= target);

            match (next_clear, next_tick) {
                (Some(due), tick_at) if tick_at.map_or(true, |t| due <= t) => {
                    self.clock_ms = self.clock_ms.max(due);
                    events.extend(self.clear_due(due));
                }
                (_, Some(tick_at)) => {
                    if ticks == MAX_CATCHUP_TICKS {
                        log::warn!(
                            "Dropping {}ms of tick backlog",
                            target.saturating_sub(tick_at)
                        );
                        self.last_tick_ms = target;
                        continue;
                    }
                    self.clock_ms = tick_at;
                    events.extend(self.tick());
                    ticks += 1;
                }
                (_, None) => break,
            }
        }

        self.clock_ms = target;
        events
    }

    fn clear_due(&mut self, now_ms: u64) -> Vec<GameEvent> {
        let (due, pending): (Vec<PendingClear>, Vec<PendingClear>) = self
            .pending_clears
            .drain(..)
            .partition(|c| c.due_ms <= now_ms);
        self.pending_clears = pending;

        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };
        due.into_iter()
            .filter(|c| state.clear_explosion(c.generation))
            .map(|c| GameEvent::ExplosionCleared {
                generation: c.generation,
            })
            .collect()
    }

    fn notify_host(&mut self) {
        if self.notified {
            return;
        }
        match self.phase() {
            GamePhase::Won => {
                self.notified = true;
                log::info!("Session {} won", self.sessions_started);
                self.host.on_win();
            }
            GamePhase::Lost => {
                self.notified = true;
                log::info!("Session {} lost", self.sessions_started);
                self.host.on_game_over();
            }
            GamePhase::Initializing | GamePhase::Running => {}
        }
    }
}
