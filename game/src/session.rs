use std::fmt;
use std::time::Duration;

use engine::{DeltaSource, HeadlessRunner, History, InputSender};

use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::input_adapter::{InputAction, InputIntent, MappedInput, RawInput, map_input};
use crate::logic::TetrisLogic;
use crate::tetris_core::{EngineEvent, TetrisCore, TetrisSnapshot};

pub type GameOverHandler = Box<dyn FnMut(&TetrisSnapshot) + Send>;

/// Host-facing wrapper: owns the runner, routes raw input, and calls the
/// game-over handler once the post-game delay has run out.
pub struct TetrisSession {
    runner: HeadlessRunner<TetrisLogic>,
    on_game_over: Option<GameOverHandler>,
    history: Option<History<TetrisSnapshot>>,
    menu_requested: bool,
}

impl fmt::Debug for TetrisSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TetrisSession")
            .field("frame", &self.runner.frame())
            .field("phase", &self.runner.state().phase())
            .field("stopped", &self.runner.is_stopped())
            .field("has_game_over_handler", &self.on_game_over.is_some())
            .finish()
    }
}

impl TetrisSession {
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        let runner = HeadlessRunner::new(TetrisLogic::new(config, seed)?);
        log::info!("session started (seed {seed})");
        Ok(Self {
            runner,
            on_game_over: None,
            history: None,
            menu_requested: false,
        })
    }

    /// Keep the last `capacity` per-frame snapshots for replay tooling.
    pub fn with_history(mut self, capacity: usize) -> Self {
        self.history = Some(History::new(self.snapshot(), capacity));
        self
    }

    pub fn set_game_over_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&TetrisSnapshot) + Send + 'static,
    {
        self.on_game_over = Some(Box::new(handler));
    }

    pub fn clear_game_over_handler(&mut self) {
        self.on_game_over = None;
    }

    pub fn core(&self) -> &TetrisCore {
        self.runner.state()
    }

    /// Immediate access to the core, bypassing the input queue.
    pub fn core_mut(&mut self) -> &mut TetrisCore {
        self.runner.state_mut()
    }

    pub fn snapshot(&self) -> TetrisSnapshot {
        self.runner.state().snapshot()
    }

    pub fn history(&self) -> Option<&History<TetrisSnapshot>> {
        self.history.as_ref()
    }

    pub fn frame_count(&self) -> u64 {
        self.runner.frame()
    }

    pub fn is_stopped(&self) -> bool {
        self.runner.is_stopped()
    }

    /// A handle other threads can queue intents through. It stops working
    /// once the session is stopped.
    pub fn sender(&self) -> InputSender<InputIntent> {
        self.runner.sender()
    }

    pub fn push(&self, intent: InputIntent) -> bool {
        self.runner.push(intent)
    }

    /// Translate a raw key or touch input for the current phase and queue the
    /// resulting intent for the next frame.
    pub fn handle_input(&mut self, input: RawInput) -> MappedInput {
        let mapped = map_input(input, self.runner.state().phase());
        match mapped.action {
            InputAction::Intent(intent) => {
                self.runner.push(intent);
            }
            InputAction::ReturnToMenu => {
                log::info!("return to menu requested");
                self.menu_requested = true;
            }
            InputAction::Ignored => {}
        }
        mapped
    }

    /// True once after the player asked to leave a finished game.
    pub fn take_menu_request(&mut self) -> bool {
        std::mem::take(&mut self.menu_requested)
    }

    pub fn frame(&mut self, dt: Duration) -> Vec<EngineEvent> {
        let events = self.runner.step(dt);
        if events.contains(&EngineEvent::GameOverNotice) {
            let snapshot = self.snapshot();
            if let Some(handler) = self.on_game_over.as_mut() {
                handler(&snapshot);
            }
        }
        if !self.runner.is_stopped() {
            if let Some(history) = self.history.as_mut() {
                history.record(self.runner.state().snapshot());
            }
        }
        events
    }

    pub fn run_frame<C: DeltaSource>(&mut self, clock: &mut C) -> Vec<EngineEvent> {
        let dt = clock.delta();
        self.frame(dt)
    }

    /// Start a new game in place. Queued intents and senders stay valid.
    /// A stopped session stays stopped: the board is reset but frames and
    /// inputs are still refused.
    pub fn restart(&mut self) {
        self.menu_requested = false;
        self.runner.state_mut().restart();
        if let Some(history) = self.history.as_mut() {
            let capacity = history.capacity();
            *history = History::new(self.runner.state().snapshot(), capacity);
        }
        log::info!("session restarted");
    }

    /// Detach input handlers and freeze the game.
    pub fn stop(&mut self) {
        self.runner.stop();
    }
}
