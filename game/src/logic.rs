use engine::{Frame, GameLogic};

use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::input_adapter::InputIntent;
use crate::tetris_core::{DropResult, EngineEvent, TetrisCore};

/// Applies one intent. Returns whether it changed anything.
pub fn apply_intent(core: &mut TetrisCore, intent: InputIntent) -> bool {
    match intent {
        InputIntent::MoveLeft | InputIntent::MoveRight => intent
            .horizontal()
            .is_some_and(|dir| core.move_piece(dir)),
        InputIntent::RotateCcw | InputIntent::RotateCw => intent
            .rotation()
            .is_some_and(|dir| core.rotate_piece(dir)),
        InputIntent::SoftDrop => core.soft_drop() != DropResult::Ignored,
        InputIntent::TogglePause => core.toggle_pause(),
    }
}

/// The game as seen by [`engine::HeadlessRunner`].
#[derive(Debug, Clone)]
pub struct TetrisLogic {
    fresh: TetrisCore,
}

impl TetrisLogic {
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            fresh: TetrisCore::new(config, seed)?,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        self.fresh.config()
    }
}

impl GameLogic for TetrisLogic {
    type State = TetrisCore;
    type Input = InputIntent;
    type Event = EngineEvent;

    fn initial_state(&self) -> TetrisCore {
        self.fresh.clone()
    }

    fn update(&self, core: &mut TetrisCore, frame: Frame<InputIntent>) -> Vec<EngineEvent> {
        for intent in frame.inputs {
            apply_intent(core, intent);
        }
        core.tick(frame.dt);
        core.drain_events()
    }
}
