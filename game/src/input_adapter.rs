use serde::{Deserialize, Serialize};
use winit::event::VirtualKeyCode;

use crate::phase::Phase;
use crate::piece::{HorizontalDir, RotationDir};

/// Gameplay command understood by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputIntent {
    MoveLeft,
    MoveRight,
    SoftDrop,
    RotateCcw,
    RotateCw,
    TogglePause,
}

impl InputIntent {
    pub fn horizontal(self) -> Option<HorizontalDir> {
        match self {
            InputIntent::MoveLeft => Some(HorizontalDir::Left),
            InputIntent::MoveRight => Some(HorizontalDir::Right),
            _ => None,
        }
    }

    pub fn rotation(self) -> Option<RotationDir> {
        match self {
            InputIntent::RotateCcw => Some(RotationDir::Ccw),
            InputIntent::RotateCw => Some(RotationDir::Cw),
            _ => None,
        }
    }
}

/// On-screen controls, left to right as they are laid out under the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TouchButton {
    Left,
    RotateCcw,
    Drop,
    RotateCw,
    Right,
    Pause,
}

impl TouchButton {
    pub const ALL: [TouchButton; 6] = [
        TouchButton::Left,
        TouchButton::RotateCcw,
        TouchButton::Drop,
        TouchButton::RotateCw,
        TouchButton::Right,
        TouchButton::Pause,
    ];

    pub fn intent(self) -> InputIntent {
        match self {
            TouchButton::Left => InputIntent::MoveLeft,
            TouchButton::RotateCcw => InputIntent::RotateCcw,
            TouchButton::Drop => InputIntent::SoftDrop,
            TouchButton::RotateCw => InputIntent::RotateCw,
            TouchButton::Right => InputIntent::MoveRight,
            TouchButton::Pause => InputIntent::TogglePause,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    Key(VirtualKeyCode),
    Touch(TouchButton),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Intent(InputIntent),
    /// Leave the finished board for the host's menu.
    ReturnToMenu,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedInput {
    pub action: InputAction,
    /// The host should swallow the platform default (page scrolling etc).
    pub suppress_default: bool,
}

pub fn map_key_to_intent(key: VirtualKeyCode) -> Option<InputIntent> {
    match key {
        VirtualKeyCode::Left => Some(InputIntent::MoveLeft),
        VirtualKeyCode::Right => Some(InputIntent::MoveRight),
        VirtualKeyCode::Down => Some(InputIntent::SoftDrop),
        VirtualKeyCode::Z => Some(InputIntent::RotateCcw),
        VirtualKeyCode::X | VirtualKeyCode::Up => Some(InputIntent::RotateCw),
        VirtualKeyCode::P | VirtualKeyCode::Escape => Some(InputIntent::TogglePause),
        _ => None,
    }
}

/// Keys the game owns regardless of phase.
pub fn claims_key(key: VirtualKeyCode) -> bool {
    map_key_to_intent(key).is_some() || matches!(key, VirtualKeyCode::Return)
}

pub fn map_input(input: RawInput, phase: Phase) -> MappedInput {
    let suppress_default = match input {
        RawInput::Key(key) => claims_key(key),
        RawInput::Touch(_) => true,
    };

    let action = if phase.is_game_over() {
        match input {
            RawInput::Key(VirtualKeyCode::Return | VirtualKeyCode::Escape)
            | RawInput::Touch(TouchButton::Pause) => InputAction::ReturnToMenu,
            _ => InputAction::Ignored,
        }
    } else {
        let intent = match input {
            RawInput::Key(key) => map_key_to_intent(key),
            RawInput::Touch(button) => Some(button.intent()),
        };
        intent.map_or(InputAction::Ignored, InputAction::Intent)
    };

    MappedInput {
        action,
        suppress_default,
    }
}
