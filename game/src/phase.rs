use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Seconds left before play starts.
    Countdown { remaining: u32 },
    Running,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseEvent {
    /// One second of countdown elapsed.
    CountdownTick,
    TogglePause,
    /// A freshly spawned piece had nowhere to go.
    SpawnBlocked,
}

impl Phase {
    pub fn initial(countdown_secs: u32) -> Self {
        if countdown_secs == 0 {
            Phase::Running
        } else {
            Phase::Countdown {
                remaining: countdown_secs,
            }
        }
    }

    /// Pure transition function. Events that make no sense in the current
    /// phase leave it unchanged.
    pub fn handle(self, event: PhaseEvent) -> Phase {
        match (self, event) {
            (Phase::GameOver, _) => Phase::GameOver,
            (_, PhaseEvent::SpawnBlocked) => Phase::GameOver,

            (Phase::Countdown { remaining }, PhaseEvent::CountdownTick) => {
                if remaining > 1 {
                    Phase::Countdown {
                        remaining: remaining - 1,
                    }
                } else {
                    Phase::Running
                }
            }

            (Phase::Running, PhaseEvent::TogglePause) => Phase::Paused,
            (Phase::Paused, PhaseEvent::TogglePause) => Phase::Running,

            (phase, _) => phase,
        }
    }

    /// Gravity runs and the piece accepts commands.
    pub fn is_running(self) -> bool {
        matches!(self, Phase::Running)
    }

    pub fn is_game_over(self) -> bool {
        matches!(self, Phase::GameOver)
    }

    pub fn countdown_remaining(self) -> Option<u32> {
        match self {
            Phase::Countdown { remaining } => Some(remaining),
            _ => None,
        }
    }
}
