use std::time::Duration;

use engine::Delay;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell};
use crate::catalog::{ColorId, PieceCatalog, PieceKind};
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::phase::{Phase, PhaseEvent};
use crate::piece::{ActivePiece, HorizontalDir, RotationDir, ShapeMatrix, Vec2i};

pub const LINE_CLEAR_BASE_POINTS: u32 = 10;
pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

pub type DefaultRng = Xoshiro256PlusPlus;

/// The piece waiting in the preview slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextPiece {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
    pub color: ColorId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    Spawned { kind: PieceKind },
    Locked { kind: PieceKind, pos: Vec2i },
    RowsCleared { rows: usize, points: u32 },
    PhaseChanged { from: Phase, to: Phase },
    /// The post-game-over delay ran out; the host may leave the board now.
    GameOverNotice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockReport {
    pub rows_cleared: usize,
    pub points: u32,
    /// The replacement piece could not be placed.
    pub topped_out: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropResult {
    Ignored,
    Moved,
    Locked(LockReport),
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TetrisSnapshot {
    pub board: Board,
    pub active: Option<ActivePiece>,
    pub next: Option<NextPiece>,
    pub score: u32,
    pub lines_cleared: u32,
    pub phase: Phase,
}

impl TetrisSnapshot {
    /// Seconds left before play starts, while counting down.
    pub fn countdown_remaining(&self) -> Option<u32> {
        self.phase.countdown_remaining()
    }
}

/// Falling-block game state and rules.
///
/// Every command is total: anything illegal in the current phase, or that
/// would collide, leaves the state untouched. Only construction can fail.
#[derive(Debug, Clone)]
pub struct TetrisCore<R = DefaultRng> {
    config: EngineConfig,
    catalog: PieceCatalog,
    board: Board,
    active: Option<ActivePiece>,
    next: Option<NextPiece>,
    phase: Phase,
    score: u32,
    lines_cleared: u32,
    drop_counter: Duration,
    countdown: Delay,
    game_over_notice: Delay,
    /// Set when the game ends; the frame that ended it does not count
    /// towards the notice delay.
    just_ended: bool,
    rng: R,
    events: Vec<EngineEvent>,
}

impl TetrisCore<DefaultRng> {
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, DefaultRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TetrisCore<R> {
    pub fn with_rng(config: EngineConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = config.catalog()?;
        let board = Board::new(config.width, config.height)?;
        let mut core = Self {
            phase: Phase::initial(config.countdown_secs),
            countdown: Delay::new(COUNTDOWN_STEP),
            game_over_notice: Delay::new(config.game_over_delay()),
            just_ended: false,
            config,
            catalog,
            board,
            active: None,
            next: None,
            score: 0,
            lines_cleared: 0,
            drop_counter: Duration::ZERO,
            rng,
            events: Vec::new(),
        };
        core.start_game();
        Ok(core)
    }

    /// Throw the current game away and start a fresh one with the same
    /// configuration. The random stream carries on.
    pub fn restart(&mut self) {
        self.board.clear();
        self.start_game();
    }

    fn start_game(&mut self) {
        self.active = None;
        self.next = None;
        self.score = 0;
        self.lines_cleared = 0;
        self.drop_counter = Duration::ZERO;
        self.countdown.reset();
        self.game_over_notice.reset();
        self.just_ended = false;

        let from = self.phase;
        self.phase = Phase::initial(self.config.countdown_secs);
        if from != self.phase {
            self.events.push(EngineEvent::PhaseChanged {
                from,
                to: self.phase,
            });
        }
        if self.config.preview_next {
            self.next = Some(self.draw_piece());
        }
        log::info!(
            "new game on {}x{} board, starting {:?}",
            self.board.width(),
            self.board.height(),
            self.phase
        );
        self.spawn_piece();
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PieceCatalog {
        &self.catalog
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_piece(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn next_piece(&self) -> Option<&NextPiece> {
        self.next.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase.is_game_over()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    /// Time accumulated towards the next gravity step.
    pub fn drop_counter(&self) -> Duration {
        self.drop_counter
    }

    pub fn snapshot(&self) -> TetrisSnapshot {
        TetrisSnapshot {
            board: self.board.clone(),
            active: self.active.clone(),
            next: self.next.clone(),
            score: self.score,
            lines_cleared: self.lines_cleared,
            phase: self.phase,
        }
    }

    /// Locked cells with the active piece drawn on top.
    pub fn board_with_active_piece(&self) -> Vec<Vec<Cell>> {
        let mut rows = self.board.rows().to_vec();
        if let Some(piece) = &self.active {
            for cell in piece.cells() {
                if let (Ok(x), Ok(y)) = (usize::try_from(cell.x), usize::try_from(cell.y)) {
                    if let Some(slot) = rows.get_mut(y).and_then(|row| row.get_mut(x)) {
                        *slot = Some(piece.color);
                    }
                }
            }
        }
        rows
    }

    /// Events recorded since the last call, oldest first. Hosts that drive
    /// the core directly should drain this every frame.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_cell(&mut self, x: usize, y: usize, value: Cell) {
        self.board.set_cell(x, y, value);
    }

    pub fn set_active_piece_for_test(&mut self, kind: PieceKind, pos: Vec2i) {
        let color = self.catalog.color_for(kind, &mut self.rng);
        self.active = Some(ActivePiece {
            kind,
            shape: kind.shape(),
            pos,
            color,
        });
    }

    /// Advance the clocks by one frame's worth of time. The tick that follows
    /// the end of a game is spent showing the final board; the notice delay
    /// starts counting on the one after.
    pub fn tick(&mut self, dt: Duration) {
        let just_ended = std::mem::take(&mut self.just_ended);
        match self.phase {
            Phase::GameOver if just_ended => {}
            Phase::GameOver => {
                if self.game_over_notice.tick(dt) {
                    log::info!("game over notice (score {})", self.score);
                    self.events.push(EngineEvent::GameOverNotice);
                }
            }
            Phase::Countdown { .. } => self.advance_countdown(dt),
            Phase::Paused => {}
            Phase::Running => {
                self.drop_counter = self.drop_counter.saturating_add(dt);
                if self.drop_counter > self.config.drop_interval() {
                    self.drop_counter = Duration::ZERO;
                    self.step_down();
                }
            }
        }
        // A game ended by gravity has already had its frame.
        self.just_ended = false;
    }

    fn advance_countdown(&mut self, dt: Duration) {
        let mut fired = self.countdown.tick(dt);
        while fired {
            self.countdown.rearm();
            self.transition(PhaseEvent::CountdownTick);
            if !matches!(self.phase, Phase::Countdown { .. }) {
                self.countdown.reset();
                break;
            }
            fired = self.countdown.tick(Duration::ZERO);
        }
    }

    pub fn move_piece(&mut self, dir: HorizontalDir) -> bool {
        if !self.phase.is_running() {
            return false;
        }
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        let target = piece.pos + Vec2i::new(dir.dx(), 0);
        if self.board.collides(&piece.shape, target) {
            return false;
        }
        piece.pos = target;
        true
    }

    pub fn rotate_piece(&mut self, dir: RotationDir) -> bool {
        if !self.phase.is_running() {
            return false;
        }
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        let rotated = piece.shape.rotated(dir);
        if self.board.collides(&rotated, piece.pos) {
            return false;
        }
        piece.shape = rotated;
        true
    }

    /// Player-requested one-row drop. Leaves the gravity counter alone.
    pub fn soft_drop(&mut self) -> DropResult {
        if !self.phase.is_running() {
            return DropResult::Ignored;
        }
        self.step_down()
    }

    pub fn toggle_pause(&mut self) -> bool {
        if !matches!(self.phase, Phase::Running | Phase::Paused) {
            return false;
        }
        self.transition(PhaseEvent::TogglePause);
        true
    }

    fn step_down(&mut self) -> DropResult {
        let Some(piece) = self.active.as_mut() else {
            return DropResult::Ignored;
        };
        let below = piece.pos + Vec2i::new(0, 1);
        if !self.board.collides(&piece.shape, below) {
            piece.pos = below;
            return DropResult::Moved;
        }
        self.lock_active_piece()
    }

    fn lock_active_piece(&mut self) -> DropResult {
        let Some(piece) = self.active.take() else {
            return DropResult::Ignored;
        };
        self.board.merge(&piece);
        self.events.push(EngineEvent::Locked {
            kind: piece.kind,
            pos: piece.pos,
        });

        let rows_cleared = self.board.clear_rows();
        let points = line_clear_points(rows_cleared);
        if rows_cleared > 0 {
            self.score = self.score.saturating_add(points);
            self.lines_cleared = self
                .lines_cleared
                .saturating_add(u32::try_from(rows_cleared).unwrap_or(u32::MAX));
            self.events.push(EngineEvent::RowsCleared {
                rows: rows_cleared,
                points,
            });
            log::debug!(
                "cleared {rows_cleared} rows for {points} points (score {})",
                self.score
            );
        }

        let topped_out = !self.spawn_piece();
        DropResult::Locked(LockReport {
            rows_cleared,
            points,
            topped_out,
        })
    }

    fn draw_piece(&mut self) -> NextPiece {
        let (kind, shape) = self.catalog.random_piece_shape(&mut self.rng);
        let color = self.catalog.color_for(kind, &mut self.rng);
        NextPiece { kind, shape, color }
    }

    /// Promote the preview (or draw fresh), refill the preview and place the
    /// piece top-centre. Returns `false` and ends the game when it collides.
    fn spawn_piece(&mut self) -> bool {
        let fresh = match self.next.take() {
            Some(next) => next,
            None => self.draw_piece(),
        };
        if self.config.preview_next {
            self.next = Some(self.draw_piece());
        }

        let spare = self.board.width() as i32 - fresh.shape.width() as i32;
        let piece = ActivePiece {
            kind: fresh.kind,
            shape: fresh.shape,
            pos: Vec2i::new(spare.div_euclid(2), 0),
            color: fresh.color,
        };

        if self.board.collides(&piece.shape, piece.pos) {
            log::debug!("spawn of {:?} blocked at {:?}", piece.kind, piece.pos);
            self.transition(PhaseEvent::SpawnBlocked);
            return false;
        }

        self.events.push(EngineEvent::Spawned { kind: piece.kind });
        self.active = Some(piece);
        true
    }

    fn transition(&mut self, event: PhaseEvent) {
        let from = self.phase;
        let to = from.handle(event);
        if from == to {
            return;
        }
        self.phase = to;
        self.events.push(EngineEvent::PhaseChanged { from, to });
        log::info!("phase {from:?} -> {to:?}");
        if to.is_game_over() {
            self.active = None;
            self.game_over_notice.reset();
            self.just_ended = true;
        }
    }
}

/// 10 points for the first row of a clear, doubling for each further row
/// of the same clear.
pub fn line_clear_points(rows: usize) -> u32 {
    let mut total = 0u32;
    let mut row_value = LINE_CLEAR_BASE_POINTS;
    for _ in 0..rows {
        total = total.saturating_add(row_value);
        row_value = row_value.saturating_mul(2);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_clear_points_double_per_row() {
        assert_eq!(line_clear_points(0), 0);
        assert_eq!(line_clear_points(1), 10);
        assert_eq!(line_clear_points(2), 30);
        assert_eq!(line_clear_points(3), 70);
        assert_eq!(line_clear_points(4), 150);
    }

    #[test]
    fn line_clear_points_saturate() {
        assert_eq!(line_clear_points(64), u32::MAX);
    }

    #[test]
    fn restart_clears_board_and_score() {
        let mut core = TetrisCore::new(EngineConfig::classic(), 3).expect("core");
        core.set_cell(0, 19, Some(ColorId::new(1)));
        core.score = 40;
        core.drain_events();

        core.restart();
        assert_eq!(core.board().filled_cells(), 0);
        assert_eq!(core.score(), 0);
        assert!(core.active_piece().is_some());
        assert!(matches!(
            core.drain_events().as_slice(),
            [EngineEvent::Spawned { .. }]
        ));
    }
}
