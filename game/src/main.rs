use std::collections::VecDeque;
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use engine::FixedStep;
use tetris::config::ConfigStore;
use tetris::input_adapter::InputIntent;
use tetris::piece::{HorizontalDir, RotationDir};
use tetris::session::TetrisSession;
use tetris::tetris_core::{DropResult, EngineEvent, TetrisCore};

const FPS: u32 = 60;
const MAX_FRAMES: u64 = 60 * 60 * 10;
const HISTORY_FRAMES: usize = 600;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let store = ConfigStore::from_env();
    let config = store.load_or_default();
    let seed = seed_from_env();
    log::info!("config {} seed {seed}", store.path().display());

    let mut session = TetrisSession::new(config, seed)?.with_history(HISTORY_FRAMES);
    let finished = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&finished);
    session.set_game_over_handler(move |snapshot| {
        log::info!(
            "game over: score {} lines {}",
            snapshot.score,
            snapshot.lines_cleared
        );
        flag.store(true, Ordering::SeqCst);
    });

    let mut clock = FixedStep::from_fps(FPS);
    let mut plan: VecDeque<InputIntent> = VecDeque::new();
    let mut needs_plan = false;
    while !finished.load(Ordering::SeqCst) && session.frame_count() < MAX_FRAMES {
        // Pieces spawned during the countdown cannot be moved yet.
        if needs_plan && session.core().phase().is_running() {
            plan = plan_placement(session.core());
            needs_plan = false;
        }
        if let Some(intent) = plan.pop_front() {
            session.push(intent);
        } else if session.core().phase().is_running() {
            session.push(InputIntent::SoftDrop);
        }

        let events = session.run_frame(&mut clock);
        if events
            .iter()
            .any(|e| matches!(e, EngineEvent::Spawned { .. }))
        {
            plan.clear();
            needs_plan = true;
        }
    }
    session.stop();

    let snapshot = session.snapshot();
    log::info!(
        "finished after {} frames in {:?}: score {} lines {}",
        session.frame_count(),
        snapshot.phase,
        snapshot.score,
        snapshot.lines_cleared
    );

    if let Some(path) = std::env::var_os("TETRIS_HISTORY_PATH") {
        if let Some(history) = session.history() {
            history.save_json_file(&path)?;
            log::info!("saved {} snapshots", history.len());
        }
    }
    Ok(())
}

fn seed_from_env() -> u64 {
    std::env::var("TETRIS_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        })
}

/// Try every rotation and column on a copy of the core and return the
/// inputs for the placement that leaves the flattest board.
fn plan_placement(core: &TetrisCore) -> VecDeque<InputIntent> {
    let Some(piece) = core.active_piece() else {
        return VecDeque::new();
    };
    let width = core.board().width() as i32;
    let start_x = piece.pos.x;

    let mut best: Option<(i64, VecDeque<InputIntent>)> = None;
    for turns in 0..4 {
        for target_x in -3..width {
            let mut trial = core.clone();
            let mut inputs = VecDeque::new();
            if !(0..turns).all(|_| trial.rotate_piece(RotationDir::Cw)) {
                continue;
            }
            inputs.extend(std::iter::repeat_n(InputIntent::RotateCw, turns));

            let (intent, dir) = if target_x < start_x {
                (InputIntent::MoveLeft, HorizontalDir::Left)
            } else {
                (InputIntent::MoveRight, HorizontalDir::Right)
            };
            let steps = (target_x - start_x).unsigned_abs() as usize;
            if !(0..steps).all(|_| trial.move_piece(dir)) {
                continue;
            }
            inputs.extend(std::iter::repeat_n(intent, steps));

            let cleared = loop {
                match trial.soft_drop() {
                    DropResult::Moved => {}
                    DropResult::Locked(report) => break report.rows_cleared,
                    DropResult::Ignored => break 0,
                }
            };

            let score = placement_score(&trial, cleared);
            if best.as_ref().is_none_or(|(s, _)| score > *s) {
                best = Some((score, inputs));
            }
        }
    }
    best.map(|(_, inputs)| inputs).unwrap_or_default()
}

fn placement_score(core: &TetrisCore, cleared: usize) -> i64 {
    if core.is_game_over() {
        return i64::MIN;
    }
    let board = core.board();
    let mut aggregate_height = 0i64;
    let mut holes = 0i64;
    for x in 0..board.width() {
        let mut seen_block = false;
        for (y, row) in board.rows().iter().enumerate() {
            match (row[x].is_some(), seen_block) {
                (true, false) => {
                    seen_block = true;
                    aggregate_height += (board.height() - y) as i64;
                }
                (false, true) => holes += 1,
                _ => {}
            }
        }
    }
    cleared as i64 * 100 - aggregate_height - holes * 30
}
