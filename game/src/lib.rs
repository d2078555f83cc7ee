pub mod board;
pub mod catalog;
pub mod config;
pub mod error;
pub mod input_adapter;
pub mod logic;
pub mod phase;
pub mod piece;
pub mod session;
pub mod tetris_core;

pub use board::{Board, Cell};
pub use catalog::{ColorId, ColorMode, PieceCatalog, PieceKind};
pub use config::{ConfigStore, EngineConfig};
pub use error::ConfigError;
pub use phase::Phase;
pub use session::TetrisSession;
pub use tetris_core::{EngineEvent, TetrisCore, TetrisSnapshot};
