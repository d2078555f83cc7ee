use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::piece::ShapeMatrix;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PieceKind {
    T,
    O,
    I,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::T,
        PieceKind::O,
        PieceKind::I,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Non-zero value stored in this piece's shape matrix.
    pub const fn marker(self) -> u8 {
        match self {
            PieceKind::T => 1,
            PieceKind::O => 2,
            PieceKind::I => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
        }
    }

    /// Fresh copy of the spawn orientation.
    pub fn shape(self) -> ShapeMatrix {
        match self {
            PieceKind::T => ShapeMatrix::from_static(&[
                [0, 0, 0], //
                [1, 1, 1], //
                [0, 1, 0], //
            ]),
            PieceKind::O => ShapeMatrix::from_static(&[
                [2, 2], //
                [2, 2], //
            ]),
            PieceKind::I => ShapeMatrix::from_static(&[
                [0, 3, 0, 0], //
                [0, 3, 0, 0], //
                [0, 3, 0, 0], //
                [0, 3, 0, 0], //
            ]),
            PieceKind::S => ShapeMatrix::from_static(&[
                [0, 4, 4], //
                [4, 4, 0], //
                [0, 0, 0], //
            ]),
            PieceKind::Z => ShapeMatrix::from_static(&[
                [5, 5, 0], //
                [0, 5, 5], //
                [0, 0, 0], //
            ]),
            PieceKind::J => ShapeMatrix::from_static(&[
                [6, 0, 0], //
                [6, 6, 6], //
                [0, 0, 0], //
            ]),
            PieceKind::L => ShapeMatrix::from_static(&[
                [0, 0, 7], //
                [7, 7, 7], //
                [0, 0, 0], //
            ]),
        }
    }
}

/// 24-bit RGB colour stored in locked cells.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ColorId(u32);

impl ColorId {
    pub const MAX: u32 = 0x00FF_FFFF;

    pub const fn new(rgb: u32) -> Self {
        Self(rgb & Self::MAX)
    }

    pub const fn rgb(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// Default palette, indexed by shape marker.
pub const PALETTE: [ColorId; 8] = [
    ColorId::new(0x000000),
    ColorId::new(0xFF0D72),
    ColorId::new(0x0DC2FF),
    ColorId::new(0x0DFF72),
    ColorId::new(0xF538FF),
    ColorId::new(0xFF8E0D),
    ColorId::new(0xFFE138),
    ColorId::new(0x3877FF),
];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// A uniformly random colour for every spawned piece.
    #[default]
    Random,
    /// The palette entry of the piece's marker.
    Palette,
}

/// Immutable pool of pieces the engine draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceCatalog {
    kinds: Vec<PieceKind>,
    color_mode: ColorMode,
}

impl PieceCatalog {
    pub fn standard() -> Self {
        Self {
            kinds: PieceKind::ALL.to_vec(),
            color_mode: ColorMode::default(),
        }
    }

    pub fn new(kinds: Vec<PieceKind>, color_mode: ColorMode) -> Result<Self, ConfigError> {
        if kinds.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        Ok(Self { kinds, color_mode })
    }

    pub fn kinds(&self) -> &[PieceKind] {
        &self.kinds
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Largest bounding box in the pool.
    pub fn max_shape_size(&self) -> usize {
        self.kinds
            .iter()
            .map(|kind| kind.shape().size())
            .max()
            .unwrap_or(0)
    }

    /// Uniform choice over the pool; the returned matrix is the caller's own.
    pub fn random_piece_shape<R: Rng>(&self, rng: &mut R) -> (PieceKind, ShapeMatrix) {
        let kind = self.kinds[rng.random_range(0..self.kinds.len())];
        (kind, kind.shape())
    }

    pub fn random_color_identity<R: Rng>(rng: &mut R) -> ColorId {
        ColorId::new(rng.random_range(0..=ColorId::MAX))
    }

    pub fn color_for<R: Rng>(&self, kind: PieceKind, rng: &mut R) -> ColorId {
        match self.color_mode {
            ColorMode::Random => Self::random_color_identity(rng),
            ColorMode::Palette => PALETTE[kind.marker() as usize],
        }
    }
}

impl Default for PieceCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
