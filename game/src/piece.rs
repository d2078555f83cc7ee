use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::catalog::{ColorId, PieceKind};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

impl Vec2i {
    pub const ZERO: Vec2i = Vec2i { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2i {
    type Output = Vec2i;

    fn add(self, rhs: Vec2i) -> Self::Output {
        Vec2i::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HorizontalDir {
    Left,
    Right,
}

impl HorizontalDir {
    pub fn dx(self) -> i32 {
        match self {
            HorizontalDir::Left => -1,
            HorizontalDir::Right => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RotationDir {
    Cw,
    Ccw,
}

impl RotationDir {
    /// Positive is clockwise, negative counter-clockwise, zero is no rotation.
    pub fn from_sign(dir: i32) -> Option<Self> {
        match dir.signum() {
            1 => Some(RotationDir::Cw),
            -1 => Some(RotationDir::Ccw),
            _ => None,
        }
    }

    pub fn inverse(self) -> Self {
        match self {
            RotationDir::Cw => RotationDir::Ccw,
            RotationDir::Ccw => RotationDir::Cw,
        }
    }
}

/// Square occupancy grid, row-major with y growing downwards.
/// 0 is empty, anything else is the piece marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct ShapeMatrix {
    cells: Vec<Vec<u8>>,
}

impl ShapeMatrix {
    /// Rotation is a transpose plus a reversal, which only stays a rotation
    /// on square grids, so anything else is refused here.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, ConfigError> {
        if rows.is_empty() {
            return Err(ConfigError::EmptyShape);
        }
        if let Some(bad) = rows.iter().find(|row| row.len() != rows.len()) {
            return Err(ConfigError::NonSquareShape {
                rows: rows.len(),
                cols: bad.len(),
            });
        }
        Ok(Self { cells: rows })
    }

    pub(crate) fn from_static<const N: usize>(rows: &[[u8; N]; N]) -> Self {
        Self {
            cells: rows.iter().map(|row| row.to_vec()).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Column count of the bounding box, used to centre a spawn.
    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.cells
    }

    pub fn cell(&self, x: usize, y: usize) -> u8 {
        self.cells
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(0)
    }

    /// `(x, y, marker)` for every occupied cell, relative to the top-left.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, v)| **v != 0)
                .map(move |(x, v)| (x, y, *v))
        })
    }

    pub fn rotate(&mut self, dir: RotationDir) {
        let n = self.cells.len();
        for y in 0..n {
            for x in 0..y {
                let upper = self.cells[x][y];
                self.cells[x][y] = self.cells[y][x];
                self.cells[y][x] = upper;
            }
        }
        match dir {
            RotationDir::Cw => self.cells.iter_mut().for_each(|row| row.reverse()),
            RotationDir::Ccw => self.cells.reverse(),
        }
    }

    pub fn rotated(&self, dir: RotationDir) -> Self {
        let mut out = self.clone();
        out.rotate(dir);
        out
    }
}

impl TryFrom<Vec<Vec<u8>>> for ShapeMatrix {
    type Error = ConfigError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<ShapeMatrix> for Vec<Vec<u8>> {
    fn from(shape: ShapeMatrix) -> Self {
        shape.cells
    }
}

/// The falling, player-controlled piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
    /// Board coordinates of the shape's top-left corner.
    pub pos: Vec2i,
    pub color: ColorId,
}

impl ActivePiece {
    pub fn width(&self) -> usize {
        self.shape.width()
    }

    /// Absolute board coordinates of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = Vec2i> + '_ {
        self.shape
            .occupied()
            .map(|(x, y, _)| self.pos + Vec2i::new(x as i32, y as i32))
    }
}
