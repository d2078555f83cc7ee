use serde::{Deserialize, Serialize};

use crate::catalog::ColorId;
use crate::error::ConfigError;
use crate::piece::{ActivePiece, ShapeMatrix, Vec2i};

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;
/// Upper bound for either board dimension.
pub const MAX_BOARD_DIMENSION: usize = 1024;

/// `None` is an empty cell, `Some` holds the colour of one locked piece cell.
pub type Cell = Option<ColorId>;

/// Fixed-size arena of locked cells. Row 0 is the top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell>>,
}

#[derive(Deserialize)]
struct RawBoard {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell>>,
}

impl TryFrom<RawBoard> for Board {
    type Error = ConfigError;

    fn try_from(raw: RawBoard) -> Result<Self, Self::Error> {
        check_dimensions(raw.width, raw.height)?;
        if raw.rows.len() != raw.height || raw.rows.iter().any(|row| row.len() != raw.width) {
            return Err(ConfigError::MalformedBoard {
                width: raw.width,
                height: raw.height,
                rows: raw.rows.len(),
            });
        }
        Ok(Self {
            width: raw.width,
            height: raw.height,
            rows: raw.rows,
        })
    }
}

pub(crate) fn check_dimensions(width: usize, height: usize) -> Result<(), ConfigError> {
    let in_range = |n: usize| (1..=MAX_BOARD_DIMENSION).contains(&n);
    if in_range(width) && in_range(height) {
        Ok(())
    } else {
        Err(ConfigError::InvalidDimensions { width, height })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty(BOARD_WIDTH, BOARD_HEIGHT)
    }
}

impl Board {
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        check_dimensions(width, height)?;
        Ok(Self::empty(width, height))
    }

    fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: vec![vec![None; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// `None` for coordinates off the board as well as for empty cells.
    pub fn cell(&self, x: i32, y: i32) -> Cell {
        let (x, y) = self.index(x, y)?;
        self.rows[y][x]
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(Option::is_some))
    }

    pub fn filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(None);
        }
    }

    /// Overwrite one cell. Used to build fixtures and by tooling; gameplay
    /// only goes through [`Board::merge`] and [`Board::clear_rows`].
    pub fn set_cell(&mut self, x: usize, y: usize, value: Cell) {
        if y < self.height && x < self.width {
            self.rows[y][x] = value;
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// True when any occupied cell of `shape` placed at `pos` lands outside
    /// the board (above the top included) or on a locked cell.
    pub fn collides(&self, shape: &ShapeMatrix, pos: Vec2i) -> bool {
        shape.occupied().any(|(x, y, _)| {
            match self.index(pos.x + x as i32, pos.y + y as i32) {
                Some((bx, by)) => self.rows[by][bx].is_some(),
                None => true,
            }
        })
    }

    /// Write the piece's cells into the board. Cells that fall outside are
    /// skipped. Call once per lock.
    pub fn merge(&mut self, piece: &ActivePiece) {
        for cell in piece.cells() {
            if let Some((x, y)) = self.index(cell.x, cell.y) {
                self.rows[y][x] = Some(piece.color);
            }
        }
    }

    /// Remove every full row, shifting the rows above it down, and return how
    /// many were removed.
    pub fn clear_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = self.height;
        while y > 0 {
            let row = y - 1;
            if self.is_row_full(row) {
                self.rows.remove(row);
                self.rows.insert(0, vec![None; self.width]);
                cleared += 1;
                // The row that slid into `row` has not been looked at yet.
                continue;
            }
            y -= 1;
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PieceKind;

    const RED: Cell = Some(ColorId::new(0xFF0000));
    const BLUE: Cell = Some(ColorId::new(0x0000FF));

    fn board(width: usize, height: usize) -> Board {
        Board::new(width, height).expect("valid board")
    }

    fn fill_row(board: &mut Board, y: usize, value: Cell) {
        for x in 0..board.width() {
            board.set_cell(x, y, value);
        }
    }

    fn piece(kind: PieceKind, x: i32, y: i32) -> ActivePiece {
        ActivePiece {
            kind,
            shape: kind.shape(),
            pos: Vec2i::new(x, y),
            color: ColorId::new(0x123456),
        }
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            Board::new(0, 20),
            Err(ConfigError::InvalidDimensions { width: 0, height: 20 })
        ));
        assert!(Board::new(10, 0).is_err());
    }

    #[test]
    fn rejects_oversized_dimensions() {
        assert!(Board::new(MAX_BOARD_DIMENSION, MAX_BOARD_DIMENSION).is_ok());
        assert!(matches!(
            Board::new(usize::MAX / 2, 20),
            Err(ConfigError::InvalidDimensions { .. })
        ));
        assert!(Board::new(10, MAX_BOARD_DIMENSION + 1).is_err());
    }

    #[test]
    fn deserializing_checks_the_grid() {
        let missing_rows = serde_json::from_str::<Board>(r#"{"width":10,"height":20,"rows":[]}"#);
        assert!(missing_rows.is_err());

        let ragged = r#"{"width":2,"height":2,"rows":[[null,null],[null]]}"#;
        assert!(serde_json::from_str::<Board>(ragged).is_err());

        let zero = r#"{"width":0,"height":0,"rows":[]}"#;
        assert!(serde_json::from_str::<Board>(zero).is_err());

        let mut b = board(3, 2);
        b.set_cell(1, 1, RED);
        let json = serde_json::to_string(&b).expect("serialize");
        let back: Board = serde_json::from_str(&json).expect("well-formed board");
        assert_eq!(back, b);
        assert!(back.collides(&PieceKind::O.shape(), Vec2i::new(0, 0)));
    }

    #[test]
    fn collides_matches_bounds_and_occupancy_exhaustively() {
        // Small synthetic board with a couple of locked cells; every placement
        // of a single-cell probe and of the O piece is checked against a
        // direct recomputation.
        let mut b = board(4, 5);
        b.set_cell(1, 3, RED);
        b.set_cell(3, 0, BLUE);

        let probe = ShapeMatrix::from_rows(vec![vec![1]]).expect("1x1");
        let o = PieceKind::O.shape();
        for shape in [&probe, &o] {
            for y in -3..8 {
                for x in -3..7 {
                    let expected = shape.occupied().any(|(sx, sy, _)| {
                        let ax = x + sx as i32;
                        let ay = y + sy as i32;
                        ax < 0
                            || ay < 0
                            || ax >= 4
                            || ay >= 5
                            || b.rows()[ay as usize][ax as usize].is_some()
                    });
                    assert_eq!(b.collides(shape, Vec2i::new(x, y)), expected, "at ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn empty_cells_of_the_matrix_may_hang_off_the_board() {
        let b = board(10, 20);
        let i = PieceKind::I.shape(); // occupied column is x=1
        assert!(!b.collides(&i, Vec2i::new(-1, 0)));
        assert!(b.collides(&i, Vec2i::new(-2, 0)));
        assert!(!b.collides(&i, Vec2i::new(8, 16)));
        assert!(b.collides(&i, Vec2i::new(8, 17)));
    }

    #[test]
    fn rows_above_the_top_are_illegal() {
        let b = board(10, 20);
        assert!(b.collides(&PieceKind::O.shape(), Vec2i::new(4, -1)));
    }

    #[test]
    fn merge_writes_piece_color_and_skips_out_of_bounds() {
        let mut b = board(10, 20);
        b.merge(&piece(PieceKind::O, 4, 18));
        for (x, y) in [(4, 18), (5, 18), (4, 19), (5, 19)] {
            assert_eq!(b.cell(x, y), Some(ColorId::new(0x123456)));
        }
        assert_eq!(b.filled_cells(), 4);

        let mut clipped = board(10, 20);
        clipped.merge(&piece(PieceKind::O, 9, 19));
        assert_eq!(clipped.filled_cells(), 1);
        assert!(clipped.cell(9, 19).is_some());
    }

    #[test]
    fn clearing_a_single_full_row_shifts_content_down() {
        let mut b = board(4, 4);
        b.set_cell(0, 1, BLUE);
        fill_row(&mut b, 2, RED);
        b.set_cell(3, 3, BLUE);

        assert_eq!(b.clear_rows(), 1);
        assert!(b.rows()[0].iter().all(Option::is_none));
        assert_eq!(b.cell(0, 2), BLUE, "row above the cleared one moved down");
        assert_eq!(b.cell(3, 3), BLUE, "row below is untouched");
        assert_eq!(b.height(), 4);
        assert_eq!(b.filled_cells(), 2);
    }

    #[test]
    fn adjacent_full_rows_are_all_cleared_in_one_pass() {
        let mut b = board(3, 6);
        fill_row(&mut b, 5, RED);
        fill_row(&mut b, 4, RED);
        b.set_cell(1, 3, BLUE);
        fill_row(&mut b, 2, RED);

        assert_eq!(b.clear_rows(), 3);
        assert_eq!(b.filled_cells(), 1);
        assert_eq!(b.cell(1, 5), BLUE);
        assert_eq!(b.clear_rows(), 0);
    }

    #[test]
    fn clear_on_a_board_without_full_rows_is_a_noop() {
        let mut b = board(3, 3);
        b.set_cell(0, 2, RED);
        b.set_cell(1, 2, RED);
        let before = b.clone();
        assert_eq!(b.clear_rows(), 0);
        assert_eq!(b, before);
    }
}
