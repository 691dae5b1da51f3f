//! Grid model: visited flags plus the two wall-openness matrices.
//!
//! `horizontals[r][c]` is the wall between `(r, c)` and `(r + 1, c)`;
//! `verticals[r][c]` is the wall between `(r, c)` and `(r, c + 1)`.
//! `true` means the wall has been removed.

use crate::error::MazeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Row-major boolean matrix that remembers its shape even when one side is 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallMatrix {
    rows: usize,
    cols: usize,
    open: Vec<bool>,
}

impl WallMatrix {
    pub fn closed(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            open: vec![false; rows * cols],
        }
    }

    pub fn from_rows(rows: &[Vec<bool>], cols: usize) -> Result<Self, MazeError> {
        let mut open = Vec::with_capacity(rows.len() * cols);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(MazeError::DimensionMismatch {
                    expected: (rows.len(), cols),
                    found: (r + 1, row.len()),
                });
            }
            open.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            open,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_open(&self, row: usize, col: usize) -> Option<bool> {
        if row < self.rows && col < self.cols {
            Some(self.open[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn count_open(&self) -> usize {
        self.open.iter().filter(|&&o| o).count()
    }

    /// Row-major `(row, col, open)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        let cols = self.cols;
        self.open
            .iter()
            .enumerate()
            .map(move |(idx, &open)| (idx / cols, idx % cols, open))
    }

    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.open.chunks(self.cols).map(|c| c.to_vec()).collect()
    }

    fn open_at(&mut self, row: usize, col: usize) -> bool {
        if row < self.rows && col < self.cols {
            self.open[row * self.cols + col] = true;
            true
        } else {
            false
        }
    }
}

/// Returns the `(rows, cols)` of the grid a pair of wall matrices describes.
///
/// Horizontals imply `(rows + 1, cols)` and verticals `(rows, cols + 1)`; the
/// mismatch error reports those two implied grids. When they agree the grid
/// is at least 1x1.
pub fn grid_shape(
    horizontals: &WallMatrix,
    verticals: &WallMatrix,
) -> Result<(usize, usize), MazeError> {
    let from_horizontals = (horizontals.rows() + 1, horizontals.cols());
    let from_verticals = (verticals.rows(), verticals.cols() + 1);
    if from_horizontals != from_verticals {
        return Err(MazeError::DimensionMismatch {
            expected: from_horizontals,
            found: from_verticals,
        });
    }
    Ok(from_horizontals)
}

#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    visited: Vec<bool>,
    horizontals: WallMatrix,
    verticals: WallMatrix,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Result<Self, MazeError> {
        if rows < 1 || cols < 1 {
            return Err(MazeError::InvalidDimension { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            visited: vec![false; rows * cols],
            horizontals: WallMatrix::closed(rows - 1, cols),
            verticals: WallMatrix::closed(rows, cols - 1),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub fn is_visited(&self, pos: Pos) -> Result<bool, MazeError> {
        let idx = self.index(pos)?;
        Ok(self.visited[idx])
    }

    pub fn mark_visited(&mut self, pos: Pos) -> Result<(), MazeError> {
        let idx = self.index(pos)?;
        self.visited[idx] = true;
        Ok(())
    }

    pub fn all_visited(&self) -> bool {
        self.visited.iter().all(|&v| v)
    }

    /// Opens the wall between `(row, col)` and `(row, col + 1)`.
    pub fn open_vertical(&mut self, row: usize, col: usize) -> Result<(), MazeError> {
        if self.verticals.open_at(row, col) {
            Ok(())
        } else {
            Err(self.out_of_bounds(row, col))
        }
    }

    /// Opens the wall between `(row, col)` and `(row + 1, col)`.
    pub fn open_horizontal(&mut self, row: usize, col: usize) -> Result<(), MazeError> {
        if self.horizontals.open_at(row, col) {
            Ok(())
        } else {
            Err(self.out_of_bounds(row, col))
        }
    }

    pub fn horizontals(&self) -> &WallMatrix {
        &self.horizontals
    }

    pub fn verticals(&self) -> &WallMatrix {
        &self.verticals
    }

    pub fn into_walls(self) -> (WallMatrix, WallMatrix) {
        (self.horizontals, self.verticals)
    }

    fn index(&self, pos: Pos) -> Result<usize, MazeError> {
        if self.contains(pos) {
            Ok(pos.row * self.cols + pos.col)
        } else {
            Err(self.out_of_bounds(pos.row, pos.col))
        }
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> MazeError {
        MazeError::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_starts_closed_and_unvisited() {
        let grid = Grid::new(3, 4).unwrap();
        assert_eq!(grid.horizontals().shape(), (2, 4));
        assert_eq!(grid.verticals().shape(), (3, 3));
        assert_eq!(grid.horizontals().count_open(), 0);
        assert_eq!(grid.verticals().count_open(), 0);
        for row in 0..3 {
            for col in 0..4 {
                assert!(!grid.is_visited(Pos::new(row, col)).unwrap());
            }
        }
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert_eq!(
            Grid::new(0, 5).unwrap_err(),
            MazeError::InvalidDimension { rows: 0, cols: 5 }
        );
        assert!(Grid::new(5, 0).is_err());
    }

    #[test]
    fn single_row_keeps_empty_horizontal_shape() {
        let grid = Grid::new(1, 5).unwrap();
        assert_eq!(grid.horizontals().shape(), (0, 5));
        assert_eq!(grid.verticals().shape(), (1, 4));
        assert!(grid.horizontals().to_rows().is_empty());
    }

    #[test]
    fn visited_accessors_check_bounds() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.mark_visited(Pos::new(1, 0)).unwrap();
        assert!(grid.is_visited(Pos::new(1, 0)).unwrap());
        assert!(!grid.is_visited(Pos::new(0, 0)).unwrap());
        assert!(matches!(
            grid.mark_visited(Pos::new(2, 0)),
            Err(MazeError::OutOfBounds { row: 2, col: 0, .. })
        ));
        assert!(grid.is_visited(Pos::new(0, 2)).is_err());
    }

    #[test]
    fn opening_edges_touches_only_target() {
        let mut grid = Grid::new(2, 3).unwrap();
        grid.open_vertical(1, 1).unwrap();
        grid.open_horizontal(0, 2).unwrap();
        assert_eq!(grid.verticals().is_open(1, 1), Some(true));
        assert_eq!(grid.verticals().count_open(), 1);
        assert_eq!(grid.horizontals().is_open(0, 2), Some(true));
        assert_eq!(grid.horizontals().count_open(), 1);
        assert!(!grid.is_visited(Pos::new(1, 1)).unwrap());
    }

    #[test]
    fn edge_opening_rejects_last_column_and_row() {
        let mut grid = Grid::new(2, 3).unwrap();
        assert!(grid.open_vertical(0, 2).is_err());
        assert!(grid.open_horizontal(1, 0).is_err());
    }

    #[test]
    fn grid_shape_accepts_matching_matrices() {
        let grid = Grid::new(1, 1).unwrap();
        assert_eq!(grid_shape(grid.horizontals(), grid.verticals()), Ok((1, 1)));
        let grid = Grid::new(4, 2).unwrap();
        assert_eq!(grid_shape(grid.horizontals(), grid.verticals()), Ok((4, 2)));
    }

    #[test]
    fn grid_shape_rejects_mismatch() {
        let h = WallMatrix::closed(2, 3);
        let v = WallMatrix::closed(3, 3);
        assert_eq!(
            grid_shape(&h, &v),
            Err(MazeError::DimensionMismatch {
                expected: (3, 3),
                found: (3, 4),
            })
        );
        assert!(grid_shape(&WallMatrix::closed(0, 0), &WallMatrix::closed(1, 0)).is_err());
        assert!(grid_shape(&WallMatrix::closed(0, 1), &WallMatrix::closed(0, 0)).is_err());
    }

    #[test]
    fn matrix_from_rows_round_trips_shape() {
        let m = WallMatrix::from_rows(&[vec![true, false], vec![false, false]], 2).unwrap();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m.count_open(), 1);
        assert_eq!(
            WallMatrix::from_rows(&[vec![true]], 2),
            Err(MazeError::DimensionMismatch {
                expected: (1, 2),
                found: (1, 1),
            })
        );
        assert!(matches!(
            WallMatrix::from_rows(&[vec![true, true], vec![false]], 2),
            Err(MazeError::DimensionMismatch { .. })
        ));
    }
}
