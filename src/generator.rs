//! Randomized recursive backtracker.
//!
//! The traversal keeps an explicit stack of frames instead of recursing, but
//! visits cells and consumes randomness in the same order as the recursive
//! form: a cell's neighbor order is fixed the moment it is entered, and the
//! walk resumes that order after backtracking out of a child.

use std::collections::VecDeque;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::MazeError;
use crate::grid::{grid_shape, Grid, Pos, WallMatrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// `(d_row, d_col)`
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }
}

fn step(pos: Pos, dir: Direction, rows: usize, cols: usize) -> Option<Pos> {
    let (dr, dc) = dir.delta();
    let row = pos.row.checked_add_signed(dr)?;
    let col = pos.col.checked_add_signed(dc)?;
    if row >= rows || col >= cols {
        return None;
    }
    Some(Pos { row, col })
}

fn open_toward(grid: &mut Grid, pos: Pos, dir: Direction) -> Result<(), MazeError> {
    match dir {
        Direction::Left => grid.open_vertical(pos.row, pos.col.wrapping_sub(1)),
        Direction::Right => grid.open_vertical(pos.row, pos.col),
        Direction::Up => grid.open_horizontal(pos.row.wrapping_sub(1), pos.col),
        Direction::Down => grid.open_horizontal(pos.row, pos.col),
    }
}

struct Frame {
    pos: Pos,
    dirs: [Direction; 4],
    next: usize,
}

fn enter<F>(grid: &mut Grid, pos: Pos, order: &mut F) -> Result<Frame, MazeError>
where
    F: FnMut(&mut [Direction]),
{
    grid.mark_visited(pos)?;
    let mut dirs = Direction::ALL;
    order(&mut dirs);
    Ok(Frame { pos, dirs, next: 0 })
}

/// Runs the backtracker from `start`, letting `order` permute each cell's
/// neighbor list (`[Up, Right, Down, Left]`) when the cell is entered.
///
/// Returns immediately if `start` has already been visited.
pub fn carve_from<F>(grid: &mut Grid, start: Pos, mut order: F) -> Result<(), MazeError>
where
    F: FnMut(&mut [Direction]),
{
    if grid.is_visited(start)? {
        return Ok(());
    }
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut stack = vec![enter(grid, start, &mut order)?];

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.dirs.len() {
            stack.pop();
            continue;
        }
        let dir = frame.dirs[frame.next];
        frame.next += 1;
        let from = frame.pos;

        let Some(to) = step(from, dir, rows, cols) else {
            continue;
        };
        if grid.is_visited(to)? {
            continue;
        }
        open_toward(grid, from, dir)?;
        let child = enter(grid, to, &mut order)?;
        stack.push(child);
    }
    Ok(())
}

/// A finished perfect maze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    pub horizontals: WallMatrix,
    pub verticals: WallMatrix,
    pub start: Pos,
}

/// Generates a perfect maze with a uniformly random start cell and an
/// unbiased shuffle of every cell's neighbors.
pub fn generate_maze<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    rng: &mut R,
) -> Result<Maze, MazeError> {
    let mut grid = Grid::new(rows, cols)?;
    let start = Pos::new(rng.gen_range(0..rows), rng.gen_range(0..cols));
    carve_from(&mut grid, start, |dirs| dirs.shuffle(&mut *rng))?;
    debug_assert!(grid.all_visited());

    let (horizontals, verticals) = grid.into_walls();
    let maze = Maze {
        horizontals,
        verticals,
        start,
    };
    debug!(rows, cols, ?start, "maze carved\n{maze}");
    Ok(maze)
}

impl Maze {
    /// Wraps existing wall matrices; `start` is set to `(0, 0)`.
    pub fn from_walls(horizontals: WallMatrix, verticals: WallMatrix) -> Result<Self, MazeError> {
        grid_shape(&horizontals, &verticals)?;
        Ok(Self {
            horizontals,
            verticals,
            start: Pos::new(0, 0),
        })
    }

    pub fn rows(&self) -> usize {
        self.verticals.rows()
    }

    pub fn cols(&self) -> usize {
        self.horizontals.cols()
    }

    pub fn into_walls(self) -> (WallMatrix, WallMatrix) {
        (self.horizontals, self.verticals)
    }

    pub fn open_edge_count(&self) -> usize {
        self.horizontals.count_open() + self.verticals.count_open()
    }

    /// Whether `a` and `b` are adjacent and the wall between them is removed.
    pub fn is_open(&self, a: Pos, b: Pos) -> bool {
        if a.row == b.row && a.col.abs_diff(b.col) == 1 {
            self.verticals.is_open(a.row, a.col.min(b.col)) == Some(true)
        } else if a.col == b.col && a.row.abs_diff(b.row) == 1 {
            self.horizontals.is_open(a.row.min(b.row), a.col) == Some(true)
        } else {
            false
        }
    }

    pub fn open_neighbors(&self, pos: Pos) -> Vec<Pos> {
        Direction::ALL
            .iter()
            .filter_map(|&dir| step(pos, dir, self.rows(), self.cols()))
            .filter(|&next| self.is_open(pos, next))
            .collect()
    }

    /// Breadth-first corridor distance from `start` to every cell.
    pub fn distances_from(&self, start: Pos) -> Vec<Vec<Option<usize>>> {
        let mut dist = vec![vec![None; self.cols()]; self.rows()];
        if start.row >= self.rows() || start.col >= self.cols() {
            return dist;
        }
        let mut q = VecDeque::new();
        dist[start.row][start.col] = Some(0);
        q.push_back(start);

        while let Some(pos) = q.pop_front() {
            let base = dist[pos.row][pos.col].unwrap_or(0);
            for next in self.open_neighbors(pos) {
                if dist[next.row][next.col].is_none() {
                    dist[next.row][next.col] = Some(base + 1);
                    q.push_back(next);
                }
            }
        }
        dist
    }

    /// Corridor length from the ball's cell to the goal cell.
    pub fn solution_length(&self) -> Option<usize> {
        let goal = Pos::new(self.rows().checked_sub(1)?, self.cols().checked_sub(1)?);
        self.distances_from(Pos::new(0, 0))[goal.row][goal.col]
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = (self.rows(), self.cols());
        writeln!(f, "+{}", "--+".repeat(cols))?;
        for row in 0..rows {
            let mut line = String::from("|");
            let mut below = String::from("+");
            for col in 0..cols {
                line.push_str("  ");
                let right_open = col + 1 < cols && self.verticals.is_open(row, col) == Some(true);
                line.push(if right_open { ' ' } else { '|' });
                let down_open = row + 1 < rows && self.horizontals.is_open(row, col) == Some(true);
                below.push_str(if down_open { "  +" } else { "--+" });
            }
            writeln!(f, "{line}")?;
            writeln!(f, "{below}")?;
        }
        Ok(())
    }
}
