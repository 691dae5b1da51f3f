use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MazeError {
    /// Grid dimensions must both be at least 1.
    InvalidDimension { rows: usize, cols: usize },
    /// Cell or edge coordinate outside the grid.
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    /// Wall data does not have the shape it was declared with.
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// Unit lengths must be finite and positive.
    InvalidUnitLength { width: f32, height: f32 },
    /// A session needs a start marker to place the ball.
    MissingStart,
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension { rows, cols } => {
                write!(f, "invalid grid dimension {rows}x{cols} (both must be >= 1)")
            }
            Self::OutOfBounds {
                row,
                col,
                rows,
                cols,
            } => write!(f, "({row}, {col}) is outside the {rows}x{cols} grid"),
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "dimension mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            Self::InvalidUnitLength { width, height } => {
                write!(f, "invalid unit length {width}x{height}")
            }
            Self::MissingStart => write!(f, "layout has no start marker"),
        }
    }
}

impl std::error::Error for MazeError {}
