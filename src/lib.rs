//! Perfect-maze generation and the thin game layer built on it.
//!
//! [`generator::generate_maze`] carves a maze with a randomized recursive
//! backtracker, [`layout::derive_wall_segments`] turns it into rectangles,
//! and [`session::GameSession`] feeds those into a [`physics::PhysicsWorld`].

pub mod config;
pub mod error;
pub mod generator;
pub mod grid;
pub mod layout;
pub mod physics;
pub mod render;
pub mod session;

pub use error::MazeError;
pub use generator::{generate_maze, Direction, Maze};
pub use grid::{Grid, Pos, WallMatrix};
pub use layout::{derive_wall_segments, Segment, SegmentKind};
