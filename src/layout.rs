//! Turns wall-openness matrices into placed rectangles.
//!
//! Positions are rectangle centers in world units, with `y` growing downward.

use tracing::debug;

use crate::error::MazeError;
use crate::grid::{grid_shape, WallMatrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Wall,
    Goal,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: SegmentKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutStyle {
    pub wall_thickness: f32,
    /// Goal side length as a fraction of one cell.
    pub goal_scale: f32,
    /// Ball radius as a fraction of the shorter unit length.
    pub ball_radius_ratio: f32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            wall_thickness: 0.5,
            goal_scale: 0.7,
            ball_radius_ratio: 0.25,
        }
    }
}

pub fn derive_wall_segments(
    horizontals: &WallMatrix,
    verticals: &WallMatrix,
    unit_width: f32,
    unit_height: f32,
) -> Result<Vec<Segment>, MazeError> {
    derive_wall_segments_styled(
        horizontals,
        verticals,
        unit_width,
        unit_height,
        &LayoutStyle::default(),
    )
}

/// Emits one segment per closed internal wall (horizontals first, then
/// verticals, each row-major), then the goal, then the ball start.
pub fn derive_wall_segments_styled(
    horizontals: &WallMatrix,
    verticals: &WallMatrix,
    unit_width: f32,
    unit_height: f32,
    style: &LayoutStyle,
) -> Result<Vec<Segment>, MazeError> {
    let (rows, cols) = grid_shape(horizontals, verticals)?;
    if !valid_unit(unit_width) || !valid_unit(unit_height) {
        return Err(MazeError::InvalidUnitLength {
            width: unit_width,
            height: unit_height,
        });
    }

    let mut segments = Vec::new();
    for (row, col, open) in horizontals.iter() {
        if open {
            continue;
        }
        segments.push(Segment {
            x: col as f32 * unit_width + unit_width / 2.0,
            y: (row + 1) as f32 * unit_height,
            width: unit_width,
            height: style.wall_thickness,
            kind: SegmentKind::Wall,
        });
    }
    for (row, col, open) in verticals.iter() {
        if open {
            continue;
        }
        segments.push(Segment {
            x: (col + 1) as f32 * unit_width,
            y: row as f32 * unit_height + unit_height / 2.0,
            width: style.wall_thickness,
            height: unit_height,
            kind: SegmentKind::Wall,
        });
    }

    segments.push(Segment {
        x: (cols - 1) as f32 * unit_width + unit_width / 2.0,
        y: (rows - 1) as f32 * unit_height + unit_height / 2.0,
        width: unit_width * style.goal_scale,
        height: unit_height * style.goal_scale,
        kind: SegmentKind::Goal,
    });

    let diameter = 2.0 * unit_width.min(unit_height) * style.ball_radius_ratio;
    segments.push(Segment {
        x: unit_width / 2.0,
        y: unit_height / 2.0,
        width: diameter,
        height: diameter,
        kind: SegmentKind::Start,
    });

    let walls = segments
        .iter()
        .filter(|s| s.kind == SegmentKind::Wall)
        .count();
    debug!(rows, cols, walls, "derived wall layout");
    Ok(segments)
}

/// The four walls enclosing a `width` x `height` play area, centered on its edges.
pub fn boundary_segments(width: f32, height: f32, thickness: f32) -> [Segment; 4] {
    let wall = |x, y, width, height| Segment {
        x,
        y,
        width,
        height,
        kind: SegmentKind::Wall,
    };
    [
        wall(width / 2.0, 0.0, width, thickness),
        wall(width / 2.0, height, width, thickness),
        wall(0.0, height / 2.0, thickness, height),
        wall(width, height / 2.0, thickness, height),
    ]
}

fn valid_unit(len: f32) -> bool {
    len.is_finite() && len > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_maze;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn walls(segments: &[Segment]) -> Vec<&Segment> {
        segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Wall)
            .collect()
    }

    #[test]
    fn single_cell_has_only_goal_and_start() {
        let h = WallMatrix::closed(0, 1);
        let v = WallMatrix::closed(1, 0);
        let segments = derive_wall_segments(&h, &v, 10.0, 20.0).unwrap();
        assert_eq!(segments.len(), 2);

        let goal = segments[0];
        assert_eq!(goal.kind, SegmentKind::Goal);
        assert_eq!((goal.x, goal.y), (5.0, 10.0));
        assert_eq!((goal.width, goal.height), (7.0, 14.0));

        let start = segments[1];
        assert_eq!(start.kind, SegmentKind::Start);
        assert_eq!((start.x, start.y), (5.0, 10.0));
        assert_eq!((start.width, start.height), (5.0, 5.0));
    }

    #[test]
    fn closed_walls_are_placed_on_cell_edges() {
        // 2x2, only the wall between (0,0) and (1,0) remains.
        let h = WallMatrix::from_rows(&[vec![false, true]], 2).unwrap();
        let v = WallMatrix::from_rows(&[vec![true], vec![true]], 1).unwrap();
        let segments = derive_wall_segments(&h, &v, 10.0, 8.0).unwrap();
        let walls = walls(&segments);
        assert_eq!(walls.len(), 1);
        assert_eq!((walls[0].x, walls[0].y), (5.0, 8.0));
        assert_eq!((walls[0].width, walls[0].height), (10.0, 0.5));
    }

    #[test]
    fn vertical_walls_span_unit_height() {
        let h = WallMatrix::closed(0, 3);
        let v = WallMatrix::from_rows(&[vec![true, false]], 2).unwrap();
        let segments = derive_wall_segments(&h, &v, 4.0, 6.0).unwrap();
        let walls = walls(&segments);
        assert_eq!(walls.len(), 1);
        assert_eq!((walls[0].x, walls[0].y), (8.0, 3.0));
        assert_eq!((walls[0].width, walls[0].height), (0.5, 6.0));
    }

    #[test]
    fn goal_sits_in_far_corner() {
        let h = WallMatrix::closed(2, 4);
        let v = WallMatrix::closed(3, 3);
        let segments = derive_wall_segments(&h, &v, 10.0, 10.0).unwrap();
        let goal = segments
            .iter()
            .find(|s| s.kind == SegmentKind::Goal)
            .unwrap();
        assert_eq!((goal.x, goal.y), (35.0, 25.0));
        // every internal wall closed: 2*4 horizontal + 3*3 vertical
        assert_eq!(walls(&segments).len(), 17);
    }

    #[test]
    fn horizontals_come_before_verticals() {
        let h = WallMatrix::closed(1, 2);
        let v = WallMatrix::closed(2, 1);
        let segments = derive_wall_segments(&h, &v, 1.0, 1.0).unwrap();
        let kinds: Vec<_> = segments.iter().map(|s| (s.width, s.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (1.0, SegmentKind::Wall),
                (1.0, SegmentKind::Wall),
                (0.5, SegmentKind::Wall),
                (0.5, SegmentKind::Wall),
                (0.7, SegmentKind::Goal),
                (0.5, SegmentKind::Start),
            ]
        );
    }

    #[test]
    fn mismatched_matrices_are_rejected() {
        let h = WallMatrix::closed(1, 3);
        let v = WallMatrix::closed(2, 1);
        assert!(matches!(
            derive_wall_segments(&h, &v, 1.0, 1.0),
            Err(MazeError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn bad_unit_lengths_are_rejected() {
        let h = WallMatrix::closed(0, 1);
        let v = WallMatrix::closed(1, 0);
        assert!(derive_wall_segments(&h, &v, 0.0, 1.0).is_err());
        assert!(derive_wall_segments(&h, &v, 1.0, f32::NAN).is_err());
    }

    #[test]
    fn wall_count_matches_closed_edges() {
        let mut rng = StdRng::seed_from_u64(42);
        let maze = generate_maze(6, 9, &mut rng).unwrap();
        let segments = derive_wall_segments(&maze.horizontals, &maze.verticals, 3.0, 2.0).unwrap();
        let internal = 5 * 9 + 6 * 8;
        assert_eq!(walls(&segments).len(), internal - maze.open_edge_count());
    }

    #[test]
    fn boundary_encloses_play_area() {
        let [top, bottom, left, right] = boundary_segments(20.0, 10.0, 1.0);
        assert_eq!((top.x, top.y, top.width), (10.0, 0.0, 20.0));
        assert_eq!((bottom.y, bottom.height), (10.0, 1.0));
        assert_eq!((left.x, left.height), (0.0, 10.0));
        assert_eq!((right.x, right.y), (20.0, 5.0));
    }
}
