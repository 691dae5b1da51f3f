//! One play-through of one maze: populate the world, steer the ball, detect the win.

use tracing::{debug, info};

use crate::error::MazeError;
use crate::generator::Direction;
use crate::layout::{boundary_segments, Segment, SegmentKind};
use crate::physics::{BodyId, BodyLabel, PhysicsWorld, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    /// Play-area size in world units.
    pub width: f32,
    pub height: f32,
    pub boundary_thickness: f32,
    /// Velocity added per key press.
    pub nudge: f32,
    /// Gravity switched on once the ball reaches the goal.
    pub win_gravity: f32,
}

pub struct GameSession<W: PhysicsWorld> {
    world: W,
    ball: BodyId,
    walls: Vec<BodyId>,
    settings: SessionSettings,
    won: bool,
}

impl<W: PhysicsWorld> GameSession<W> {
    /// Registers the boundary, every wall and goal segment, and the ball at
    /// the start marker.
    pub fn new(
        mut world: W,
        segments: &[Segment],
        settings: SessionSettings,
    ) -> Result<Self, MazeError> {
        let start = segments
            .iter()
            .find(|s| s.kind == SegmentKind::Start)
            .ok_or(MazeError::MissingStart)?;

        let boundary = boundary_segments(
            settings.width,
            settings.height,
            settings.boundary_thickness,
        );
        for seg in &boundary {
            world.add_static_rect(
                BodyLabel::Boundary,
                Vec2::new(seg.x, seg.y),
                seg.width,
                seg.height,
            );
        }

        let mut walls = Vec::new();
        for seg in segments {
            let center = Vec2::new(seg.x, seg.y);
            match seg.kind {
                SegmentKind::Wall => {
                    walls.push(world.add_static_rect(
                        BodyLabel::Wall,
                        center,
                        seg.width,
                        seg.height,
                    ));
                }
                SegmentKind::Goal => {
                    world.add_static_rect(BodyLabel::Goal, center, seg.width, seg.height);
                }
                SegmentKind::Start => {}
            }
        }

        let radius = start.width.min(start.height) / 2.0;
        let ball = world.add_circle(BodyLabel::Ball, Vec2::new(start.x, start.y), radius);
        debug!(walls = walls.len(), radius, "session populated");

        Ok(Self {
            world,
            ball,
            walls,
            settings,
            won: false,
        })
    }

    pub fn nudge(&mut self, dir: Direction) {
        let (dr, dc) = dir.delta();
        let kick = Vec2::new(dc as f32, dr as f32) * self.settings.nudge;
        let velocity = self.world.velocity(self.ball) + kick;
        self.world.set_velocity(self.ball, velocity);
    }

    /// Steps the world and feeds every new contact to [`Self::on_collision`].
    pub fn tick(&mut self) {
        for contact in self.world.step() {
            self.on_collision(contact.a, contact.b);
        }
    }

    /// Returns `true` when this contact is the one that wins the game.
    pub fn on_collision(&mut self, a: BodyLabel, b: BodyLabel) -> bool {
        let ball_meets_goal = matches!(
            (a, b),
            (BodyLabel::Ball, BodyLabel::Goal) | (BodyLabel::Goal, BodyLabel::Ball)
        );
        if !ball_meets_goal || self.won {
            return false;
        }

        self.won = true;
        info!(released = self.walls.len(), "ball reached the goal");
        self.world.set_gravity(Vec2::new(0.0, self.settings.win_gravity));
        for &wall in &self.walls {
            self.world.set_static(wall, false);
        }
        true
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn ball(&self) -> BodyId {
        self.ball
    }

    pub fn world(&self) -> &W {
        &self.world
    }
}
