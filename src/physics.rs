//! The seam between the game session and whatever simulates bodies.
//!
//! [`PhysicsWorld`] is everything the session needs from an engine.
//! [`RapierWorld`] implements it on `rapier2d`: fixed cuboids for walls, a
//! dynamic ball, and contact starts read off the narrow phase after each step.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::{Add, Mul};

use rapier2d::dynamics::{IntegrationParameters, RigidBodySet};
use rapier2d::geometry::{BroadPhase, NarrowPhase};
use rapier2d::na::Vector2;
use rapier2d::prelude::*;

/// A point or velocity in world units, `y` growing downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl From<&Vector2<f32>> for Vec2 {
    fn from(v: &Vector2<f32>) -> Self {
        Vec2::new(v.x, v.y)
    }
}

impl From<Vec2> for Vector2<f32> {
    fn from(v: Vec2) -> Self {
        Vector2::new(v.x, v.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyLabel {
    Boundary,
    Wall,
    Goal,
    Ball,
}

impl fmt::Display for BodyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BodyLabel::Boundary => "boundary",
            BodyLabel::Wall => "wall",
            BodyLabel::Goal => "goal",
            BodyLabel::Ball => "ball",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect { width: f32, height: f32 },
    Circle { radius: f32 },
}

/// Snapshot of one body as of the last step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub label: BodyLabel,
    pub shape: Shape,
    /// Center of the body.
    pub position: Vec2,
    /// World units per second.
    pub velocity: Vec2,
    pub is_static: bool,
}

pub type BodyId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionStart {
    pub a: BodyLabel,
    pub b: BodyLabel,
}

pub trait PhysicsWorld {
    fn add_static_rect(&mut self, label: BodyLabel, center: Vec2, width: f32, height: f32)
        -> BodyId;
    fn add_circle(&mut self, label: BodyLabel, center: Vec2, radius: f32) -> BodyId;
    fn velocity(&self, id: BodyId) -> Vec2;
    fn set_velocity(&mut self, id: BodyId, velocity: Vec2);
    fn set_static(&mut self, id: BodyId, is_static: bool);
    /// Acceleration in world units per second squared.
    fn set_gravity(&mut self, gravity: Vec2);
    /// Advances one tick and reports pairs that started touching during it.
    fn step(&mut self) -> Vec<CollisionStart>;
    fn bodies(&self) -> &[Body];
}

/// Default tick length in seconds.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Linear damping on the ball, so a nudge eventually rolls out.
const BALL_DAMPING: f32 = 0.6;
const WALL_FRICTION: f32 = 0.5;

/// Rigid-body simulation over `rapier2d`.
pub struct RapierWorld {
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,

    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    gravity: Vector2<f32>,

    handles: Vec<RigidBodyHandle>,
    owners: HashMap<ColliderHandle, BodyId>,
    bodies: Vec<Body>,
    contacts: HashSet<(BodyId, BodyId)>,
}

impl RapierWorld {
    /// `dt` is the simulated time per [`PhysicsWorld::step`], in seconds.
    pub fn new(dt: f32) -> Self {
        Self {
            integration_parameters: IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),

            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: Vector2::new(0.0, 0.0),

            handles: Vec::new(),
            owners: HashMap::new(),
            bodies: Vec::new(),
            contacts: HashSet::new(),
        }
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    fn insert(&mut self, body: Body, rigid_body: RigidBody, collider: Collider) -> BodyId {
        let rigid_body_handle = self.rigid_body_set.insert(rigid_body);
        let collider_handle = self.collider_set.insert_with_parent(
            collider,
            rigid_body_handle,
            &mut self.rigid_body_set,
        );

        let id = self.bodies.len();
        self.handles.push(rigid_body_handle);
        self.owners.insert(collider_handle, id);
        self.bodies.push(body);
        id
    }

    fn rigid_body(&self, id: BodyId) -> Option<&RigidBody> {
        self.rigid_body_set.get(*self.handles.get(id)?)
    }

    fn rigid_body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(*self.handles.get(id)?)
    }

    /// Copies positions and velocities out of the rigid-body set.
    fn sync_bodies(&mut self) {
        for (body, handle) in self.bodies.iter_mut().zip(&self.handles) {
            if let Some(rigid_body) = self.rigid_body_set.get(*handle) {
                body.position = rigid_body.translation().into();
                body.velocity = rigid_body.linvel().into();
            }
        }
    }

    /// Body pairs with at least one active contact, lower id first.
    fn touching(&self) -> HashSet<(BodyId, BodyId)> {
        self.narrow_phase
            .contact_pairs()
            .filter(|pair| pair.has_any_active_contact)
            .filter_map(|pair| {
                let a = *self.owners.get(&pair.collider1)?;
                let b = *self.owners.get(&pair.collider2)?;
                Some((a.min(b), a.max(b)))
            })
            .collect()
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new(DEFAULT_DT)
    }
}

impl PhysicsWorld for RapierWorld {
    fn add_static_rect(
        &mut self,
        label: BodyLabel,
        center: Vec2,
        width: f32,
        height: f32,
    ) -> BodyId {
        // Rotations stay locked so released walls keep matching their
        // axis-aligned snapshot.
        let rigid_body = RigidBodyBuilder::fixed()
            .translation(center.into())
            .lock_rotations()
            .build();
        let collider = ColliderBuilder::cuboid(width / 2.0, height / 2.0)
            .friction(WALL_FRICTION)
            .restitution(0.0)
            .build();
        let body = Body {
            label,
            shape: Shape::Rect { width, height },
            position: center,
            velocity: Vec2::ZERO,
            is_static: true,
        };
        self.insert(body, rigid_body, collider)
    }

    fn add_circle(&mut self, label: BodyLabel, center: Vec2, radius: f32) -> BodyId {
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(center.into())
            .linear_damping(BALL_DAMPING)
            .lock_rotations()
            .ccd_enabled(true)
            .build();
        let collider = ColliderBuilder::ball(radius)
            .friction(0.0)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .restitution(0.0)
            .build();
        let body = Body {
            label,
            shape: Shape::Circle { radius },
            position: center,
            velocity: Vec2::ZERO,
            is_static: false,
        };
        self.insert(body, rigid_body, collider)
    }

    fn velocity(&self, id: BodyId) -> Vec2 {
        self.rigid_body(id)
            .map_or(Vec2::ZERO, |rigid_body| rigid_body.linvel().into())
    }

    fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        if let Some(rigid_body) = self.rigid_body_mut(id) {
            rigid_body.set_linvel(velocity.into(), true);
        }
        if let Some(body) = self.bodies.get_mut(id) {
            body.velocity = velocity;
        }
    }

    fn set_static(&mut self, id: BodyId, is_static: bool) {
        if let Some(rigid_body) = self.rigid_body_mut(id) {
            if is_static {
                rigid_body.set_body_type(RigidBodyType::Fixed, false);
                rigid_body.set_linvel(Vector2::new(0.0, 0.0), false);
            } else {
                rigid_body.set_body_type(RigidBodyType::Dynamic, true);
            }
        }
        if let Some(body) = self.bodies.get_mut(id) {
            body.is_static = is_static;
            if is_static {
                body.velocity = Vec2::ZERO;
            }
        }
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity.into();
    }

    fn step(&mut self) -> Vec<CollisionStart> {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.sync_bodies();

        let touching = self.touching();
        let started = contact_starts(&self.contacts, &touching);
        self.contacts = touching;
        started
            .into_iter()
            .map(|(a, b)| CollisionStart {
                a: self.bodies[a].label,
                b: self.bodies[b].label,
            })
            .collect()
    }

    fn bodies(&self) -> &[Body] {
        &self.bodies
    }
}

/// Pairs in `current` that were not touching last tick, sorted.
fn contact_starts(
    previous: &HashSet<(BodyId, BodyId)>,
    current: &HashSet<(BodyId, BodyId)>,
) -> Vec<(BodyId, BodyId)> {
    let mut started: Vec<_> = current.difference(previous).copied().collect();
    started.sort_unstable();
    started
}
