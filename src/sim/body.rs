//! Rigid body descriptions
//!
//! What the world manager asks the physics world to create. The rapier
//! types stay behind [`BodyHandle`]; nothing outside `sim` sees them.

use glam::Vec2;
use rapier2d::prelude::{ColliderBuilder, ColliderHandle, RigidBodyHandle, RigidBodyType};

use super::object::Shape;
use super::registry::ObjectId;

/// Body plus its single collider inside a [`PhysicsWorld`](super::physics::PhysicsWorld)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    pub(crate) body: RigidBodyHandle,
    pub(crate) collider: ColliderHandle,
}

/// How the solver treats a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Never moves (walls, bricks)
    Static,
    /// Integrated and pushed by contacts (ball)
    Dynamic,
    /// Moved by setting its pose; infinite mass in contacts (paddle)
    Kinematic,
}

impl BodyType {
    pub(crate) fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Static => RigidBodyType::Fixed,
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Kinematic => RigidBodyType::KinematicPositionBased,
        }
    }
}

impl Shape {
    pub(crate) fn collider(&self) -> ColliderBuilder {
        match *self {
            Shape::Circle { radius } => ColliderBuilder::ball(radius),
            Shape::Box { half_extents } => ColliderBuilder::cuboid(half_extents.x, half_extents.y),
        }
    }
}

/// Description of a body before it is created
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub shape: Shape,
    /// Stored in rapier `user_data` so contacts resolve back to objects
    pub owner: ObjectId,
    pub position: Vec2,
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub restitution: f32,
}

impl BodyDesc {
    pub fn new(body_type: BodyType, shape: Shape, owner: ObjectId) -> Self {
        Self {
            body_type,
            shape,
            owner,
            position: Vec2::ZERO,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            restitution: 0.0,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }
}
