//! Physics object model
//!
//! Plain value types describing what lives in the world. Behavior belongs
//! to the registry and the world manager.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::BodyHandle;

/// World-space pose of a body origin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicsLocation {
    pub x: f32,
    pub y: f32,
    /// Rotation in radians
    pub theta: f32,
}

impl PhysicsLocation {
    pub const fn new(x: f32, y: f32, theta: f32) -> Self {
        Self { x, y, theta }
    }

    pub fn at(position: Vec2) -> Self {
        Self::new(position.x, position.y, 0.0)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Shape/behavior tag, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Static box (bricks, walls, level furniture)
    Box,
    /// Dynamic circle (the ball)
    Circle,
    /// Kinematic box moved by the input layer
    Paddle,
}

/// Which boundary a wall closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
    Top,
    Ground,
}

impl WallSide {
    pub const ALL: [WallSide; 4] = [
        WallSide::Left,
        WallSide::Right,
        WallSide::Top,
        WallSide::Ground,
    ];

    /// Registry name of this wall
    pub fn name(&self) -> &'static str {
        match self {
            WallSide::Left => "Wall_Left",
            WallSide::Right => "Wall_Right",
            WallSide::Top => "Wall_Top",
            WallSide::Ground => "Wall_Ground",
        }
    }
}

/// What an object means to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectRole {
    Ball,
    Paddle,
    Wall(WallSide),
    Brick { row: usize, column: usize },
    /// Inserted by level setup through `add_object`
    Custom,
}

/// Collider geometry, centered on the body origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Box { half_extents: Vec2 },
}

impl Shape {
    /// Half size of the bounding box
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Shape::Circle { radius } => Vec2::splat(radius),
            Shape::Box { half_extents } => half_extents,
        }
    }
}

/// Brick tint picked when the grid is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrickColor {
    Red,
    Blue,
    Green,
}

impl BrickColor {
    pub const ALL: [BrickColor; 3] = [BrickColor::Red, BrickColor::Blue, BrickColor::Green];
}

/// An object living in the world
///
/// The body handle is owned by the world manager; outside the crate an
/// object is only ever seen through a shared borrow.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsObject {
    pub(crate) location: PhysicsLocation,
    kind: ObjectKind,
    role: ObjectRole,
    shape: Shape,
    color: Option<BrickColor>,
    pub(crate) body: Option<BodyHandle>,
}

impl PhysicsObject {
    fn new(kind: ObjectKind, shape: Shape, location: PhysicsLocation) -> Self {
        Self {
            location,
            kind,
            role: ObjectRole::Custom,
            shape,
            color: None,
            body: None,
        }
    }

    /// Static box with the given half extents
    pub fn boxed(half_extents: Vec2, location: PhysicsLocation) -> Self {
        Self::new(ObjectKind::Box, Shape::Box { half_extents }, location)
    }

    /// Dynamic circle
    pub fn circle(radius: f32, location: PhysicsLocation) -> Self {
        Self::new(ObjectKind::Circle, Shape::Circle { radius }, location)
    }

    /// Kinematic box steered by the input layer
    pub fn paddle(half_extents: Vec2, location: PhysicsLocation) -> Self {
        Self::new(ObjectKind::Paddle, Shape::Box { half_extents }, location)
    }

    pub(crate) fn brick(
        row: usize,
        column: usize,
        half_extents: Vec2,
        location: PhysicsLocation,
        color: BrickColor,
    ) -> Self {
        let mut brick = Self::boxed(half_extents, location).with_role(ObjectRole::Brick { row, column });
        brick.color = Some(color);
        brick
    }

    pub fn with_role(mut self, role: ObjectRole) -> Self {
        self.role = role;
        self
    }

    #[inline]
    pub fn location(&self) -> PhysicsLocation {
        self.location
    }

    #[inline]
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    #[inline]
    pub fn role(&self) -> ObjectRole {
        self.role
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn color(&self) -> Option<BrickColor> {
        self.color
    }

    pub fn is_brick(&self) -> bool {
        matches!(self.role, ObjectRole::Brick { .. })
    }

    /// Whether the world manager has attached a body yet
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

/// Owned copy of an object's public state, for renderers and tooling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub name: String,
    pub kind: ObjectKind,
    pub role: ObjectRole,
    pub location: PhysicsLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<BrickColor>,
}

impl ObjectSnapshot {
    pub fn new(name: &str, object: &PhysicsObject) -> Self {
        Self {
            name: name.to_string(),
            kind: object.kind,
            role: object.role,
            location: object.location,
            color: object.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_pair_kind_with_shape() {
        let loc = PhysicsLocation::new(1.0, 2.0, 0.0);

        let circle = PhysicsObject::circle(2.0, loc);
        assert_eq!(circle.kind(), ObjectKind::Circle);
        assert_eq!(circle.shape(), Shape::Circle { radius: 2.0 });
        assert_eq!(circle.role(), ObjectRole::Custom);
        assert!(!circle.has_body());

        let paddle = PhysicsObject::paddle(Vec2::new(15.0, 1.5), loc);
        assert_eq!(paddle.kind(), ObjectKind::Paddle);
        assert!(matches!(paddle.shape(), Shape::Box { .. }));
    }

    #[test]
    fn test_shape_half_extents() {
        let brick = Shape::Box {
            half_extents: Vec2::new(3.0, 1.5),
        };
        assert_eq!(brick.half_extents(), Vec2::new(3.0, 1.5));
        assert_eq!(Shape::Circle { radius: 2.0 }.half_extents(), Vec2::splat(2.0));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let brick = PhysicsObject::brick(
            1,
            2,
            Vec2::new(3.0, 1.5),
            PhysicsLocation::new(0.0, 47.0, 0.0),
            BrickColor::Green,
        );
        let snapshot = ObjectSnapshot::new("Brick_1_2", &brick);
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["name"], "Brick_1_2");
        assert_eq!(json["kind"], "Box");
        assert_eq!(json["color"], "Green");
        assert_eq!(json["location"]["y"], 47.0);
    }
}
