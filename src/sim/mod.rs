//! Deterministic simulation module
//!
//! Everything that moves lives here. Same inputs, same outputs:
//! - Caller-supplied time steps only
//! - Seeded RNG only
//! - Stable iteration order (arena slot order, rapier event order)

pub mod arena;
pub mod body;
pub mod listener;
pub mod object;
pub mod physics;
pub mod registry;
pub mod spawner;
pub mod world;

pub use arena::{Arena, Index};
pub use body::{BodyDesc, BodyHandle, BodyType};
pub use listener::{BoundListener, CollisionListener, ContactKind, ContactRecord};
pub use object::{
    BrickColor, ObjectKind, ObjectRole, ObjectSnapshot, PhysicsLocation, PhysicsObject, Shape,
    WallSide,
};
pub use physics::{ContactListener, PhysicsWorld, SolverConfig};
pub use registry::{ObjectId, ObjectRegistry};
pub use spawner::{BrickRow, BrickSpawner, brick_name, brick_position, grid_bounds};
pub use world::{BALL_NAME, BallState, Field, PADDLE_NAME, WorldEvent, WorldManager};
