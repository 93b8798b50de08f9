//! Brick Physics - fixed-step 2D physics core for a brick-breaker game
//!
//! Core modules:
//! - `sim`: World manager, object registry, collision listener, brick spawner
//!   and the rapier2d world underneath them
//! - `settings`: Seed and solver tuning, loadable from JSON
//! - `error`: Error type shared by the fallible operations
//!
//! Rendering and input live outside the crate. A host builds a
//! [`WorldManager`], feeds it paddle positions and fixed time steps, and
//! reads back object locations and [`WorldEvent`]s.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{Result, WorldError};
pub use settings::SimSettings;
pub use sim::{
    BALL_NAME, BallState, ObjectKind, ObjectSnapshot, PADDLE_NAME, PhysicsLocation,
    PhysicsObject, WorldEvent, WorldManager,
};

/// Game configuration constants. The brick grid is sized to fit a 48x80 field.
pub mod consts {
    use glam::Vec2;

    /// Brick grid: center of brick (0, 0), world units
    pub const BRICK_POS_X: f32 = -20.0;
    pub const BRICK_POS_Y: f32 = 40.0;
    pub const BRICK_WIDTH: f32 = 6.0;
    pub const BRICK_HEIGHT: f32 = 3.0;
    pub const BRICK_ROWS: usize = 5;
    pub const BRICK_COLUMNS: usize = 5;
    /// Gap between neighbouring bricks
    pub const BRICK_SPACING: f32 = 4.0;
    /// Seconds between row activations; row `r` appears after `(r + 1)` waits
    pub const BRICK_WAIT: f32 = 1.0;

    /// Ball spawn and launch
    pub const BALL_POS_X: f32 = 0.0;
    pub const BALL_POS_Y: f32 = 15.0;
    pub const BALL_RADIUS: f32 = 2.0;
    pub const BALL_SPEED: f32 = 40.0;
    /// Radians from +x
    pub const BALL_LAUNCH_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

    /// Boundary walls sit just outside the field
    pub const WALL_THICKNESS: f32 = 1.0;
    pub const WALL_LENGTH: f32 = 1000.0;

    /// Paddle spawn and size
    pub const PADDLE_POS_X: f32 = 0.0;
    pub const PADDLE_POS_Y: f32 = 11.0;
    pub const PADDLE_WIDTH: f32 = 30.0;
    pub const PADDLE_HEIGHT: f32 = 3.0;

    /// Every contact is perfectly elastic
    pub const RESTITUTION: f32 = 1.0;
    pub const GRAVITY: Vec2 = Vec2::ZERO;

    /// Solver defaults
    pub const SUB_STEPS: u32 = 4;
    pub const VELOCITY_ITERATIONS: u32 = 8;
    pub const INTERNAL_ITERATIONS: u32 = 1;

    /// Brick color seed when none is configured
    pub const DEFAULT_SEED: u64 = 0x0B71_C4B1;
}
