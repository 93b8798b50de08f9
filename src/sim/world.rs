//! World manager
//!
//! Owns the physics world, the object registry, the collision listener and
//! the brick spawner. Everything the game layer does to the simulation goes
//! through here: launch, paddle moves, fixed steps, hit registration and
//! reset.
//!
//! Every `update` keeps the same order: step the solver (contacts are only
//! recorded), then apply what was recorded, then spawn rows whose time has
//! come. Nothing mutates the body list while the solver is running.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{BodyDesc, BodyHandle, BodyType};
use super::listener::{CollisionListener, ContactKind};
use super::object::{
    BrickColor, ObjectKind, ObjectRole, ObjectSnapshot, PhysicsLocation, PhysicsObject, WallSide,
};
use super::physics::PhysicsWorld;
use super::registry::{ObjectId, ObjectRegistry};
use super::spawner::{BrickSpawner, brick_name, brick_position, grid_bounds};
use crate::consts::*;
use crate::error::{Result, WorldError};
use crate::settings::SimSettings;

/// Registry name of the ball
pub const BALL_NAME: &str = "Ball";
/// Registry name of the paddle
pub const PADDLE_NAME: &str = "Paddle";

/// Play field: `x` in `[-width/2, width/2]`, `y` in `[0, height]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    width: f32,
    height: f32,
}

impl Field {
    /// The field must fit the paddle across, the ball above the paddle and
    /// the whole brick grid inside the walls
    pub fn new(width: f32, height: f32) -> Result<Self> {
        let (grid_min, grid_max) = grid_bounds();
        let fits = width.is_finite()
            && height.is_finite()
            && width > PADDLE_WIDTH
            && height > BALL_POS_Y + BALL_RADIUS
            && grid_min.x >= -width * 0.5
            && grid_max.x <= width * 0.5
            && grid_max.y <= height;
        if !fits {
            return Err(WorldError::InvalidField { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    /// Paddle center moved as close to `target` as the walls allow
    pub fn clamp_paddle(&self, target: Vec2) -> Vec2 {
        let half = Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT) * 0.5;
        Vec2::new(
            target
                .x
                .clamp(-self.half_width() + half.x, self.half_width() - half.x),
            target.y.clamp(half.y, self.height - half.y),
        )
    }

    /// Center and half extents of a boundary wall
    fn wall(&self, side: WallSide) -> (Vec2, Vec2) {
        let t = WALL_THICKNESS;
        let across = WALL_LENGTH.max(self.width + 2.0 * t) * 0.5;
        let along = WALL_LENGTH.max(self.height + 2.0 * t) * 0.5;
        match side {
            WallSide::Left => (
                Vec2::new(-self.half_width() - t * 0.5, self.height * 0.5),
                Vec2::new(t * 0.5, along),
            ),
            WallSide::Right => (
                Vec2::new(self.half_width() + t * 0.5, self.height * 0.5),
                Vec2::new(t * 0.5, along),
            ),
            WallSide::Top => (
                Vec2::new(0.0, self.height + t * 0.5),
                Vec2::new(across, t * 0.5),
            ),
            WallSide::Ground => (Vec2::new(0.0, -t * 0.5), Vec2::new(across, t * 0.5)),
        }
    }
}

/// Ball lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    /// At its spawn point, waiting for launch
    AtRest,
    /// In play
    Launched,
    /// Dropped below the paddle; the host decides between `reset` and
    /// `respawn_ball`
    OutOfBounds,
}

/// Things the game layer may want to react to (sound, score, UI)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WorldEvent {
    /// Two objects started touching
    Contact { a: String, b: String },
    /// Two objects stopped touching
    ContactEnded { a: String, b: String },
    BrickDestroyed { name: String },
    RowSpawned { row: usize },
    BallOutOfBounds,
    /// Every brick of every row is gone
    Cleared,
}

pub struct WorldManager {
    field: Field,
    settings: SimSettings,
    physics: PhysicsWorld,
    registry: ObjectRegistry,
    listener: CollisionListener,
    spawner: BrickSpawner,
    /// Per-brick colors in row-major order, drawn from the seed at build time
    brick_colors: Vec<BrickColor>,
    ball_state: BallState,
    cleared_reported: bool,
    events: Vec<WorldEvent>,
    elapsed: f32,
}

impl WorldManager {
    /// Build a world for a `width` x `height` field with default settings
    pub fn new(width: f32, height: f32) -> Result<Self> {
        Self::with_settings(width, height, SimSettings::default())
    }

    pub fn with_settings(width: f32, height: f32, settings: SimSettings) -> Result<Self> {
        let field = Field::new(width, height)?;
        let mut world = Self {
            field,
            physics: PhysicsWorld::new(settings.solver),
            registry: ObjectRegistry::new(),
            listener: CollisionListener::new(),
            spawner: BrickSpawner::default(),
            brick_colors: Vec::new(),
            ball_state: BallState::AtRest,
            cleared_reported: false,
            events: Vec::new(),
            elapsed: 0.0,
            settings,
        };
        world.populate()?;
        log::info!(
            "world built: field {}x{}, {} objects, seed {}",
            width,
            height,
            world.registry.len(),
            world.settings.seed
        );
        Ok(world)
    }

    /// Lay out walls, paddle and ball and re-arm the spawner
    fn populate(&mut self) -> Result<()> {
        self.spawner = BrickSpawner::default();
        self.listener.clear();
        self.events.clear();
        self.ball_state = BallState::AtRest;
        self.cleared_reported = false;
        self.elapsed = 0.0;

        let mut rng = Pcg32::seed_from_u64(self.settings.seed);
        self.brick_colors = (0..BRICK_ROWS * BRICK_COLUMNS)
            .map(|_| BrickColor::ALL[rng.random_range(0..BrickColor::ALL.len())])
            .collect();

        for side in WallSide::ALL {
            let (center, half_extents) = self.field.wall(side);
            let wall = PhysicsObject::boxed(half_extents, PhysicsLocation::at(center))
                .with_role(ObjectRole::Wall(side));
            self.insert_object(side.name(), wall)?;
        }

        let paddle = PhysicsObject::paddle(
            Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT) * 0.5,
            PhysicsLocation::new(PADDLE_POS_X, PADDLE_POS_Y, 0.0),
        )
        .with_role(ObjectRole::Paddle);
        self.insert_object(PADDLE_NAME, paddle)?;

        let ball = PhysicsObject::circle(
            BALL_RADIUS,
            PhysicsLocation::new(BALL_POS_X, BALL_POS_Y, 0.0),
        )
        .with_role(ObjectRole::Ball);
        self.insert_object(BALL_NAME, ball)?;

        Ok(())
    }

    /// Register `object` and give it a body; on a duplicate name nothing
    /// is created
    fn insert_object(&mut self, name: &str, object: PhysicsObject) -> Result<ObjectId> {
        let body_type = match object.kind() {
            ObjectKind::Box => BodyType::Static,
            ObjectKind::Circle => BodyType::Dynamic,
            ObjectKind::Paddle => BodyType::Kinematic,
        };
        let location = object.location();
        let shape = object.shape();

        let id = self.registry.insert(name, object)?;
        let handle = self.physics.create_body(
            BodyDesc::new(body_type, shape, id)
                .with_position(location.position())
                .with_angle(location.theta)
                .with_restitution(RESTITUTION),
        );
        if let Some(object) = self.registry.get_mut(id) {
            object.body = Some(handle);
        }
        Ok(id)
    }

    fn body_of(&self, name: &str) -> Option<BodyHandle> {
        self.registry.find(name)?.body
    }

    /// Set the ball moving at `BALL_SPEED` along `BALL_LAUNCH_ANGLE`.
    /// Calling it again only resets the velocity.
    pub fn launch_ball(&mut self) {
        let Some(handle) = self.body_of(BALL_NAME) else {
            return;
        };
        let velocity = Vec2::from_angle(BALL_LAUNCH_ANGLE) * BALL_SPEED;
        if self.physics.set_linear_velocity(handle, velocity) {
            self.ball_state = BallState::Launched;
        }
    }

    /// Put the paddle at `(x, y)`, kept inside the walls. Velocity is not
    /// touched; drag input has to call this every frame.
    pub fn move_paddle(&mut self, x: f32, y: f32) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        let Some(handle) = self.body_of(PADDLE_NAME) else {
            return;
        };

        let target = self.field.clamp_paddle(Vec2::new(x, y));
        if self.physics.set_position(handle, target) {
            if let Some(paddle) = self.registry.find_mut(PADDLE_NAME) {
                paddle.location.x = target.x;
                paddle.location.y = target.y;
            }
        }
    }

    /// Advance the world by `dt` seconds. `dt <= 0` does nothing.
    pub fn update(&mut self, dt: f32) {
        if !(dt > 0.0) {
            return;
        }

        {
            let mut listener = self.listener.bind(&self.registry);
            self.physics.step(dt, &mut listener);
        }
        self.elapsed += dt;
        self.sync_locations();

        for record in self.listener.take_pending() {
            let (a, b) = record.names;
            match record.kind {
                ContactKind::BrickHit => {
                    self.events.push(WorldEvent::Contact { a, b: b.clone() });
                    self.register_hit(&b);
                }
                ContactKind::Began => self.events.push(WorldEvent::Contact { a, b }),
                ContactKind::Ended => self.events.push(WorldEvent::ContactEnded { a, b }),
            }
        }

        for row in self.spawner.advance(dt) {
            self.spawn_row(row);
        }

        self.check_out_of_bounds();

        if !self.cleared_reported && self.spawner.is_cleared() {
            self.cleared_reported = true;
            log::info!("all bricks cleared after {:.2}s", self.elapsed);
            self.events.push(WorldEvent::Cleared);
        }
    }

    fn sync_locations(&mut self) {
        let physics = &self.physics;
        for (_, object) in self.registry.iter_mut() {
            if let Some((position, angle)) = object.body.and_then(|handle| physics.pose(handle)) {
                object.location = PhysicsLocation::new(position.x, position.y, angle);
            }
        }
    }

    fn spawn_row(&mut self, row: usize) {
        let half_extents = Vec2::new(BRICK_WIDTH, BRICK_HEIGHT) * 0.5;
        let columns = self.spawner.columns();

        for column in 0..columns {
            let name = brick_name(row, column);
            let color = self
                .brick_colors
                .get(row * columns + column)
                .copied()
                .unwrap_or(BrickColor::Red);
            let brick = PhysicsObject::brick(
                row,
                column,
                half_extents,
                PhysicsLocation::at(brick_position(row, column)),
                color,
            );
            if let Err(err) = self.insert_object(&name, brick) {
                // Name taken by a custom object; count the brick as gone
                log::warn!("skipping {name}: {err}");
                self.spawner.brick_destroyed(row);
            }
        }

        log::info!("row {row} active ({columns} bricks)");
        self.events.push(WorldEvent::RowSpawned { row });
    }

    fn check_out_of_bounds(&mut self) {
        if self.ball_state != BallState::Launched {
            return;
        }
        let (Some(ball), Some(paddle)) = (
            self.registry.find(BALL_NAME),
            self.registry.find(PADDLE_NAME),
        ) else {
            return;
        };

        let ball_top = ball.location.y + ball.shape().half_extents().y;
        let paddle_bottom = paddle.location.y - paddle.shape().half_extents().y;
        if ball_top < paddle_bottom {
            log::debug!("ball out of bounds at y = {:.2}", ball.location.y);
            self.ball_state = BallState::OutOfBounds;
            self.events.push(WorldEvent::BallOutOfBounds);
        }
    }

    /// Destroy the named brick. Returns false, doing nothing, when the
    /// name is not a live brick (e.g. a second contact in the same step).
    pub fn register_hit(&mut self, brick_name: &str) -> bool {
        if !self
            .registry
            .find(brick_name)
            .is_some_and(PhysicsObject::is_brick)
        {
            return false;
        }

        self.remove_object(brick_name);
        log::debug!("brick {brick_name} destroyed");
        self.events.push(WorldEvent::BrickDestroyed {
            name: brick_name.to_string(),
        });
        true
    }

    /// Register a pre-built object and give it a body (box: static,
    /// circle: dynamic, paddle: kinematic). A taken name is rejected and
    /// the existing entry kept. Brick roles are reserved for the spawner,
    /// since they feed the per-row counts behind `is_cleared`.
    pub fn add_object(&mut self, name: &str, object: PhysicsObject) -> Result<ObjectId> {
        let result = if object.is_brick() {
            Err(WorldError::ReservedRole(name.to_string()))
        } else {
            self.insert_object(name, object)
        };
        result.inspect_err(|err| log::warn!("add_object rejected: {err}"))
    }

    pub fn get_object(&self, name: &str) -> Option<&PhysicsObject> {
        self.registry.find(name)
    }

    /// Take an object out of the world, destroying its body
    pub fn remove_object(&mut self, name: &str) -> Option<PhysicsObject> {
        let mut object = self.registry.remove(name)?;
        if let Some(handle) = object.body.take() {
            self.physics.remove_body(handle);
        }
        if let ObjectRole::Brick { row, .. } = object.role() {
            self.spawner.brick_destroyed(row);
        }
        Some(object)
    }

    /// Tear everything down and rebuild it as `new` did
    pub fn reset(&mut self) {
        self.physics.clear();
        self.registry.clear();
        if let Err(err) = self.populate() {
            log::error!("reset could not rebuild the world: {err}");
            return;
        }
        log::info!("world reset");
    }

    /// Put the ball back on its spawn point at rest, leaving bricks alone
    pub fn respawn_ball(&mut self) {
        let Some(handle) = self.body_of(BALL_NAME) else {
            return;
        };
        let spawn = Vec2::new(BALL_POS_X, BALL_POS_Y);
        self.physics.set_position(handle, spawn);
        self.physics.set_linear_velocity(handle, Vec2::ZERO);
        if let Some(ball) = self.registry.find_mut(BALL_NAME) {
            ball.location = PhysicsLocation::at(spawn);
        }
        self.ball_state = BallState::AtRest;
    }

    /// Every registered object, for drawing
    pub fn physics_objects(&self) -> impl Iterator<Item = (&str, &PhysicsObject)> + '_ {
        self.registry.iter()
    }

    /// Owned copies of every object, sorted by name
    pub fn snapshot(&self) -> Vec<ObjectSnapshot> {
        let mut snapshot: Vec<_> = self
            .registry
            .iter()
            .map(|(name, object)| ObjectSnapshot::new(name, object))
            .collect();
        snapshot.sort_by(|a, b| a.name.cmp(&b.name));
        snapshot
    }

    /// Events recorded since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn ball_state(&self) -> BallState {
        self.ball_state
    }

    pub fn ball_velocity(&self) -> Option<Vec2> {
        let handle = self.body_of(BALL_NAME)?;
        self.physics.linear_velocity(handle)
    }

    pub fn is_cleared(&self) -> bool {
        self.spawner.is_cleared()
    }

    pub fn spawner(&self) -> &BrickSpawner {
        &self.spawner
    }

    /// Rows whose bricks have appeared
    pub fn active_rows(&self) -> usize {
        self.spawner.active_rows()
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    /// Seconds simulated since build or the last reset
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn object_count(&self) -> usize {
        self.registry.len()
    }

    pub fn body_count(&self) -> usize {
        self.physics.num_bodies()
    }
}
