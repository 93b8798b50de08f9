//! Brick Physics headless driver
//!
//! Plays one game at 60 Hz with a paddle that tracks the ball, logs world
//! events, and prints the final object snapshot as JSON.
//!
//! Usage: `brick-physics [settings.json]`

use brick_physics::consts::PADDLE_POS_Y;
use brick_physics::{BALL_NAME, SimSettings, WorldEvent, WorldManager};

const FIELD_WIDTH: f32 = 48.0;
const FIELD_HEIGHT: f32 = 80.0;
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up after two minutes of game time
const MAX_FRAMES: u32 = 60 * 120;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading settings from {path}");
            SimSettings::from_json(&std::fs::read_to_string(path)?)?
        }
        None => SimSettings::default(),
    };

    let mut world = WorldManager::with_settings(FIELD_WIDTH, FIELD_HEIGHT, settings)?;
    world.launch_ball();

    let mut destroyed = 0;
    let mut lost = 0;
    for _ in 0..MAX_FRAMES {
        if let Some(ball) = world.get_object(BALL_NAME) {
            let x = ball.location().x;
            world.move_paddle(x, PADDLE_POS_Y);
        }
        world.update(FRAME_DT);

        let mut cleared = false;
        for event in world.drain_events() {
            match event {
                WorldEvent::BrickDestroyed { name } => {
                    destroyed += 1;
                    log::info!("{name} destroyed at {:.2}s", world.elapsed());
                }
                WorldEvent::BallOutOfBounds => {
                    lost += 1;
                    log::warn!("Ball lost, relaunching");
                    world.respawn_ball();
                    world.launch_ball();
                }
                WorldEvent::Cleared => cleared = true,
                other => log::debug!("{other:?}"),
            }
        }
        if cleared {
            log::info!("Cleared in {:.2}s", world.elapsed());
            break;
        }
    }

    log::info!(
        "Finished at {:.2}s: {destroyed} bricks destroyed, {lost} balls lost",
        world.elapsed()
    );
    println!("{}", serde_json::to_string_pretty(&world.snapshot())?);
    Ok(())
}
