//! Delve - a terminal roguelike
//!
//! Headless runner: loads settings, populates a level, and simulates a fixed
//! number of turns, logging what happens. Rendering and input plug in on top
//! of the same `World`.

mod components;
mod describe;
mod logging;
mod settings;
mod spawn;
mod systems;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::components::World;
use crate::settings::GameSettings;

fn main() -> Result<()> {
    // Initialize logging
    let log_level = logging::init();
    let settings = GameSettings::load();
    logging::apply(&log_level, &settings.logging)?;

    info!("Starting Delve...");

    let mut world = World::with_config(&settings.ecs).context("Failed to create registry")?;

    let seed = settings.world.seed.unwrap_or_else(rand::random);
    info!("Level seed {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let player =
        spawn::populate(&mut world, &settings.world, &mut rng).context("Failed to populate level")?;

    for turn in 1..=settings.world.turns {
        let moved = systems::wander(
            &mut world,
            settings.world.width,
            settings.world.height,
            &mut rng,
        );
        let picked = systems::pick_up(&mut world, player);
        let reaped = systems::reap(&mut world);
        debug!(
            "Turn {}: {} monsters moved, {} items picked up, {} entities reaped",
            turn,
            moved,
            picked.len(),
            reaped.len()
        );
    }

    for line in describe::describe_map(&world) {
        debug!("{}", line);
    }
    for line in describe::visible_from(&world, player) {
        info!("You see {}", line);
    }
    for (name, len) in world.store_sizes() {
        debug!("{} store holds {} components", name, len);
    }

    if let Some(next) = world.next_entity() {
        info!("Next entity id would be {}", next);
    }

    if std::env::args().any(|arg| arg == "--write-settings") {
        settings.save()?;
    }
    Ok(())
}
