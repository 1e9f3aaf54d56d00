//! Per-turn gameplay systems

use std::collections::HashSet;

use delve_ecs::Entity;
use rand::Rng;
use tracing::debug;

use crate::components::{Health, Inventory, Item, Monster, Position, World};

const STEPS: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Move every monster one random step, staying on the map and off occupied cells.
/// Returns how many monsters actually moved.
pub fn wander(world: &mut World, width: i32, height: i32, rng: &mut impl Rng) -> usize {
    let mut occupied: HashSet<Position> = world
        .query2::<Health, Position>()
        .map(|(_, _, pos)| *pos)
        .collect();

    // Monsters are the rarer store, so they lead the query.
    let movers: Vec<(Entity, Position)> = world
        .query2::<Monster, Position>()
        .map(|(entity, _, pos)| (entity, *pos))
        .collect();

    let mut moved = 0;
    for (entity, from) in movers {
        let (dx, dy) = STEPS[rng.gen_range(0..STEPS.len())];
        let to = from.offset(dx, dy);
        if to == from || !in_bounds(to, width, height) || occupied.contains(&to) {
            continue;
        }
        if let Some(pos) = world.get_mut::<Position>(entity) {
            *pos = to;
            occupied.remove(&from);
            occupied.insert(to);
            moved += 1;
        }
    }
    moved
}

fn in_bounds(pos: Position, width: i32, height: i32) -> bool {
    (0..width).contains(&pos.x) && (0..height).contains(&pos.y)
}

/// Move every item lying under `carrier` into its inventory.
/// Returns the items picked up, in item storage order.
pub fn pick_up(world: &mut World, carrier: Entity) -> Vec<Entity> {
    let Some(&at) = world.get::<Position>(carrier) else {
        return Vec::new();
    };
    if !world.has::<Inventory>(carrier) {
        return Vec::new();
    }

    let found: Vec<Entity> = world
        .query2::<Item, Position>()
        .filter(|(_, _, pos)| **pos == at)
        .map(|(entity, ..)| entity)
        .collect();

    for &item in &found {
        world.remove::<Position>(item);
    }
    if let Some(inventory) = world.get_mut::<Inventory>(carrier) {
        inventory.items.extend(found.iter().copied());
    }
    if !found.is_empty() {
        debug!("Entity {} picked up {} items", carrier, found.len());
    }
    found
}

/// Remove every entity whose health has run out. Returns the removed entities.
pub fn reap(world: &mut World) -> Vec<Entity> {
    let dead: Vec<Entity> = world
        .query::<Health>()
        .filter(|(_, health)| health.is_dead())
        .map(|(entity, _)| entity)
        .collect();
    for &entity in &dead {
        world.remove_entity(entity);
    }
    dead
}
