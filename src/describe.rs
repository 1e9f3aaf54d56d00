//! One-line text descriptions of entities for the message log and look command

use delve_ecs::Entity;

use crate::components::{EntityComponents, ItemKind, Player, Position, World};

/// Describe `entity`, or `None` if it holds no components.
pub fn describe(world: &World, entity: Entity) -> Option<String> {
    let snapshot = world.snapshot(entity);
    if snapshot.is_empty() {
        return None;
    }
    Some(describe_snapshot(entity, &snapshot))
}

pub fn describe_snapshot(entity: Entity, snapshot: &EntityComponents) -> String {
    let mut line = match &snapshot.sprite {
        Some(sprite) => format!("[{}] ", sprite.glyph),
        None => String::new(),
    };

    match &snapshot.name {
        Some(name) => line.push_str(&name.0),
        None => line.push_str(&format!("entity {entity}")),
    }
    if let Some(pos) = &snapshot.position {
        line.push_str(&format!(" at ({}, {})", pos.x, pos.y));
    }
    if let Some(health) = &snapshot.health {
        line.push_str(&format!(", hp {}/{}", health.current, health.max));
    }
    if let Some(ItemKind::Gold(amount)) = snapshot.item.as_ref().map(|item| &item.kind) {
        line.push_str(&format!(", worth {amount}"));
    }
    if let Some(inventory) = &snapshot.inventory {
        line.push_str(&format!(", carrying {} items", inventory.items.len()));
    }
    if snapshot.player.is_some() {
        line.push_str(" (player)");
    }
    line
}

/// Describe every entity that is on the map, in position storage order.
pub fn describe_map(world: &World) -> Vec<String> {
    world
        .query::<Position>()
        .filter_map(|(entity, _)| describe(world, entity))
        .collect()
}

/// Describe what `viewer` can see within its sight radius, nearest first.
pub fn visible_from(world: &World, viewer: Entity) -> Vec<String> {
    let Some((&at, player)) = world.get2::<Position, Player>(viewer) else {
        return Vec::new();
    };
    let mut seen: Vec<(i32, Entity)> = world
        .query::<Position>()
        .filter(|(entity, _)| *entity != viewer)
        .map(|(entity, pos)| (pos.distance(at), entity))
        .filter(|(distance, _)| *distance <= player.sight)
        .collect();
    seen.sort();
    seen.into_iter()
        .filter_map(|(_, entity)| describe(world, entity))
        .collect()
}
