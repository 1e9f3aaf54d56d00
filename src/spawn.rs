//! Populates a freshly generated level with the player, monsters, and items

use std::collections::HashSet;

use delve_ecs::Entity;
use rand::Rng;
use tracing::info;

use crate::components::{
    EntityComponents, Health, Inventory, Item, ItemKind, Monster, MonsterKind, Name, Player,
    Position, Sprite, World,
};
use crate::settings::WorldSettings;

/// Spawn the player in the middle of the map
pub fn spawn_player(world: &mut World, at: Position) -> delve_ecs::Result<Entity> {
    world.spawn(EntityComponents {
        position: Some(at),
        sprite: Some(Sprite { glyph: '@' }),
        name: Some(Name("you".to_string())),
        health: Some(Health::full(20)),
        player: Some(Player::default()),
        inventory: Some(Inventory::default()),
        ..Default::default()
    })
}

pub fn spawn_monster(world: &mut World, kind: MonsterKind, at: Position) -> delve_ecs::Result<Entity> {
    world.spawn(EntityComponents {
        position: Some(at),
        sprite: Some(Sprite { glyph: kind.glyph() }),
        name: Some(Name(kind.name().to_string())),
        health: Some(Health::full(kind.max_health())),
        monster: Some(Monster { kind }),
        ..Default::default()
    })
}

pub fn spawn_item(world: &mut World, kind: ItemKind, at: Position) -> delve_ecs::Result<Entity> {
    let name = match kind {
        ItemKind::Potion => "potion".to_string(),
        ItemKind::Scroll => "scroll".to_string(),
        ItemKind::Gold(amount) => format!("{amount} gold"),
    };
    world.spawn(EntityComponents {
        position: Some(at),
        sprite: Some(Sprite { glyph: kind.glyph() }),
        name: Some(Name(name)),
        item: Some(Item { kind }),
        ..Default::default()
    })
}

/// Fill the level described by `settings`. Returns the player entity.
///
/// Creatures never share a cell. If the map is too small for the requested
/// population, spawning stops once it runs out of free cells.
pub fn populate(
    world: &mut World,
    settings: &WorldSettings,
    rng: &mut impl Rng,
) -> delve_ecs::Result<Entity> {
    let center = Position::new(settings.width / 2, settings.height / 2);
    let player = spawn_player(world, center)?;

    let mut occupied = HashSet::from([center]);
    let cells = (settings.width.max(0) as usize) * (settings.height.max(0) as usize);

    let mut monsters = 0;
    while monsters < settings.monster_count && occupied.len() < cells {
        let at = random_cell(settings, rng);
        if !occupied.insert(at) {
            continue;
        }
        let kind = MonsterKind::ALL[rng.gen_range(0..MonsterKind::ALL.len())];
        spawn_monster(world, kind, at)?;
        monsters += 1;
    }

    for _ in 0..settings.item_count {
        let at = random_cell(settings, rng);
        let kind = match rng.gen_range(0..3) {
            0 => ItemKind::Potion,
            1 => ItemKind::Scroll,
            _ => ItemKind::Gold(rng.gen_range(1..=50)),
        };
        spawn_item(world, kind, at)?;
    }

    info!(
        "Populated {}x{} level with {} monsters and {} items",
        settings.width, settings.height, monsters, settings.item_count
    );
    Ok(player)
}

fn random_cell(settings: &WorldSettings, rng: &mut impl Rng) -> Position {
    Position::new(
        rng.gen_range(0..settings.width.max(1)),
        rng.gen_range(0..settings.height.max(1)),
    )
}
