//! Every component type the game attaches to entities
//!
//! The list in `component_map!` below is the single place a new component
//! type has to be registered.

use delve_ecs::{Entity, Registry};
use serde::{Deserialize, Serialize};

/// Grid cell occupied by an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell in direction `(dx, dy)`
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Chebyshev distance, i.e. the number of king moves between two cells
    pub fn distance(self, other: Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Glyph drawn for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    pub glyph: char,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub const fn full(max: i32) -> Self {
        Self { current: max, max }
    }

    pub const fn is_dead(&self) -> bool {
        self.current <= 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonsterKind {
    Rat,
    Goblin,
    Orc,
}

impl MonsterKind {
    pub const ALL: [MonsterKind; 3] = [MonsterKind::Rat, MonsterKind::Goblin, MonsterKind::Orc];

    pub const fn glyph(self) -> char {
        match self {
            MonsterKind::Rat => 'r',
            MonsterKind::Goblin => 'g',
            MonsterKind::Orc => 'o',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            MonsterKind::Rat => "rat",
            MonsterKind::Goblin => "goblin",
            MonsterKind::Orc => "orc",
        }
    }

    pub const fn max_health(self) -> i32 {
        match self {
            MonsterKind::Rat => 3,
            MonsterKind::Goblin => 7,
            MonsterKind::Orc => 12,
        }
    }
}

/// Marks a creature driven by the AI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub kind: MonsterKind,
}

/// Marks the entity the input layer controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Field-of-view radius in cells
    pub sight: i32,
}

impl Default for Player {
    fn default() -> Self {
        Self { sight: 8 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Potion,
    Scroll,
    Gold(u32),
}

impl ItemKind {
    pub const fn glyph(self) -> char {
        match self {
            ItemKind::Potion => '!',
            ItemKind::Scroll => '?',
            ItemKind::Gold(_) => '$',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
}

/// Items carried by an entity. Carried items keep their other components but lose `Position`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<Entity>,
}

delve_ecs::component_map! {
    /// One dense store per component type
    pub struct Components;

    /// Everything one entity may carry; used for spawning and describing
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct EntityComponents {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Position,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sprite: Sprite,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Name,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        health: Health,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        monster: Monster,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player: Player,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item: Item,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inventory: Inventory,
    }
}

/// The game's registry
pub type World = Registry<Components>;
