use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EcsError;

/// An opaque entity handle. Ids are issued monotonically from 1 and never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(u32);

impl Entity {
    /// The reserved sentinel id. Never issued by a registry.
    pub const NULL: Entity = Entity(0);

    /// Create an entity from a raw id (mainly for testing).
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// The integer id of this entity.
    pub const fn id(self) -> u32 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Entity {
    type Err = EcsError;

    /// Parse the decimal form written by `Display`. The null id is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: u32 = s
            .trim()
            .parse()
            .map_err(|e| EcsError::InvalidEntity(format!("'{s}': {e}")))?;
        if id == 0 {
            return Err(EcsError::InvalidEntity(format!(
                "'{s}': id 0 is reserved"
            )));
        }
        Ok(Self(id))
    }
}

/// Issues entity ids. There is no free list: an id, once handed out, is never seen again.
#[derive(Debug, Clone)]
pub struct EntityAllocator {
    /// `None` once `u32::MAX` has been issued.
    next: Option<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Start issuing at `first`. Zero is bumped to one so the sentinel stays unused.
    pub fn starting_at(first: u32) -> Self {
        Self {
            next: Some(first.max(1)),
        }
    }

    /// Issue the next id. `u32::MAX` itself is a valid id.
    ///
    /// # Panics
    /// Panics when called again after `u32::MAX` has been issued.
    pub fn allocate(&mut self) -> Entity {
        let Some(id) = self.next else {
            panic!("entity id space exhausted");
        };
        self.next = id.checked_add(1);
        Entity(id)
    }

    /// The id the next call to `allocate` will return, if any are left.
    pub fn peek(&self) -> Option<Entity> {
        self.next.map(Entity)
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
