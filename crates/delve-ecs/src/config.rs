use serde::{Deserialize, Serialize};

/// Registry construction settings. Embedded in the game's settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Slots reserved up front in every component store.
    pub initial_capacity: usize,
    /// First entity id to issue. Zero is treated as one.
    pub first_entity: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            first_entity: 1,
        }
    }
}
