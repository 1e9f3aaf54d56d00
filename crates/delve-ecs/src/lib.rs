//! Delve ECS - Entity Component System
//!
//! The data layer behind every gameplay system in Delve.
//! Entities are plain monotonically issued ids; each component type lives in
//! its own dense [`ArraySet`], and the full set of types is declared once with
//! [`component_map!`], which routes typed access to the right store at compile time.

mod array_set;
mod component;
mod config;
mod entity;
mod error;
mod query;
mod registry;

pub use array_set::{ArraySet, Iter, IterMut};
pub use component::{Component, ComponentMap};
pub use config::RegistryConfig;
pub use entity::{Entity, EntityAllocator};
pub use error::{EcsError, Result};
pub use query::{Query2, Query3, Query4};
pub use registry::Registry;
