use std::any::type_name;
use std::collections::{HashMap, TryReserveError};
use std::iter::{Copied, Zip};
use std::slice;

use crate::entity::Entity;
use crate::error::{EcsError, Result};

/// `(Entity, &C)` pairs in current dense order.
pub type Iter<'a, C> = Zip<Copied<slice::Iter<'a, Entity>>, slice::Iter<'a, C>>;

/// `(Entity, &mut C)` pairs in current dense order.
pub type IterMut<'a, C> = Zip<Copied<slice::Iter<'a, Entity>>, slice::IterMut<'a, C>>;

/// Dense storage for every component of one type.
///
/// Components are packed in `components`; `index_entity[i]` names the owner of
/// `components[i]` and `entity_index[&e]` points back at `i`. Memory is
/// proportional to the number of stored components, not to the largest entity
/// id ever seen. Removal swaps the last slot into the hole, so iteration order
/// is not stable across removals.
///
/// Teardown is `Drop`: a component is dropped exactly once when it is removed,
/// overwritten, cleared, or when the set itself is dropped. Components shifted
/// by swap-removal are moved, never dropped.
#[derive(Debug)]
pub struct ArraySet<C> {
    components: Vec<C>,
    entity_index: HashMap<Entity, u32>,
    index_entity: Vec<Entity>,
}

impl<C> ArraySet<C> {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            entity_index: HashMap::new(),
            index_entity: Vec::new(),
        }
    }

    fn slot_of(&self, entity: Entity) -> Option<usize> {
        self.entity_index.get(&entity).map(|&slot| slot as usize)
    }

    fn out_of_memory(source: TryReserveError) -> EcsError {
        EcsError::OutOfMemory {
            component: type_name::<C>(),
            source,
        }
    }

    pub fn get_for_entity(&self, entity: Entity) -> Option<&C> {
        self.slot_of(entity).map(|slot| &self.components[slot])
    }

    pub fn get_for_entity_mut(&mut self, entity: Entity) -> Option<&mut C> {
        self.slot_of(entity).map(|slot| &mut self.components[slot])
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.slot_of(entity).is_some()
    }

    /// Attach `component` to `entity`, replacing (and dropping) any existing one in place.
    ///
    /// Appending a new slot may fail to allocate; the set is left untouched if it does.
    pub fn set_to_entity(&mut self, entity: Entity, component: C) -> Result<()> {
        debug_assert!(!entity.is_null(), "the null entity cannot hold components");

        if let Some(slot) = self.slot_of(entity) {
            self.components[slot] = component;
            return Ok(());
        }

        self.entity_index
            .try_reserve(1)
            .map_err(Self::out_of_memory)?;
        self.components
            .try_reserve(1)
            .map_err(Self::out_of_memory)?;
        self.index_entity
            .try_reserve(1)
            .map_err(Self::out_of_memory)?;

        // Everything below is within reserved capacity.
        let slot = self.components.len();
        self.components.push(component);
        self.index_entity.push(entity);
        self.entity_index.insert(entity, slot as u32);
        debug_assert_eq!(self.components.len(), self.index_entity.len());
        debug_assert_eq!(self.entity_index.len(), self.index_entity.len());
        Ok(())
    }

    /// Detach and return the component without dropping it.
    pub fn take_from_entity(&mut self, entity: Entity) -> Option<C> {
        let slot = self.entity_index.remove(&entity)? as usize;

        let removed = self.components.swap_remove(slot);
        self.index_entity.swap_remove(slot);
        if slot < self.index_entity.len() {
            let moved = self.index_entity[slot];
            self.entity_index.insert(moved, slot as u32);
        }
        debug_assert_eq!(self.components.len(), self.index_entity.len());
        debug_assert_eq!(self.entity_index.len(), self.index_entity.len());
        Some(removed)
    }

    /// Remove and drop the component. No-op if the entity has none.
    pub fn remove_from_entity(&mut self, entity: Entity) -> bool {
        self.take_from_entity(entity).is_some()
    }

    /// Drop every component and release the backing storage.
    pub fn clear(&mut self) {
        self.components = Vec::new();
        self.entity_index = HashMap::new();
        self.index_entity = Vec::new();
    }

    /// Drop every component but keep the allocations for reuse.
    pub fn clear_retaining_capacity(&mut self) {
        self.components.clear();
        self.entity_index.clear();
        self.index_entity.clear();
    }

    /// Reserve room for `additional` more components.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.components
            .try_reserve(additional)
            .map_err(Self::out_of_memory)?;
        self.entity_index
            .try_reserve(additional)
            .map_err(Self::out_of_memory)?;
        self.index_entity
            .try_reserve(additional)
            .map_err(Self::out_of_memory)
    }

    pub fn iter(&self) -> Iter<'_, C> {
        self.index_entity.iter().copied().zip(self.components.iter())
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, C> {
        self.index_entity
            .iter()
            .copied()
            .zip(self.components.iter_mut())
    }

    /// Owners of each dense slot, in iteration order.
    pub fn entities(&self) -> &[Entity] {
        &self.index_entity
    }

    pub fn components(&self) -> &[C] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Assert that the two index maps are exact inverses and agree with the dense array.
    ///
    /// # Panics
    /// Panics with a description of the first broken link.
    pub fn check_invariants(&self) {
        assert_eq!(
            self.components.len(),
            self.index_entity.len(),
            "dense array and owner list disagree in length"
        );
        let mapped = self.entity_index.len();
        assert_eq!(
            mapped,
            self.index_entity.len(),
            "entity index holds {mapped} entries for {} slots",
            self.index_entity.len()
        );
        for (slot, entity) in self.index_entity.iter().enumerate() {
            assert_eq!(
                self.slot_of(*entity),
                Some(slot),
                "{entity:?} owns slot {slot} but is not indexed to it"
            );
        }
    }
}

impl<C> Default for ArraySet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, C> IntoIterator for &'a ArraySet<C> {
    type Item = (Entity, &'a C);
    type IntoIter = Iter<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, C> IntoIterator for &'a mut ArraySet<C> {
    type Item = (Entity, &'a mut C);
    type IntoIter = IterMut<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
