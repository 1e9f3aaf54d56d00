use tracing::{debug, trace};

use crate::array_set::{ArraySet, Iter, IterMut};
use crate::component::{Component, ComponentMap};
use crate::config::RegistryConfig;
use crate::entity::{Entity, EntityAllocator};
use crate::error::Result;
use crate::query::{Query2, Query3, Query4};

/// The ECS façade. Owns every component store and the entity counter.
///
/// References handed out by `get*` and the query methods borrow the registry,
/// so no store can be mutated while one of them is alive.
pub struct Registry<M: ComponentMap> {
    components: Box<M>,
    entities: EntityAllocator,
}

impl<M: ComponentMap> Registry<M> {
    pub fn new() -> Self {
        debug!(
            "Registry created with {} component types",
            M::TYPE_NAMES.len()
        );
        Self {
            components: Box::default(),
            entities: EntityAllocator::new(),
        }
    }

    /// Create a registry with every store pre-reserved per `config`.
    pub fn with_config(config: &RegistryConfig) -> Result<Self> {
        let mut components = Box::<M>::default();
        components.reserve(config.initial_capacity)?;
        debug!(
            "Registry created with {} component types, capacity {}",
            M::TYPE_NAMES.len(),
            config.initial_capacity
        );
        Ok(Self {
            components,
            entities: EntityAllocator::starting_at(config.first_entity),
        })
    }

    // ---- Entity management ----

    /// Issue a fresh entity id. Ids are never reused.
    pub fn new_entity(&mut self) -> Entity {
        let entity = self.entities.allocate();
        trace!("Issued entity {}", entity);
        entity
    }

    /// Issue an entity and attach every component present in `components`.
    ///
    /// If a store fails to grow, the components already attached are removed
    /// again before the error is returned. The issued id stays retired.
    pub fn spawn(&mut self, components: M::Snapshot) -> Result<Entity> {
        let entity = self.new_entity();
        if let Err(e) = self.components.insert_snapshot(entity, components) {
            self.components.remove_entity(entity);
            return Err(e);
        }
        Ok(entity)
    }

    /// The id the next `new_entity` call will return, or `None` once the id space is spent.
    pub fn next_entity(&self) -> Option<Entity> {
        self.entities.peek()
    }

    /// Whether `entity` has at least one component. Scans every store.
    pub fn contains(&self, entity: Entity) -> bool {
        self.components.contains(entity)
    }

    /// Strip every component from `entity`. Returns how many were removed.
    pub fn remove_entity(&mut self, entity: Entity) -> usize {
        let removed = self.components.remove_entity(entity);
        trace!("Removed entity {} ({} components)", entity, removed);
        removed
    }

    /// Clone out whatever components `entity` currently has.
    pub fn snapshot(&self, entity: Entity) -> M::Snapshot {
        self.components.snapshot(entity)
    }

    /// Set every present field of `snapshot` on an existing entity.
    pub fn insert_snapshot(&mut self, entity: Entity, snapshot: M::Snapshot) -> Result<()> {
        self.components.insert_snapshot(entity, snapshot)
    }

    // ---- Component management ----

    pub fn store<C: Component<M>>(&self) -> &ArraySet<C> {
        C::store(&self.components)
    }

    fn store_mut<C: Component<M>>(&mut self) -> &mut ArraySet<C> {
        C::store_mut(&mut self.components)
    }

    /// Attach a component, replacing (and dropping) any existing one of the same type.
    pub fn set<C: Component<M>>(&mut self, entity: Entity, component: C) -> Result<()> {
        self.store_mut::<C>().set_to_entity(entity, component)
    }

    pub fn get<C: Component<M>>(&self, entity: Entity) -> Option<&C> {
        self.store::<C>().get_for_entity(entity)
    }

    pub fn get_mut<C: Component<M>>(&mut self, entity: Entity) -> Option<&mut C> {
        self.store_mut::<C>().get_for_entity_mut(entity)
    }

    /// Get a component the caller already knows is present.
    ///
    /// # Panics
    /// Panics if `entity` has no `C`.
    pub fn must_get<C: Component<M>>(&self, entity: Entity) -> &C {
        match self.get::<C>(entity) {
            Some(component) => component,
            None => panic!("entity {} has no {} component", entity, C::NAME),
        }
    }

    pub fn get2<A, B>(&self, entity: Entity) -> Option<(&A, &B)>
    where
        A: Component<M>,
        B: Component<M>,
    {
        Some((self.get::<A>(entity)?, self.get::<B>(entity)?))
    }

    pub fn get3<A, B, C>(&self, entity: Entity) -> Option<(&A, &B, &C)>
    where
        A: Component<M>,
        B: Component<M>,
        C: Component<M>,
    {
        Some((
            self.get::<A>(entity)?,
            self.get::<B>(entity)?,
            self.get::<C>(entity)?,
        ))
    }

    pub fn get4<A, B, C, D>(&self, entity: Entity) -> Option<(&A, &B, &C, &D)>
    where
        A: Component<M>,
        B: Component<M>,
        C: Component<M>,
        D: Component<M>,
    {
        Some((
            self.get::<A>(entity)?,
            self.get::<B>(entity)?,
            self.get::<C>(entity)?,
            self.get::<D>(entity)?,
        ))
    }

    pub fn has<C: Component<M>>(&self, entity: Entity) -> bool {
        self.store::<C>().contains(entity)
    }

    /// Remove and drop a component. Returns `true` if it was present.
    pub fn remove<C: Component<M>>(&mut self, entity: Entity) -> bool {
        self.store_mut::<C>().remove_from_entity(entity)
    }

    /// Detach a component and hand it back instead of dropping it.
    pub fn take<C: Component<M>>(&mut self, entity: Entity) -> Option<C> {
        self.store_mut::<C>().take_from_entity(entity)
    }

    /// Drop every `C` on every entity.
    pub fn remove_all<C: Component<M>>(&mut self) {
        let store = self.store_mut::<C>();
        debug!("Clearing {} {} components", store.len(), C::NAME);
        store.clear_retaining_capacity();
    }

    /// Drop every component of every type. Issued ids stay retired.
    pub fn clear(&mut self) {
        debug!("Clearing all component stores");
        self.components.clear();
    }

    /// Number of entities holding a `C`.
    pub fn len<C: Component<M>>(&self) -> usize {
        self.store::<C>().len()
    }

    /// `(type name, component count)` per store.
    pub fn store_sizes(&self) -> Vec<(&'static str, usize)> {
        self.components.store_sizes()
    }

    // ---- Queries ----

    /// Every `(entity, &C)` in `C`'s storage order.
    pub fn query<C: Component<M>>(&self) -> Iter<'_, C> {
        self.store::<C>().iter()
    }

    pub fn query_mut<C: Component<M>>(&mut self) -> IterMut<'_, C> {
        self.store_mut::<C>().iter_mut()
    }

    /// Entities holding both `A` and `B`, in `A`'s storage order.
    ///
    /// Cost is proportional to the number of `A` components; put the rarer type first.
    pub fn query2<A, B>(&self) -> Query2<'_, A, B>
    where
        A: Component<M>,
        B: Component<M>,
    {
        Query2::new(self.store::<A>(), self.store::<B>())
    }

    pub fn query3<A, B, C>(&self) -> Query3<'_, A, B, C>
    where
        A: Component<M>,
        B: Component<M>,
        C: Component<M>,
    {
        Query3::new(self.store::<A>(), self.store::<B>(), self.store::<C>())
    }

    pub fn query4<A, B, C, D>(&self) -> Query4<'_, A, B, C, D>
    where
        A: Component<M>,
        B: Component<M>,
        C: Component<M>,
        D: Component<M>,
    {
        Query4::new(
            self.store::<A>(),
            self.store::<B>(),
            self.store::<C>(),
            self.store::<D>(),
        )
    }
}

impl<M: ComponentMap> Default for Registry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ComponentMap> Drop for Registry<M> {
    fn drop(&mut self) {
        debug!(
            "Registry torn down, next entity would have been {:?}",
            self.entities.peek()
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::error::EcsError;

    #[derive(Debug, Clone, PartialEq)]
    struct Position {
        x: i32,
        y: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Sprite(char);

    #[derive(Debug, Clone, PartialEq)]
    struct Foo(u32);

    #[derive(Debug, Clone, PartialEq)]
    struct Bar(String);

    /// Shares its drop counter with every clone.
    #[derive(Debug, Clone)]
    struct Torch {
        fuel: u32,
        drops: Rc<Cell<usize>>,
    }

    impl Drop for Torch {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    crate::component_map! {
        struct TestComponents;

        #[derive(Debug, Clone, Default)]
        struct TestEntity {
            position: Position,
            sprite: Sprite,
            foo: Foo,
            bar: Bar,
            torch: Torch,
        }
    }

    type TestRegistry = Registry<TestComponents>;

    #[test]
    fn entity_ids_start_at_one_and_never_repeat() {
        let mut reg = TestRegistry::new();
        let a = reg.new_entity();
        let b = reg.new_entity();
        assert_eq!(a.id(), 1);
        assert_eq!(b.id(), 2);
        reg.set(a, Foo(1)).unwrap();
        reg.remove_entity(a);
        assert_eq!(reg.new_entity().id(), 3);
    }

    #[test]
    fn set_get_remove() {
        let mut reg = TestRegistry::new();
        let e = reg.new_entity();
        reg.set(e, Position { x: 3, y: 4 }).unwrap();
        assert_eq!(reg.get::<Position>(e), Some(&Position { x: 3, y: 4 }));
        assert!(reg.has::<Position>(e));
        assert!(!reg.has::<Sprite>(e));

        assert!(reg.remove::<Position>(e));
        assert_eq!(reg.get::<Position>(e), None);
        assert!(!reg.remove::<Position>(e));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut reg = TestRegistry::new();
        let e = reg.new_entity();
        reg.set(e, Position { x: 0, y: 0 }).unwrap();
        reg.get_mut::<Position>(e).unwrap().x = 9;
        assert_eq!(reg.must_get::<Position>(e).x, 9);
    }

    #[test]
    #[should_panic(expected = "has no Sprite component")]
    fn must_get_panics_when_absent() {
        let mut reg = TestRegistry::new();
        let e = reg.new_entity();
        reg.must_get::<Sprite>(e);
    }

    #[test]
    fn swap_removal_keeps_other_entities_intact() {
        let mut reg = TestRegistry::new();
        let a = reg.new_entity();
        let b = reg.new_entity();
        let c = reg.new_entity();
        reg.set(a, Foo(1)).unwrap();
        reg.set(b, Foo(2)).unwrap();
        reg.set(c, Foo(3)).unwrap();

        reg.remove::<Foo>(a);
        assert_eq!(reg.store::<Foo>().entities(), &[c, b]);
        assert_eq!(reg.get::<Foo>(c), Some(&Foo(3)));
        assert_eq!(reg.get::<Foo>(b), Some(&Foo(2)));
        reg.store::<Foo>().check_invariants();
    }

    #[test]
    fn overwrite_tears_down_previous_exactly_once() {
        let drops = Rc::new(Cell::new(0));
        let mut reg = TestRegistry::new();
        let e = reg.new_entity();
        reg.set(e, Torch { fuel: 1, drops: drops.clone() }).unwrap();
        reg.set(e, Torch { fuel: 2, drops: drops.clone() }).unwrap();

        assert_eq!(drops.get(), 1);
        assert_eq!(reg.len::<Torch>(), 1);
        assert_eq!(reg.must_get::<Torch>(e).fuel, 2);

        drop(reg);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn teardown_runs_for_remove_remove_all_and_take_skips_it() {
        let drops = Rc::new(Cell::new(0));
        let mut reg = TestRegistry::new();
        let entities: Vec<_> = (0..4).map(|_| reg.new_entity()).collect();
        for (fuel, &e) in entities.iter().enumerate() {
            reg.set(e, Torch { fuel: fuel as u32, drops: drops.clone() })
                .unwrap();
        }

        reg.remove::<Torch>(entities[0]);
        assert_eq!(drops.get(), 1);

        let taken = reg.take::<Torch>(entities[1]).unwrap();
        assert_eq!(taken.fuel, 1);
        assert_eq!(drops.get(), 1);

        reg.remove_all::<Torch>();
        assert_eq!(drops.get(), 3);
        assert_eq!(reg.len::<Torch>(), 0);

        drop(taken);
        assert_eq!(drops.get(), 4);
    }

    #[test]
    fn get_n_requires_every_type() {
        let mut reg = TestRegistry::new();
        let e = reg.new_entity();
        reg.set(e, Position { x: 1, y: 2 }).unwrap();
        reg.set(e, Sprite('g')).unwrap();
        reg.set(e, Foo(5)).unwrap();

        assert_eq!(
            reg.get2::<Position, Sprite>(e),
            Some((&Position { x: 1, y: 2 }, &Sprite('g')))
        );
        assert!(reg.get3::<Position, Sprite, Foo>(e).is_some());
        assert!(reg.get3::<Position, Sprite, Bar>(e).is_none());
        assert!(reg.get4::<Position, Sprite, Foo, Bar>(e).is_none());

        reg.set(e, Bar("b".into())).unwrap();
        let (_, _, foo, bar) = reg.get4::<Position, Sprite, Foo, Bar>(e).unwrap();
        assert_eq!((foo, bar), (&Foo(5), &Bar("b".into())));
    }

    #[test]
    fn query2_yields_entities_with_both_in_first_store_order() {
        let mut reg = TestRegistry::new();
        let e1 = reg.new_entity();
        let e2 = reg.new_entity();
        let e3 = reg.new_entity();
        let e4 = reg.new_entity();
        reg.set(e1, Foo(1)).unwrap();
        reg.set(e1, Bar("one".into())).unwrap();
        reg.set(e2, Foo(2)).unwrap();
        reg.set(e3, Bar("three".into())).unwrap();
        reg.set(e4, Foo(4)).unwrap();
        reg.set(e4, Bar("four".into())).unwrap();

        let found: Vec<_> = reg.query2::<Foo, Bar>().map(|(e, ..)| e).collect();
        assert_eq!(found, vec![e1, e4]);

        // Order follows the first store, which a removal reshuffles.
        reg.remove::<Foo>(e1);
        reg.set(e1, Foo(1)).unwrap();
        let found: Vec<_> = reg.query2::<Foo, Bar>().map(|(e, ..)| e).collect();
        assert_eq!(found, vec![e4, e1]);
    }

    #[test]
    fn query3_and_query4() {
        let mut reg = TestRegistry::new();
        let full = reg.new_entity();
        let partial = reg.new_entity();
        for e in [full, partial] {
            reg.set(e, Position { x: 0, y: 0 }).unwrap();
            reg.set(e, Sprite('k')).unwrap();
            reg.set(e, Foo(0)).unwrap();
        }
        reg.set(full, Bar("all".into())).unwrap();

        assert_eq!(reg.query3::<Position, Sprite, Foo>().count(), 2);
        let found: Vec<_> = reg
            .query4::<Position, Sprite, Foo, Bar>()
            .map(|(e, ..)| e)
            .collect();
        assert_eq!(found, vec![full]);
    }

    #[test]
    fn query_mut_edits_every_component() {
        let mut reg = TestRegistry::new();
        for x in 0..3 {
            let e = reg.new_entity();
            reg.set(e, Position { x, y: 0 }).unwrap();
        }
        for (_, pos) in reg.query_mut::<Position>() {
            pos.y = pos.x * 2;
        }
        assert!(reg.query::<Position>().all(|(_, p)| p.y == p.x * 2));
    }

    #[test]
    fn remove_entity_strips_every_store() {
        let mut reg = TestRegistry::new();
        let e = reg.new_entity();
        let other = reg.new_entity();
        reg.set(e, Position { x: 1, y: 1 }).unwrap();
        reg.set(e, Foo(1)).unwrap();
        reg.set(other, Foo(2)).unwrap();
        assert!(reg.contains(e));

        assert_eq!(reg.remove_entity(e), 2);
        assert!(!reg.contains(e));
        assert!(reg.get::<Position>(e).is_none());
        assert!(reg.get::<Sprite>(e).is_none());
        assert!(reg.get::<Foo>(e).is_none());
        assert!(reg.get::<Bar>(e).is_none());
        assert!(reg.get::<Torch>(e).is_none());
        assert_eq!(reg.get::<Foo>(other), Some(&Foo(2)));
    }

    #[test]
    fn snapshot_reports_only_present_components() {
        let mut reg = TestRegistry::new();
        let e = reg.new_entity();
        reg.set(e, Bar("stored".into())).unwrap();

        let snap = reg.snapshot(e);
        assert!(snap.foo.is_none());
        assert_eq!(snap.bar, Some(Bar("stored".into())));
        assert!(!snap.is_empty());

        let empty = reg.new_entity();
        assert!(reg.snapshot(empty).is_empty());
    }

    #[test]
    fn spawn_sets_every_present_field() {
        let mut reg = TestRegistry::new();
        let e = reg
            .spawn(TestEntity {
                position: Some(Position { x: 2, y: 5 }),
                sprite: Some(Sprite('r')),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(e.id(), 1);
        assert_eq!(reg.get::<Position>(e), Some(&Position { x: 2, y: 5 }));
        assert_eq!(reg.get::<Sprite>(e), Some(&Sprite('r')));
        assert!(!reg.has::<Foo>(e));

        let copy = reg.new_entity();
        reg.insert_snapshot(copy, reg.snapshot(e)).unwrap();
        assert_eq!(reg.get2::<Position, Sprite>(copy), reg.get2::<Position, Sprite>(e));
    }

    #[test]
    fn position_sprite_scenario() {
        let mut reg = TestRegistry::new();
        let e = reg.new_entity();
        reg.set(e, Position { x: 1, y: 1 }).unwrap();
        reg.set(e, Sprite('@')).unwrap();

        let found: Vec<_> = reg.query2::<Position, Sprite>().collect();
        assert_eq!(found, vec![(e, &Position { x: 1, y: 1 }, &Sprite('@'))]);

        reg.remove::<Sprite>(e);
        assert_eq!(reg.query2::<Position, Sprite>().count(), 0);
    }

    #[test]
    fn config_reserves_and_offsets_ids() {
        let config = RegistryConfig {
            initial_capacity: 32,
            first_entity: 100,
        };
        let mut reg = TestRegistry::with_config(&config).unwrap();
        assert_eq!(reg.next_entity(), Some(Entity::from_raw(100)));
        assert_eq!(reg.new_entity().id(), 100);
        assert!(reg.store_sizes().iter().all(|(_, len)| *len == 0));
    }

    #[test]
    fn clear_and_store_sizes() {
        let mut reg = TestRegistry::new();
        let e = reg.new_entity();
        reg.set(e, Position { x: 0, y: 0 }).unwrap();
        reg.set(e, Foo(0)).unwrap();
        let sizes = reg.store_sizes();
        assert_eq!(
            sizes,
            vec![
                ("Position", 1),
                ("Sprite", 0),
                ("Foo", 1),
                ("Bar", 0),
                ("Torch", 0)
            ]
        );
        assert_eq!(TestComponents::TYPE_NAMES.len(), 5);

        reg.clear();
        assert!(!reg.contains(e));
        assert_eq!(reg.next_entity(), Some(Entity::from_raw(2)));
    }

    #[test]
    fn last_configured_id_is_issued() {
        let config = RegistryConfig {
            first_entity: u32::MAX,
            ..RegistryConfig::default()
        };
        let mut reg = TestRegistry::with_config(&config).unwrap();
        let last = reg.new_entity();
        assert_eq!(last.id(), u32::MAX);
        reg.set(last, Foo(1)).unwrap();
        assert_eq!(reg.get::<Foo>(last), Some(&Foo(1)));
        assert_eq!(reg.next_entity(), None);
    }

    /// Applies the `u16` half of a snapshot, then refuses the `u64` half.
    #[derive(Default)]
    struct HalfFilled {
        small: ArraySet<u16>,
        large: ArraySet<u64>,
    }

    impl ComponentMap for HalfFilled {
        type Snapshot = (Option<u16>, Option<u64>);

        const TYPE_NAMES: &'static [&'static str] = &["u16", "u64"];

        fn contains(&self, entity: Entity) -> bool {
            self.small.contains(entity) || self.large.contains(entity)
        }

        fn remove_entity(&mut self, entity: Entity) -> usize {
            usize::from(self.small.remove_from_entity(entity))
                + usize::from(self.large.remove_from_entity(entity))
        }

        fn clear(&mut self) {
            self.small.clear();
            self.large.clear();
        }

        fn clear_retaining_capacity(&mut self) {
            self.small.clear_retaining_capacity();
            self.large.clear_retaining_capacity();
        }

        fn reserve(&mut self, additional: usize) -> Result<()> {
            self.small.reserve(additional)?;
            self.large.reserve(additional)
        }

        fn snapshot(&self, entity: Entity) -> Self::Snapshot {
            (
                self.small.get_for_entity(entity).copied(),
                self.large.get_for_entity(entity).copied(),
            )
        }

        fn insert_snapshot(&mut self, entity: Entity, snapshot: Self::Snapshot) -> Result<()> {
            if let Some(small) = snapshot.0 {
                self.small.set_to_entity(entity, small)?;
            }
            if snapshot.1.is_some() {
                return Err(EcsError::InvalidEntity("large store refuses".into()));
            }
            Ok(())
        }

        fn store_sizes(&self) -> Vec<(&'static str, usize)> {
            vec![("u16", self.small.len()), ("u64", self.large.len())]
        }
    }

    impl Component<HalfFilled> for u16 {
        const NAME: &'static str = "u16";

        fn store(map: &HalfFilled) -> &ArraySet<Self> {
            &map.small
        }

        fn store_mut(map: &mut HalfFilled) -> &mut ArraySet<Self> {
            &mut map.small
        }
    }

    #[test]
    fn failed_spawn_leaves_no_partial_entity() {
        let mut reg = Registry::<HalfFilled>::new();
        let err = reg.spawn((Some(7), Some(9))).unwrap_err();
        assert!(matches!(err, EcsError::InvalidEntity(_)));

        let issued = Entity::from_raw(1);
        assert!(!reg.contains(issued));
        assert_eq!(reg.len::<u16>(), 0);
        assert_eq!(reg.next_entity(), Some(Entity::from_raw(2)));

        let spawned = reg.spawn((Some(7), None)).unwrap();
        assert_eq!(spawned.id(), 2);
        assert_eq!(reg.get::<u16>(spawned), Some(&7));
    }
}
