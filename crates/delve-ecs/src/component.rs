use crate::array_set::ArraySet;
use crate::entity::Entity;
use crate::error::Result;

/// A component type registered in the map `M`.
///
/// Implemented by [`component_map!`](crate::component_map); each impl routes the
/// type to its own field of the map, so lookups are resolved at compile time.
pub trait Component<M>: Sized {
    /// The type's name as written in the map declaration.
    const NAME: &'static str;

    fn store(map: &M) -> &ArraySet<Self>;
    fn store_mut(map: &mut M) -> &mut ArraySet<Self>;
}

/// The fixed set of component stores behind a registry.
///
/// Implemented by [`component_map!`](crate::component_map). Operations here
/// fan out across every declared store.
pub trait ComponentMap: Default {
    /// Struct of `Option`s, one field per component type.
    type Snapshot;

    /// Names of the declared component types, in declaration order.
    const TYPE_NAMES: &'static [&'static str];

    /// Whether any store holds a component for `entity`.
    fn contains(&self, entity: Entity) -> bool;

    /// Remove `entity` from every store. Returns how many components were dropped.
    fn remove_entity(&mut self, entity: Entity) -> usize;

    fn clear(&mut self);
    fn clear_retaining_capacity(&mut self);

    /// Reserve `additional` slots in every store.
    fn reserve(&mut self, additional: usize) -> Result<()>;

    /// Clone out whatever components `entity` currently has.
    fn snapshot(&self, entity: Entity) -> Self::Snapshot;

    /// Set every present field of `snapshot` on `entity`.
    ///
    /// Stores are filled in declaration order; if one fails to grow, the
    /// fields before it have already been applied.
    fn insert_snapshot(&mut self, entity: Entity, snapshot: Self::Snapshot) -> Result<()>;

    /// `(type name, component count)` for every store, in declaration order.
    fn store_sizes(&self) -> Vec<(&'static str, usize)>;
}

/// Declare a component map and its snapshot struct.
///
/// ```
/// use delve_ecs::Registry;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Position { x: i32, y: i32 }
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Sprite(char);
///
/// delve_ecs::component_map! {
///     /// Every component the game knows about.
///     struct Components;
///
///     #[derive(Debug, Clone, Default, PartialEq)]
///     struct EntityComponents {
///         position: Position,
///         sprite: Sprite,
///     }
/// }
///
/// let mut world = Registry::<Components>::new();
/// let hero = world
///     .spawn(EntityComponents {
///         position: Some(Position { x: 1, y: 2 }),
///         sprite: Some(Sprite('@')),
///     })
///     .unwrap();
/// assert_eq!(world.get::<Sprite>(hero), Some(&Sprite('@')));
/// assert_eq!(world.snapshot(hero).position, Some(Position { x: 1, y: 2 }));
/// ```
///
/// This expands to `Components`, holding one [`ArraySet`] per listed type, and
/// `EntityComponents`, with one `pub Option<T>` field per type. Each listed type
/// must be `Clone` (snapshots copy components out). Listing a type twice is a
/// compile error: the two generated `Component` impls conflict.
///
/// ```compile_fail
/// #[derive(Clone)]
/// struct Gold(u32);
///
/// delve_ecs::component_map! {
///     struct Loot;
///
///     struct LootSnapshot {
///         gold: Gold,
///         more_gold: Gold,
///     }
/// }
/// ```
#[macro_export]
macro_rules! component_map {
    (
        $(#[$map_meta:meta])*
        $map_vis:vis struct $map:ident;

        $(#[$snap_meta:meta])*
        $snap_vis:vis struct $snapshot:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty
            ),+ $(,)?
        }
    ) => {
        $(#[$map_meta])*
        #[derive(Default)]
        $map_vis struct $map {
            $( $field: $crate::ArraySet<$ty>, )+
        }

        $(#[$snap_meta])*
        $snap_vis struct $snapshot {
            $(
                $(#[$field_meta])*
                pub $field: ::core::option::Option<$ty>,
            )+
        }

        impl $snapshot {
            /// True when no field is set.
            #[allow(dead_code)]
            pub fn is_empty(&self) -> bool {
                true $( && self.$field.is_none() )+
            }
        }

        impl $crate::ComponentMap for $map {
            type Snapshot = $snapshot;

            const TYPE_NAMES: &'static [&'static str] = &[$( stringify!($ty) ),+];

            fn contains(&self, entity: $crate::Entity) -> bool {
                false $( || self.$field.contains(entity) )+
            }

            fn remove_entity(&mut self, entity: $crate::Entity) -> usize {
                let mut removed = 0;
                $( removed += usize::from(self.$field.remove_from_entity(entity)); )+
                removed
            }

            fn clear(&mut self) {
                $( self.$field.clear(); )+
            }

            fn clear_retaining_capacity(&mut self) {
                $( self.$field.clear_retaining_capacity(); )+
            }

            fn reserve(&mut self, additional: usize) -> $crate::Result<()> {
                $( self.$field.reserve(additional)?; )+
                Ok(())
            }

            fn snapshot(&self, entity: $crate::Entity) -> $snapshot {
                $snapshot {
                    $( $field: self.$field.get_for_entity(entity).cloned(), )+
                }
            }

            fn insert_snapshot(
                &mut self,
                entity: $crate::Entity,
                snapshot: $snapshot,
            ) -> $crate::Result<()> {
                $(
                    if let ::core::option::Option::Some(component) = snapshot.$field {
                        self.$field.set_to_entity(entity, component)?;
                    }
                )+
                Ok(())
            }

            fn store_sizes(&self) -> ::std::vec::Vec<(&'static str, usize)> {
                ::std::vec![$( (stringify!($ty), self.$field.len()) ),+]
            }
        }

        $(
            impl $crate::Component<$map> for $ty {
                const NAME: &'static str = stringify!($ty);

                fn store(map: &$map) -> &$crate::ArraySet<Self> {
                    &map.$field
                }

                fn store_mut(map: &mut $map) -> &mut $crate::ArraySet<Self> {
                    &mut map.$field
                }
            }
        )+
    };
}
