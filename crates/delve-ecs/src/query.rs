use crate::array_set::{ArraySet, Iter};
use crate::entity::Entity;

// Multi-type queries walk the first store in its dense order and look up the
// rest by entity. Cost grows with the first store's length, so callers should
// lead with the smallest store.

macro_rules! lookup_query {
    ($(#[$meta:meta])* $name:ident; $($Other:ident : $field:ident),+) => {
        $(#[$meta])*
        pub struct $name<'a, A, $($Other),+> {
            base: Iter<'a, A>,
            $( $field: &'a ArraySet<$Other>, )+
        }

        impl<'a, A, $($Other),+> $name<'a, A, $($Other),+> {
            pub(crate) fn new(base: &'a ArraySet<A>, $( $field: &'a ArraySet<$Other> ),+) -> Self {
                Self {
                    base: base.iter(),
                    $( $field, )+
                }
            }

            /// Look `entity` up in every other store, stopping at the first miss.
            fn lookup(&self, entity: Entity) -> Option<($( &'a $Other, )+)> {
                let ($( $field, )+) = ($( self.$field, )+);
                Some(($( $field.get_for_entity(entity)?, )+))
            }
        }

        impl<'a, A, $($Other),+> Iterator for $name<'a, A, $($Other),+> {
            type Item = (Entity, &'a A, $( &'a $Other ),+);

            fn next(&mut self) -> Option<Self::Item> {
                while let Some((entity, first)) = self.base.next() {
                    if let Some(($( $field, )+)) = self.lookup(entity) {
                        return Some((entity, first, $( $field ),+));
                    }
                }
                None
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                (0, self.base.size_hint().1)
            }
        }
    };
}

lookup_query!(
    /// Entities holding both `A` and `B`, in `A`'s storage order.
    Query2; B: b
);

lookup_query!(
    /// Entities holding `A`, `B` and `C`, in `A`'s storage order.
    Query3; B: b, C: c
);

lookup_query!(
    /// Entities holding `A`, `B`, `C` and `D`, in `A`'s storage order.
    Query4; B: b, C: c, D: d
);
