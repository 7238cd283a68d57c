//! Static component type lists.
//!
//! A [`ComponentSet`] is a tuple of component types written where the runtime
//! needs a type list: registering components, defining object templates, and
//! building query signatures. Single types are written as one-element tuples:
//! `objects_with::<(Position,)>()`.

use crate::component::Component;
use crate::signature::Signature;
use crate::storage::ComponentStore;

/// A tuple of component types, usable wherever the runtime takes a type list.
///
/// Implemented for tuples of one through eight [`Component`] types.
pub trait ComponentSet {
    /// Registers every type in the set, in tuple order.
    fn register(store: &mut ComponentStore);

    /// Builds the signature covering every type in the set.
    ///
    /// # Panics
    ///
    /// Panics if any type in the set was never registered.
    fn signature(store: &ComponentStore) -> Signature;
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn register(store: &mut ComponentStore) {
                $(store.register::<$name>();)+
            }

            fn signature(store: &ComponentStore) -> Signature {
                let mut signature = Signature::default();
                $(signature.set(store.id_of::<$name>());)+
                signature
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::ComponentId;

    #[derive(Debug, Default)]
    struct Position;
    impl Component for Position {}

    #[derive(Debug, Default)]
    struct Velocity;
    impl Component for Velocity {}

    #[derive(Debug, Default)]
    struct Spin;
    impl Component for Spin {}

    #[test]
    fn test_register_assigns_tuple_order() {
        let mut store = ComponentStore::new();
        <(Position, Velocity, Spin)>::register(&mut store);
        assert_eq!(store.id_of::<Position>(), ComponentId(0));
        assert_eq!(store.id_of::<Velocity>(), ComponentId(1));
        assert_eq!(store.id_of::<Spin>(), ComponentId(2));
    }

    #[test]
    fn test_signature_covers_exactly_the_listed_types() {
        let mut store = ComponentStore::new();
        <(Position, Velocity, Spin)>::register(&mut store);
        let signature = <(Position, Spin)>::signature(&store);
        assert!(signature.contains(store.id_of::<Position>()));
        assert!(signature.contains(store.id_of::<Spin>()));
        assert!(!signature.contains(store.id_of::<Velocity>()));
    }
}
