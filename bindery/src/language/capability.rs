use crate::language::{NamedTy, Ty};

/// A descriptor for an open capability interface: an abstract contract a
/// concrete container type may or may not implement.
///
/// Two capabilities ship with the crate: [`Capability::SEQUENCE`], a mutable
/// run of elements, and [`Capability::MAPPING`], a mutable keyed collection.
/// The arity of a capability is the number of type parameters it declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    name: &'static str,
    params: &'static [&'static str],
}

impl Capability {
    /// A mutable indexed sequence of elements, `Sequence<T>`.
    pub const SEQUENCE: Capability = Capability {
        name: "Sequence",
        params: &["T"],
    };

    /// A mutable keyed collection, `Mapping<K, V>`.
    pub const MAPPING: Capability = Capability {
        name: "Mapping",
        params: &["K", "V"],
    };

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// The closed interface instantiation for the given type arguments.
    pub fn interface_ty(&self, args: &[Ty]) -> Ty {
        debug_assert_eq!(args.len(), self.arity());
        Ty::Named(NamedTy {
            name: self.name.to_string(),
            args: args.to_vec(),
        })
    }

    /// The open interface type, with its own parameters unassigned.
    pub fn open_interface_ty(&self) -> Ty {
        Ty::Named(NamedTy {
            name: self.name.to_string(),
            args: self.params.iter().map(|p| Ty::param(*p)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_instantiation_round_trips_through_specialization() {
        let open = Capability::MAPPING.open_interface_ty();
        let closed = open.specialize(&[Ty::string(), Ty::int()]);
        assert_eq!(
            closed,
            Capability::MAPPING.interface_ty(&[Ty::string(), Ty::int()])
        );
    }
}
