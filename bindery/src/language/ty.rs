use std::fmt::{Debug, Formatter};

use ahash::HashMap;
use indexmap::IndexSet;

/// A description of a binding target type.
///
/// `Ty` is what the binding subsystem reasons about instead of runtime
/// reflection: a scalar kind, a binary payload, a nominal type with zero or
/// more generic arguments, or an unassigned generic type parameter.
///
/// A `Ty` that contains no [`Ty::Param`] anywhere is *closed*; a `Ty` with
/// at least one is *open* and can be [specialized](Self::specialize) into a
/// closed one.
#[derive(serde::Serialize, serde::Deserialize, Eq, PartialEq, Hash, Clone)]
pub enum Ty {
    Scalar(ScalarKind),
    Bytes,
    Named(NamedTy),
    Param(String),
}

/// The scalar kinds a raw value can be converted into.
#[derive(serde::Serialize, serde::Deserialize, Eq, PartialEq, Hash, Clone, Copy)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    String,
}

/// A nominal type: a name plus its ordered generic arguments.
#[derive(serde::Serialize, serde::Deserialize, Eq, PartialEq, Hash, Clone)]
pub struct NamedTy {
    pub name: String,
    pub args: Vec<Ty>,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::String => "string",
        }
    }
}

/// Which capability interfaces each built-in container type implements.
fn implemented_interfaces(container: &str) -> &'static [&'static str] {
    match container {
        "Vec" => &["Sequence"],
        "Map" => &["Mapping"],
        _ => &[],
    }
}

impl Ty {
    pub fn bool() -> Self {
        Ty::Scalar(ScalarKind::Bool)
    }

    pub fn int() -> Self {
        Ty::Scalar(ScalarKind::Int)
    }

    pub fn float() -> Self {
        Ty::Scalar(ScalarKind::Float)
    }

    pub fn string() -> Self {
        Ty::Scalar(ScalarKind::String)
    }

    pub fn param(name: impl Into<String>) -> Self {
        Ty::Param(name.into())
    }

    /// A concrete growable sequence, `Vec<elem>`.
    pub fn vec(elem: Ty) -> Self {
        Ty::Named(NamedTy {
            name: "Vec".into(),
            args: vec![elem],
        })
    }

    /// A concrete ordered mapping, `Map<key, value>`.
    pub fn map(key: Ty, value: Ty) -> Self {
        Ty::Named(NamedTy {
            name: "Map".into(),
            args: vec![key, value],
        })
    }

    /// The closed `Sequence<elem>` capability interface.
    pub fn sequence(elem: Ty) -> Self {
        Ty::Named(NamedTy {
            name: "Sequence".into(),
            args: vec![elem],
        })
    }

    /// The closed `Mapping<key, value>` capability interface.
    pub fn mapping(key: Ty, value: Ty) -> Self {
        Ty::Named(NamedTy {
            name: "Mapping".into(),
            args: vec![key, value],
        })
    }

    /// A record type with no generic arguments (a multi-property model).
    pub fn record(name: impl Into<String>) -> Self {
        Ty::Named(NamedTy {
            name: name.into(),
            args: Vec::new(),
        })
    }

    /// The open `Vec<T>` container, ready to be specialized.
    pub fn open_vec() -> Self {
        Ty::Named(NamedTy {
            name: "Vec".into(),
            args: vec![Ty::param("T")],
        })
    }

    /// The open `Map<K, V>` container, ready to be specialized.
    pub fn open_map() -> Self {
        Ty::Named(NamedTy {
            name: "Map".into(),
            args: vec![Ty::param("K"), Ty::param("V")],
        })
    }

    /// Returns `true` if this is a generic instantiation with all of its
    /// arguments assigned.
    ///
    /// A non-generic type is not a closed generic instantiation, and neither
    /// is an open one (a generic definition with unassigned parameters).
    pub fn is_closed_generic(&self) -> bool {
        match self {
            Ty::Named(named) => !named.args.is_empty() && !self.has_unassigned_params(),
            _ => false,
        }
    }

    /// The ordered generic arguments, empty for anything but a nominal type.
    pub fn generic_arguments(&self) -> &[Ty] {
        match self {
            Ty::Named(named) => &named.args,
            _ => &[],
        }
    }

    /// Complex types are bound property-by-property or element-by-element;
    /// simple ones come out of a single raw value.
    pub fn is_complex(&self) -> bool {
        matches!(self, Ty::Named(_) | Ty::Param(_))
    }

    /// Check whether the type still carries unassigned generic parameters.
    #[tracing::instrument(level = "trace", ret)]
    pub fn has_unassigned_params(&self) -> bool {
        match self {
            Ty::Scalar(_) | Ty::Bytes => false,
            Ty::Named(named) => named.args.iter().any(Ty::has_unassigned_params),
            Ty::Param(_) => true,
        }
    }

    /// The names of all unassigned generic parameters, in order of first
    /// appearance.
    pub fn unassigned_params(&self) -> IndexSet<String> {
        let mut set = IndexSet::new();
        self.collect_unassigned_params(&mut set);
        set
    }

    fn collect_unassigned_params(&self, set: &mut IndexSet<String>) {
        match self {
            Ty::Scalar(_) | Ty::Bytes => {}
            Ty::Named(named) => {
                for arg in &named.args {
                    arg.collect_unassigned_params(set);
                }
            }
            Ty::Param(name) => {
                set.insert(name.clone());
            }
        }
    }

    /// Replace unassigned generic parameters with the concrete types defined
    /// in `bindings`.
    ///
    /// Parameters without an entry in `bindings` are left unassigned, so this
    /// can also be used to partially bind an open type.
    pub fn bind_type_parameters(&self, bindings: &HashMap<String, Ty>) -> Ty {
        match self {
            Ty::Scalar(_) | Ty::Bytes => self.clone(),
            Ty::Named(named) => Ty::Named(NamedTy {
                name: named.name.clone(),
                args: named
                    .args
                    .iter()
                    .map(|arg| arg.bind_type_parameters(bindings))
                    .collect(),
            }),
            Ty::Param(name) => match bindings.get(name) {
                Some(bound) => bound.clone(),
                None => self.clone(),
            },
        }
    }

    /// Close an open type by assigning `args` to its unassigned parameters,
    /// positionally, in order of first appearance.
    pub fn specialize(&self, args: &[Ty]) -> Ty {
        let params = self.unassigned_params();
        debug_assert_eq!(
            params.len(),
            args.len(),
            "wrong number of type arguments for {self:?}"
        );
        let bindings: HashMap<String, Ty> =
            params.into_iter().zip(args.iter().cloned()).collect();
        self.bind_type_parameters(&bindings)
    }

    /// Check whether a slot declared as `self` can hold a `candidate` value.
    ///
    /// True when the types are equal, or when `self` is the closed capability
    /// interface that `candidate`'s container implements with identical
    /// arguments.
    pub fn is_assignable_from(&self, candidate: &Ty) -> bool {
        if self == candidate {
            return true;
        }
        let (Ty::Named(declared), Ty::Named(candidate)) = (self, candidate) else {
            return false;
        };
        declared.args == candidate.args
            && implemented_interfaces(&candidate.name).contains(&declared.name.as_str())
    }
}

impl Debug for Ty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ty::Scalar(kind) => write!(f, "{}", kind.name()),
            Ty::Bytes => write!(f, "bytes"),
            Ty::Named(named) => write!(f, "{named:?}"),
            Ty::Param(name) => write!(f, "{name}"),
        }
    }
}

impl Debug for ScalarKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Debug for NamedTy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            let mut args = self.args.iter().peekable();
            while let Some(arg) = args.next() {
                write!(f, "{arg:?}")?;
                if args.peek().is_some() {
                    write!(f, ", ")?;
                }
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl From<NamedTy> for Ty {
    fn from(value: NamedTy) -> Self {
        Ty::Named(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_and_open_generics_are_told_apart() {
        assert!(Ty::vec(Ty::int()).is_closed_generic());
        assert!(Ty::map(Ty::string(), Ty::float()).is_closed_generic());
        assert!(!Ty::open_vec().is_closed_generic());
        assert!(!Ty::int().is_closed_generic());
        assert!(!Ty::record("Address").is_closed_generic());
        assert!(!Ty::vec(Ty::param("T")).is_closed_generic());
    }

    #[test]
    fn specialize_assigns_parameters_in_order_of_appearance() {
        let closed = Ty::open_map().specialize(&[Ty::string(), Ty::int()]);
        assert_eq!(closed, Ty::map(Ty::string(), Ty::int()));
    }

    #[test]
    fn partial_binding_leaves_missing_parameters_open() {
        let mut bindings = HashMap::default();
        bindings.insert("K".to_string(), Ty::string());
        let partially_bound = Ty::open_map().bind_type_parameters(&bindings);
        assert_eq!(
            partially_bound.unassigned_params().into_iter().collect::<Vec<_>>(),
            vec!["V".to_string()]
        );
    }

    #[test]
    fn containers_are_assignable_to_their_interface() {
        let declared = Ty::sequence(Ty::int());
        assert!(declared.is_assignable_from(&Ty::vec(Ty::int())));
        assert!(!declared.is_assignable_from(&Ty::vec(Ty::string())));
        assert!(!declared.is_assignable_from(&Ty::map(Ty::string(), Ty::int())));

        let declared = Ty::mapping(Ty::string(), Ty::int());
        assert!(declared.is_assignable_from(&Ty::map(Ty::string(), Ty::int())));
        // Assignability is declaration-to-implementation, not the reverse.
        assert!(!Ty::vec(Ty::int()).is_assignable_from(&Ty::sequence(Ty::int())));
    }

    #[test]
    fn debug_rendering_is_compact() {
        let ty = Ty::map(Ty::string(), Ty::vec(Ty::int()));
        assert_eq!(format!("{ty:?}"), "Map<string, Vec<int>>");
    }
}
