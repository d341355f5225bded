//! The generic binder adapter.
//!
//! Collection and dictionary binders are written against an open
//! [`Capability`] interface ("a mutable sequence of `T`", "a mutable mapping
//! of `K` to `V`"). The functions here decide whether a concrete target type
//! is a closed instantiation of such a capability, extract its type
//! arguments, and specialize a binder — or an open container type — to them.
//!
//! Nothing in this module has side effects, and nothing here is fatal:
//! incompatibility is an ordinary `None`, a signal to try the next
//! candidate.

use std::sync::Arc;

use crate::binding::Binder;
use crate::binding::context::ModelMetadata;
use crate::language::{Capability, Ty};
use crate::value::Value;

/// Check whether `concrete` is a closed instantiation of `capability` and,
/// if so, return its type arguments in declaration order.
///
/// Incompatible — `None` — when `concrete` is not a closed generic
/// instantiation, or when its argument count differs from the capability's
/// arity. The check is arity-only by design: whether the type actually
/// behaves like the capability is decided later, against the live model.
#[tracing::instrument(level = "trace", ret)]
pub fn resolve_capability(capability: &Capability, concrete: &Ty) -> Option<Vec<Ty>> {
    if !concrete.is_closed_generic() {
        // not a closed generic type
        return None;
    }
    let args = concrete.generic_arguments();
    if args.len() != capability.arity() {
        // wrong number of generic type arguments
        return None;
    }
    Some(args.to_vec())
}

/// Specialize an open binder to the target's type arguments.
///
/// `make` is the factory for the open binder: it receives the resolved type
/// arguments and returns the closed binder instance. Returns `None` when
/// the target is not a closed instantiation of the capability.
pub fn instantiate_binder<F>(
    capability: &Capability,
    concrete: &Ty,
    make: F,
) -> Option<Arc<dyn Binder>>
where
    F: FnOnce(&[Ty]) -> Arc<dyn Binder>,
{
    let args = resolve_capability(capability, concrete)?;
    Some(make(&args))
}

/// The two-path updatability decision: may binding *replace* the model
/// reference, or failing that, *mutate* the existing value in place?
///
/// Returns the target's type arguments when either path is legal:
///
/// - **replace** — the slot is not read-only and `replacement` (an open
///   container type such as `Vec<T>`), once specialized, is assignable to
///   the declared model type;
/// - **mutate in place** — the existing model value implements the closed
///   capability interface and its own container flag reports "not frozen".
///
/// `None` when neither path is legal: binding for this target is
/// impossible.
#[tracing::instrument(level = "trace", skip(model), ret)]
pub fn updatable_type_arguments(
    capability: &Capability,
    replacement: &Ty,
    metadata: &ModelMetadata,
    model: Option<&Value>,
) -> Option<Vec<Ty>> {
    let args = resolve_capability(capability, metadata.ty())?;

    // Is it possible just to change the reference rather than update the
    // container in place?
    if !metadata.is_read_only() {
        let closed_replacement = replacement.specialize(&args);
        if metadata.ty().is_assignable_from(&closed_replacement) {
            return Some(args);
        }
    }

    // The reference cannot change, so the existing instance must be
    // updatable in place.
    let closed_interface = capability.interface_ty(&args);
    let model = model?;
    if !model.implements(&closed_interface) {
        return None;
    }
    if model.container_is_frozen().unwrap_or(true) {
        return None;
    }
    Some(args)
}

/// Boolean form of [`updatable_type_arguments`], for callers that only need
/// the verdict.
pub fn is_model_updatable_in_place(
    capability: &Capability,
    replacement: &Ty,
    metadata: &ModelMetadata,
    model: Option<&Value>,
) -> bool {
    updatable_type_arguments(capability, replacement, metadata, model).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{MapValue, SeqValue};

    #[test]
    fn capability_resolution_returns_arguments_in_declaration_order() {
        let args = resolve_capability(&Capability::MAPPING, &Ty::map(Ty::string(), Ty::int()));
        assert_eq!(args, Some(vec![Ty::string(), Ty::int()]));

        let args = resolve_capability(&Capability::SEQUENCE, &Ty::vec(Ty::float()));
        assert_eq!(args, Some(vec![Ty::float()]));
    }

    #[test]
    fn non_generic_and_open_generic_types_are_incompatible() {
        assert_eq!(resolve_capability(&Capability::SEQUENCE, &Ty::int()), None);
        assert_eq!(
            resolve_capability(&Capability::SEQUENCE, &Ty::record("Address")),
            None
        );
        assert_eq!(
            resolve_capability(&Capability::SEQUENCE, &Ty::open_vec()),
            None
        );
    }

    #[test]
    fn arity_mismatch_is_incompatible_not_an_error() {
        assert_eq!(
            resolve_capability(&Capability::MAPPING, &Ty::vec(Ty::int())),
            None
        );
        assert_eq!(
            resolve_capability(&Capability::SEQUENCE, &Ty::map(Ty::string(), Ty::int())),
            None
        );
    }

    #[test]
    fn instantiation_only_happens_on_a_match() {
        let binder = instantiate_binder(&Capability::SEQUENCE, &Ty::vec(Ty::int()), |args| {
            Arc::new(crate::binding::CollectionBinder::new(args[0].clone()))
        });
        assert!(binder.is_some());

        let binder = instantiate_binder(&Capability::SEQUENCE, &Ty::int(), |args| {
            Arc::new(crate::binding::CollectionBinder::new(args[0].clone()))
        });
        assert!(binder.is_none());
    }

    #[test]
    fn a_writable_slot_of_a_compatible_type_takes_the_replace_path() {
        let metadata = ModelMetadata::new(Ty::vec(Ty::int()));
        let args =
            updatable_type_arguments(&Capability::SEQUENCE, &Ty::open_vec(), &metadata, None);
        assert_eq!(args, Some(vec![Ty::int()]));

        // Declared as the interface: the specialized replacement is still
        // assignable.
        let metadata = ModelMetadata::new(Ty::sequence(Ty::int()));
        let args =
            updatable_type_arguments(&Capability::SEQUENCE, &Ty::open_vec(), &metadata, None);
        assert_eq!(args, Some(vec![Ty::int()]));
    }

    #[test]
    fn a_read_only_slot_requires_a_mutable_instance() {
        let metadata = ModelMetadata::read_only(Ty::vec(Ty::int()));

        // No existing instance: nothing to mutate, nothing to replace.
        assert_eq!(
            updatable_type_arguments(&Capability::SEQUENCE, &Ty::open_vec(), &metadata, None),
            None
        );

        let live = Value::Seq(SeqValue::new(Ty::int()));
        assert_eq!(
            updatable_type_arguments(
                &Capability::SEQUENCE,
                &Ty::open_vec(),
                &metadata,
                Some(&live)
            ),
            Some(vec![Ty::int()])
        );

        let frozen = Value::Seq(SeqValue::frozen(Ty::int(), vec![]));
        assert_eq!(
            updatable_type_arguments(
                &Capability::SEQUENCE,
                &Ty::open_vec(),
                &metadata,
                Some(&frozen)
            ),
            None
        );

        // Wrong element type: not an instance of the closed interface.
        let mismatched = Value::Seq(SeqValue::new(Ty::string()));
        assert_eq!(
            updatable_type_arguments(
                &Capability::SEQUENCE,
                &Ty::open_vec(),
                &metadata,
                Some(&mismatched)
            ),
            None
        );
    }

    #[test]
    fn mappings_follow_the_same_two_path_decision() {
        let metadata = ModelMetadata::read_only(Ty::mapping(Ty::string(), Ty::int()));
        let live = Value::Map(MapValue::new(Ty::string(), Ty::int()));
        assert!(is_model_updatable_in_place(
            &Capability::MAPPING,
            &Ty::open_map(),
            &metadata,
            Some(&live)
        ));
        assert!(!is_model_updatable_in_place(
            &Capability::MAPPING,
            &Ty::open_map(),
            &metadata,
            None
        ));
    }
}
