//! Errors that can happen when resolving and running binders.
use crate::language::Ty;

/// The error returned by a bind call when the binding *configuration* is
/// broken.
///
/// Malformed input data never produces a `BindError` — it is reported as an
/// unbound result, with details accumulated in
/// [`ModelState`](crate::binding::ModelState). Only misconfiguration
/// crosses the boundary as an error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BindError {
    /// A binder override was declared for a type, but the declared
    /// component is not a binder provider.
    ///
    /// Overrides take precedence over the whole default binder list, so a
    /// malformed one cannot be skipped silently: every bind of the affected
    /// type would quietly lose its intended binder.
    #[error(
        "`{type_name}` was declared as the binder override for `{model_ty:?}`, \
        but it does not implement `BinderProvider`"
    )]
    InvalidOverride {
        /// The Rust type of the declared component.
        type_name: &'static str,
        /// The binding target the override was declared for.
        model_ty: Ty,
    },
}
