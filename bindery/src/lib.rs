//! Model binding for request-processing pipelines.
//!
//! `bindery` converts raw, untyped request input — form fields, route
//! values, query strings — into typed values and object graphs before a
//! handler runs. The interesting part is not parsing individual scalars but
//! the **composition protocol** around them:
//!
//! - an ordered registry of [binders](binding::Binder) and
//!   [providers](binding::BinderProvider), tried in order, first success
//!   wins;
//! - a [declared-override table](binding::BinderOverrides) that takes
//!   precedence over the registry, with loud failures on misconfiguration;
//! - a [generic adapter](binding::adapter) that matches concrete container
//!   types against open capability interfaces and specializes collection and
//!   dictionary binders to type arguments only known at the call site;
//! - materialization that preserves the identity of an existing mutable
//!   container (clear-then-refill) instead of blindly replacing it;
//! - prefix relaxation: a field that does not bind under its qualified name
//!   can be retried under the empty prefix.
//!
//! Start at [`Bindery`]: build one at startup, share it, and call
//! [`Bindery::bind`] once per parameter or property to bind.

pub mod binding;
pub mod language;
pub mod source;
pub mod value;

mod bindery;

pub use crate::bindery::{BindOutcome, BindRequest, Bindery, BinderyBuilder};
