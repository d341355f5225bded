//! The type description layer.
//!
//! Binding targets are described by [`Ty`], a small descriptor tree, rather
//! than by runtime reflection: containers and capability interfaces are
//! nominal types with explicit generic arguments, and open types carry
//! named placeholders that can be bound to concrete arguments.

mod capability;
mod ty;

pub use capability::Capability;
pub use ty::{NamedTy, ScalarKind, Ty};
