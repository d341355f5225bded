//! The declared binder-override table.
//!
//! The configuration-table replacement for attribute-based binder discovery:
//! a target type can declare, at startup, the component that must bind it,
//! bypassing the default binder list entirely.

use std::sync::Arc;

use ahash::HashMap;

use crate::binding::{Binder, BinderProvider};
use crate::language::Ty;

/// The startup-populated table mapping target types to their declared
/// binding component.
///
/// Any component can be declared — the table is configuration data — but
/// only binder *providers* are valid: the composite rejects anything else
/// with a configuration fault at bind time, naming the offending type.
#[derive(Default)]
pub struct BinderOverrides {
    by_type: HashMap<Ty, DeclaredOverride>,
}

/// One declared override: the registered component plus the Rust type name
/// it was registered under, kept for diagnostics.
pub struct DeclaredOverride {
    type_name: &'static str,
    component: OverrideComponent,
}

pub(crate) enum OverrideComponent {
    Provider(Arc<dyn BinderProvider>),
    Binder(#[allow(dead_code)] Arc<dyn Binder>),
}

impl DeclaredOverride {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn component(&self) -> &OverrideComponent {
        &self.component
    }
}

impl BinderOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `provider` as the binder provider for `ty`.
    pub fn declare_provider<P: BinderProvider + 'static>(&mut self, ty: Ty, provider: P) {
        self.by_type.insert(
            ty,
            DeclaredOverride {
                type_name: std::any::type_name::<P>(),
                component: OverrideComponent::Provider(Arc::new(provider)),
            },
        );
    }

    /// Declare a bare binder for `ty`.
    ///
    /// A bare binder is not a valid override — the composite needs a
    /// provider — so binding `ty` will fail with
    /// [`BindError::InvalidOverride`](crate::binding::BindError::InvalidOverride).
    /// The declaration is still representable because the table is plain
    /// configuration data, populated before any of it is interpreted.
    pub fn declare_binder<B: Binder + 'static>(&mut self, ty: Ty, binder: B) {
        self.by_type.insert(
            ty,
            DeclaredOverride {
                type_name: std::any::type_name::<B>(),
                component: OverrideComponent::Binder(Arc::new(binder)),
            },
        );
    }

    pub fn get(&self, ty: &Ty) -> Option<&DeclaredOverride> {
        self.by_type.get(ty)
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
