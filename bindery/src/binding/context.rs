use std::cell::RefCell;
use std::rc::Rc;

use crate::Bindery;
use crate::binding::state::ModelState;
use crate::binding::validation::ValidationNode;
use crate::language::Ty;
use crate::source::ValueSource;
use crate::value::Value;

/// What the metadata layer knows about a binding target: its declared type
/// and whether the slot holding it may be reassigned.
///
/// The read-only flag here is slot-level — "may the model *reference* be
/// replaced". Container instances carry their own frozen flag, checked
/// separately when deciding whether an existing value can be mutated in
/// place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMetadata {
    ty: Ty,
    is_read_only: bool,
}

impl ModelMetadata {
    pub fn new(ty: Ty) -> Self {
        Self {
            ty,
            is_read_only: false,
        }
    }

    /// Metadata for a slot whose reference cannot be reassigned.
    pub fn read_only(ty: Ty) -> Self {
        Self {
            ty,
            is_read_only: true,
        }
    }

    pub fn ty(&self) -> &Ty {
        &self.ty
    }

    pub fn is_read_only(&self) -> bool {
        self.is_read_only
    }

    pub fn is_complex(&self) -> bool {
        self.ty.is_complex()
    }
}

/// The state of one binding scope: the target, the name prefix, the current
/// model slot, and the shared collaborators every scope in a bind call
/// reads from.
///
/// Created once per parameter or property to bind; nested binds derive
/// [`child`](Self::child) scopes, the composite derives
/// [`narrowed`](Self::narrowed) ones.
pub struct BindingContext<'a> {
    bindery: &'a Bindery,
    /// The value source raw entries are read from.
    pub source: &'a dyn ValueSource,
    /// The shared error/attempted-value accumulator for this bind call.
    pub state: &'a RefCell<ModelState>,
    pub metadata: ModelMetadata,
    /// The name prefix this scope binds under; possibly empty.
    pub model_name: String,
    /// The current model slot. May already hold a value, in which case
    /// binders prefer updating it in place over replacing it.
    pub model: Option<Value>,
    /// Whether a failed bind under a non-empty name may be retried under
    /// the empty prefix.
    pub fallback_to_empty_prefix: bool,
    /// The validation tracking node for this scope.
    pub validation: Rc<ValidationNode>,
}

impl<'a> BindingContext<'a> {
    pub(crate) fn new(
        bindery: &'a Bindery,
        source: &'a dyn ValueSource,
        state: &'a RefCell<ModelState>,
        metadata: ModelMetadata,
        model_name: String,
        model: Option<Value>,
        fallback_to_empty_prefix: bool,
    ) -> Self {
        let validation = Rc::new(ValidationNode::new(metadata.clone(), &model_name));
        Self {
            bindery,
            source,
            state,
            metadata,
            model_name,
            model,
            fallback_to_empty_prefix,
            validation,
        }
    }

    pub fn bindery(&self) -> &'a Bindery {
        self.bindery
    }

    /// A scope over the same target under a (possibly) different name.
    ///
    /// The validation node is reused only when the name is unchanged —
    /// rebuilding validation tracking is the expensive part of a retry, and
    /// a scope bound under a different name must not inherit it.
    pub(crate) fn narrowed(&self, model_name: &str) -> BindingContext<'a> {
        let validation = if model_name == self.model_name {
            Rc::clone(&self.validation)
        } else {
            Rc::new(ValidationNode::new(self.metadata.clone(), model_name))
        };
        BindingContext {
            bindery: self.bindery,
            source: self.source,
            state: self.state,
            metadata: self.metadata.clone(),
            model_name: model_name.to_owned(),
            model: self.model.clone(),
            fallback_to_empty_prefix: false,
            validation,
        }
    }

    /// A scope for a nested element or property bind: fresh target, fresh
    /// validation tracking, empty model slot, no prefix fallback.
    pub fn child(&self, metadata: ModelMetadata, model_name: String) -> BindingContext<'a> {
        let validation = Rc::new(ValidationNode::new(metadata.clone(), &model_name));
        BindingContext {
            bindery: self.bindery,
            source: self.source,
            state: self.state,
            metadata,
            model_name,
            model: None,
            fallback_to_empty_prefix: false,
            validation,
        }
    }
}
