use crate::binding::context::{BindingContext, ModelMetadata};
use crate::binding::state::ModelState;
use crate::value::Value;

/// Validation tracking for one binding scope.
///
/// The node itself does not hold rules; it records *what* was bound under
/// *which* name and hands both to the configured [`ModelValidator`] once
/// per successful top-level bind.
#[derive(Debug, Clone)]
pub struct ValidationNode {
    metadata: ModelMetadata,
    model_name: String,
}

impl ValidationNode {
    pub fn new(metadata: ModelMetadata, model_name: &str) -> Self {
        Self {
            metadata,
            model_name: model_name.to_owned(),
        }
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Run validation for this node, accumulating findings into the shared
    /// model state.
    pub fn validate(&self, ctx: &BindingContext<'_>, parent: Option<&ValidationNode>) {
        let mut state = ctx.state.borrow_mut();
        ctx.bindery()
            .validator()
            .validate(self, parent, ctx.model.as_ref(), &mut state);
    }
}

/// The rule engine seam: walks a bound model for violations and records
/// them into [`ModelState`] rather than raising.
pub trait ModelValidator: Send + Sync {
    fn validate(
        &self,
        node: &ValidationNode,
        parent: Option<&ValidationNode>,
        model: Option<&Value>,
        state: &mut ModelState,
    );
}

/// The default validator: accepts everything.
pub struct NoValidation;

impl ModelValidator for NoValidation {
    fn validate(
        &self,
        _node: &ValidationNode,
        _parent: Option<&ValidationNode>,
        _model: Option<&Value>,
        _state: &mut ModelState,
    ) {
    }
}
