use std::cell::RefCell;

use crate::binding::{
    BinaryDataBinderProvider, Binder, BinderOverrides, BinderProvider, BindingContext,
    CollectionBinderProvider, CompositeBinder, DictionaryBinderProvider, ModelMetadata,
    ModelState, ModelValidator, NoValidation, ProvidedBinder, ScalarBinderProvider,
};
use crate::binding::BindError;
use crate::language::Ty;
use crate::source::ValueSource;
use crate::value::Value;

/// The assembled model-binding subsystem: an ordered binder list, the
/// declared-override table and the validator seam.
///
/// A `Bindery` is built once at startup and is immutable afterwards; it can
/// be shared freely across concurrent requests. Each [`bind`](Self::bind)
/// call runs on the calling thread with its own context chain and returns
/// when the whole (possibly nested) bind has completed.
///
/// # Example
///
/// ```rust
/// use bindery::binding::ModelMetadata;
/// use bindery::language::Ty;
/// use bindery::source::InMemoryValueSource;
/// use bindery::value::Value;
/// use bindery::{BindRequest, Bindery};
///
/// let bindery = Bindery::with_defaults();
/// let source = InMemoryValueSource::new().with("age", "42");
///
/// let request = BindRequest::new(ModelMetadata::new(Ty::int()), "age");
/// let outcome = bindery.bind(&source, request).unwrap();
/// assert_eq!(outcome.model(), Some(&Value::int(42)));
/// ```
pub struct Bindery {
    composite: CompositeBinder,
    overrides: BinderOverrides,
    validator: Box<dyn ModelValidator>,
}

impl Bindery {
    pub fn builder() -> BinderyBuilder {
        BinderyBuilder {
            binders: Vec::new(),
            overrides: BinderOverrides::new(),
            validator: Box::new(NoValidation),
        }
    }

    /// The stock binder stack: scalars, binary payloads, collections,
    /// dictionaries, in that order.
    pub fn with_defaults() -> Self {
        Self::builder()
            .provider(ScalarBinderProvider)
            .provider(BinaryDataBinderProvider::new())
            .provider(CollectionBinderProvider)
            .provider(DictionaryBinderProvider)
            .build()
    }

    pub(crate) fn composite(&self) -> &CompositeBinder {
        &self.composite
    }

    pub(crate) fn overrides(&self) -> &BinderOverrides {
        &self.overrides
    }

    pub(crate) fn validator(&self) -> &dyn ModelValidator {
        self.validator.as_ref()
    }

    /// Run one top-level bind against `source`.
    ///
    /// An unbindable target is an `Ok` outcome with
    /// [`is_bound`](BindOutcome::is_bound) `false` and the request's model
    /// left untouched; `Err` is reserved for configuration faults.
    pub fn bind(
        &self,
        source: &dyn ValueSource,
        request: BindRequest,
    ) -> Result<BindOutcome, BindError> {
        let state = RefCell::new(ModelState::default());
        let mut ctx = BindingContext::new(
            self,
            source,
            &state,
            request.metadata,
            request.name,
            request.model,
            request.fallback_to_empty_prefix,
        );
        let bound = self.composite.bind(&mut ctx)?;
        Ok(BindOutcome {
            bound,
            model: ctx.model.take(),
            state: state.into_inner(),
        })
    }
}

/// Builder for [`Bindery`].
pub struct BinderyBuilder {
    binders: Vec<Box<dyn Binder>>,
    overrides: BinderOverrides,
    validator: Box<dyn ModelValidator>,
}

impl BinderyBuilder {
    /// Append a binder to the ordered list. Order is significant: earlier
    /// binders win.
    pub fn binder(mut self, binder: impl Binder + 'static) -> Self {
        self.binders.push(Box::new(binder));
        self
    }

    /// Append a provider-backed binder to the ordered list.
    pub fn provider(mut self, provider: impl BinderProvider + 'static) -> Self {
        self.binders.push(Box::new(ProvidedBinder::new(provider)));
        self
    }

    /// Declare `provider` as the binder override for `ty`; it takes
    /// precedence over the whole ordered list.
    pub fn override_provider(mut self, ty: Ty, provider: impl BinderProvider + 'static) -> Self {
        self.overrides.declare_provider(ty, provider);
        self
    }

    /// Declare a bare binder as the override for `ty`.
    ///
    /// This is a misconfiguration — overrides must be providers — and every
    /// bind of `ty` will surface it as
    /// [`BindError::InvalidOverride`](crate::binding::BindError::InvalidOverride).
    pub fn override_binder(mut self, ty: Ty, binder: impl Binder + 'static) -> Self {
        self.overrides.declare_binder(ty, binder);
        self
    }

    pub fn validator(mut self, validator: impl ModelValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn build(self) -> Bindery {
        Bindery {
            composite: CompositeBinder::new(self.binders),
            overrides: self.overrides,
            validator: self.validator,
        }
    }
}

/// One request to bind a target: the slot's metadata, the name prefix to
/// bind under, the current model (if any) and the prefix-relaxation flag.
pub struct BindRequest {
    pub metadata: ModelMetadata,
    pub name: String,
    pub model: Option<Value>,
    pub fallback_to_empty_prefix: bool,
}

impl BindRequest {
    pub fn new(metadata: ModelMetadata, name: impl Into<String>) -> Self {
        Self {
            metadata,
            name: name.into(),
            model: None,
            fallback_to_empty_prefix: true,
        }
    }

    /// Seed the bind with an existing model value; binders prefer updating
    /// it in place over replacing it.
    pub fn with_model(mut self, model: Value) -> Self {
        self.model = Some(model);
        self
    }

    /// Disallow retrying under the empty prefix when the named bind fails.
    pub fn without_prefix_fallback(mut self) -> Self {
        self.fallback_to_empty_prefix = false;
        self
    }
}

/// What a top-level bind produced.
#[derive(Debug)]
pub struct BindOutcome {
    pub(crate) bound: bool,
    pub(crate) model: Option<Value>,
    pub(crate) state: ModelState,
}

impl BindOutcome {
    /// Whether any binder reported success.
    ///
    /// A bound model can still be invalid; check [`state`](Self::state).
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn model(&self) -> Option<&Value> {
        self.model.as_ref()
    }

    pub fn into_model(self) -> Option<Value> {
        self.model
    }

    /// The accumulated attempted values and binding/validation errors.
    pub fn state(&self) -> &ModelState {
        &self.state
    }
}
