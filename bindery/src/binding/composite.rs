//! The orchestration root: binder resolution, prefix relaxation,
//! validation hand-off.

use std::rc::Rc;

use crate::binding::Binder;
use crate::binding::context::BindingContext;
use crate::binding::errors::BindError;
use crate::binding::overrides::OverrideComponent;
use crate::binding::validation::ValidationNode;

/// A binder that delegates to an ordered list of binders.
///
/// Resolution order for each name scope:
///
/// 1. a declared override for the target type, if any — an override that
///    produces a binder is terminal for this scope, succeed or fail; an
///    override that produces *no* binder falls through to the list;
/// 2. the ordered binder list — first success wins, the rest stay untried.
///
/// If nothing binds under a non-empty name and the request allows it, the
/// whole resolution is retried once under the empty prefix.
pub struct CompositeBinder {
    binders: Vec<Box<dyn Binder>>,
}

impl CompositeBinder {
    pub fn new(binders: Vec<Box<dyn Binder>>) -> Self {
        Self { binders }
    }

    fn try_bind(&self, ctx: &mut BindingContext<'_>) -> Result<bool, BindError> {
        if let Some(declared) = ctx.bindery().overrides().get(ctx.metadata.ty()) {
            match declared.component() {
                OverrideComponent::Provider(provider) => {
                    if let Some(binder) = provider.binder_for(ctx.metadata.ty()) {
                        tracing::trace!(
                            name = %ctx.model_name,
                            provider = declared.type_name(),
                            "binding through the declared override"
                        );
                        return binder.bind(ctx);
                    }
                    // The override produced no binder at all: fall through
                    // to the ordered list.
                }
                OverrideComponent::Binder(_) => {
                    return Err(BindError::InvalidOverride {
                        type_name: declared.type_name(),
                        model_ty: ctx.metadata.ty().clone(),
                    });
                }
            }
        }

        for binder in &self.binders {
            if binder.bind(ctx)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Binder for CompositeBinder {
    fn bind(&self, ctx: &mut BindingContext<'_>) -> Result<bool, BindError> {
        let original_name = ctx.model_name.clone();
        let mut inner = ctx.narrowed(&original_name);
        let mut bound = self.try_bind(&mut inner)?;
        if !bound && !original_name.is_empty() && ctx.fallback_to_empty_prefix {
            tracing::trace!(name = %original_name, "retrying under the empty prefix");
            inner = ctx.narrowed("");
            bound = self.try_bind(&mut inner)?;
        }
        if !bound {
            return Ok(false);
        }

        // A simple type that ended up bound under the empty name keeps the
        // original name on its validation node, so diagnostics point at the
        // field the caller asked for. Complex types skip this: their
        // sub-properties already carry individual names.
        if !inner.metadata.is_complex() && inner.model_name.is_empty() {
            inner.validation = Rc::new(ValidationNode::new(inner.metadata.clone(), &original_name));
        }

        let validation = Rc::clone(&inner.validation);
        validation.validate(&inner, None);
        ctx.model = inner.model.take();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::binding::context::ModelMetadata;
    use crate::binding::state::ModelState;
    use crate::binding::{BinderProvider, SimpleBinderProvider};
    use crate::language::Ty;
    use crate::source::InMemoryValueSource;
    use crate::value::Value;
    use crate::{BindRequest, Bindery};

    /// A binder with a scripted outcome that counts its invocations.
    struct ScriptedBinder {
        outcome: bool,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedBinder {
        fn new(outcome: bool) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    outcome,
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl Binder for ScriptedBinder {
        fn bind(&self, ctx: &mut BindingContext<'_>) -> Result<bool, BindError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.outcome {
                ctx.model = Some(Value::int(42));
            }
            Ok(self.outcome)
        }
    }

    /// A binder that only succeeds under the empty name.
    struct EmptyPrefixBinder;

    impl Binder for EmptyPrefixBinder {
        fn bind(&self, ctx: &mut BindingContext<'_>) -> Result<bool, BindError> {
            if ctx.model_name.is_empty() {
                ctx.model = Some(Value::int(7));
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }

    struct NoBinderProvider;

    impl BinderProvider for NoBinderProvider {
        fn binder_for(&self, _model_ty: &Ty) -> Option<Arc<dyn Binder>> {
            None
        }
    }

    fn bind_int(
        bindery: &Bindery,
        name: &str,
        fallback: bool,
    ) -> Result<crate::BindOutcome, BindError> {
        let source = InMemoryValueSource::new();
        let mut request = BindRequest::new(ModelMetadata::new(Ty::int()), name);
        if !fallback {
            request = request.without_prefix_fallback();
        }
        bindery.bind(&source, request)
    }

    #[test]
    fn the_first_successful_binder_wins_and_the_rest_stay_untried() {
        let (p1, c1) = ScriptedBinder::new(false);
        let (p2, c2) = ScriptedBinder::new(true);
        let (p3, c3) = ScriptedBinder::new(true);
        let bindery = Bindery::builder()
            .binder(p1)
            .binder(p2)
            .binder(p3)
            .build();

        let outcome = bind_int(&bindery, "age", false).unwrap();
        assert!(outcome.is_bound());
        assert_eq!(outcome.model(), Some(&Value::int(42)));
        assert_eq!(c1.load(Ordering::SeqCst), 1);
        assert_eq!(c2.load(Ordering::SeqCst), 1);
        assert_eq!(c3.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn no_retry_under_the_empty_prefix_when_fallback_is_disallowed() {
        let bindery = Bindery::builder().binder(EmptyPrefixBinder).build();
        let outcome = bind_int(&bindery, "addr", false).unwrap();
        assert!(!outcome.is_bound());
        assert!(outcome.model().is_none());
    }

    #[test]
    fn fallback_retries_once_under_the_empty_prefix() {
        let bindery = Bindery::builder().binder(EmptyPrefixBinder).build();
        let outcome = bind_int(&bindery, "addr", true).unwrap();
        assert!(outcome.is_bound());
        assert_eq!(outcome.model(), Some(&Value::int(7)));
    }

    #[test]
    fn an_override_that_is_not_a_provider_is_a_configuration_fault() {
        let (binder, _) = ScriptedBinder::new(true);
        let bindery = Bindery::builder()
            .binder(binder)
            .override_binder(Ty::int(), EmptyPrefixBinder)
            .build();

        let err = bind_int(&bindery, "age", false).unwrap_err();
        assert!(matches!(err, BindError::InvalidOverride { .. }));
        let message = err.to_string();
        assert!(message.contains("EmptyPrefixBinder"), "{message}");
        assert!(message.contains("`int`"), "{message}");
    }

    #[test]
    fn an_override_that_produces_a_binder_is_terminal_even_on_failure() {
        let (fallback, fallback_calls) = ScriptedBinder::new(true);
        let (failing, _) = ScriptedBinder::new(false);
        let bindery = Bindery::builder()
            .binder(fallback)
            .override_provider(Ty::int(), SimpleBinderProvider::new(Ty::int(), failing))
            .build();

        let outcome = bind_int(&bindery, "age", false).unwrap();
        assert!(!outcome.is_bound());
        // The list binder was never consulted.
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn an_override_that_produces_no_binder_falls_through_to_the_list() {
        let (listed, listed_calls) = ScriptedBinder::new(true);
        let bindery = Bindery::builder()
            .binder(listed)
            .override_provider(Ty::int(), NoBinderProvider)
            .build();

        let outcome = bind_int(&bindery, "age", false).unwrap();
        assert!(outcome.is_bound());
        assert_eq!(listed_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn narrowing_to_the_same_name_reuses_the_validation_node() {
        let bindery = Bindery::builder().build();
        let state = RefCell::new(ModelState::default());
        let source = InMemoryValueSource::new();
        let ctx = BindingContext::new(
            &bindery,
            &source,
            &state,
            ModelMetadata::new(Ty::int()),
            "age".to_owned(),
            None,
            false,
        );

        let same = ctx.narrowed("age");
        assert!(Rc::ptr_eq(&ctx.validation, &same.validation));

        let relaxed = ctx.narrowed("");
        assert!(!Rc::ptr_eq(&ctx.validation, &relaxed.validation));
        assert_eq!(relaxed.validation.model_name(), "");
    }
}
