//! The binder providers shipped with the crate.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::binding::adapter::instantiate_binder;
use crate::binding::collection::CollectionBinder;
use crate::binding::context::BindingContext;
use crate::binding::dictionary::DictionaryBinder;
use crate::binding::errors::BindError;
use crate::binding::{Binder, BinderProvider};
use crate::language::{Capability, Ty};
use crate::value::Value;

/// A provider that supplies a fixed binder for one exact target type.
pub struct SimpleBinderProvider {
    ty: Ty,
    binder: Arc<dyn Binder>,
}

impl SimpleBinderProvider {
    pub fn new(ty: Ty, binder: impl Binder + 'static) -> Self {
        Self {
            ty,
            binder: Arc::new(binder),
        }
    }
}

impl BinderProvider for SimpleBinderProvider {
    fn binder_for(&self, model_ty: &Ty) -> Option<Arc<dyn Binder>> {
        (model_ty == &self.ty).then(|| Arc::clone(&self.binder))
    }
}

/// The leaf binder for scalar targets: one raw value, one culture-aware
/// conversion.
///
/// The attempted raw value is always recorded in model state; a conversion
/// failure additionally records an error under the scope name and reports
/// unbound.
pub struct ScalarBinder;

impl Binder for ScalarBinder {
    fn bind(&self, ctx: &mut BindingContext<'_>) -> Result<bool, BindError> {
        let Some(raw) = ctx.source.get_value(&ctx.model_name) else {
            return Ok(false);
        };
        ctx.state
            .borrow_mut()
            .set_attempted_value(&ctx.model_name, raw.attempted());
        match raw.convert_to(ctx.metadata.ty()) {
            Ok(value) => {
                ctx.model = Some(value);
                Ok(true)
            }
            Err(e) => {
                ctx.state.borrow_mut().add_error(&ctx.model_name, e.to_string());
                Ok(false)
            }
        }
    }
}

/// Supplies [`ScalarBinder`] for every scalar target.
pub struct ScalarBinderProvider;

impl BinderProvider for ScalarBinderProvider {
    fn binder_for(&self, model_ty: &Ty) -> Option<Arc<dyn Binder>> {
        matches!(model_ty, Ty::Scalar(_)).then(|| Arc::new(ScalarBinder) as Arc<dyn Binder>)
    }
}

/// The leaf binder for binary payloads, transported base64-encoded.
///
/// Absent input, a blank entry and a corrupt payload are all treated as
/// unbound — never as an error. The payload is a client-supplied field; a
/// field that cannot be decoded simply does not bind.
pub struct ByteArrayBinder;

impl Binder for ByteArrayBinder {
    fn bind(&self, ctx: &mut BindingContext<'_>) -> Result<bool, BindError> {
        let Some(raw) = ctx.source.get_value(&ctx.model_name) else {
            // no entry containing this data
            return Ok(false);
        };
        let encoded = raw.first();
        if encoded.is_empty() {
            // an entry was present but left blank
            return Ok(false);
        }
        // Serializers that stringify binary wrappers leave quotes around the
        // payload; strip them before decoding.
        let cleaned = encoded.replace('"', "");
        match BASE64.decode(cleaned.as_bytes()) {
            Ok(bytes) => {
                ctx.model = Some(Value::Bytes(bytes));
                Ok(true)
            }
            // corrupt payload
            Err(_) => Ok(false),
        }
    }
}

/// The provider for binary payload targets.
///
/// Delegates to an inner provider list so additional binary flavors can be
/// slotted in next to the base64 one.
pub struct BinaryDataBinderProvider {
    providers: Vec<SimpleBinderProvider>,
}

impl BinaryDataBinderProvider {
    pub fn new() -> Self {
        Self {
            providers: vec![SimpleBinderProvider::new(Ty::Bytes, ByteArrayBinder)],
        }
    }
}

impl Default for BinaryDataBinderProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl BinderProvider for BinaryDataBinderProvider {
    fn binder_for(&self, model_ty: &Ty) -> Option<Arc<dyn Binder>> {
        self.providers
            .iter()
            .find_map(|provider| provider.binder_for(model_ty))
    }
}

/// Synthesizes a [`CollectionBinder`] for closed instantiations of the
/// sequence capability.
pub struct CollectionBinderProvider;

impl BinderProvider for CollectionBinderProvider {
    fn binder_for(&self, model_ty: &Ty) -> Option<Arc<dyn Binder>> {
        instantiate_binder(&Capability::SEQUENCE, model_ty, |args| {
            Arc::new(CollectionBinder::new(args[0].clone()))
        })
    }
}

/// Synthesizes a [`DictionaryBinder`] for closed instantiations of the
/// mapping capability.
pub struct DictionaryBinderProvider;

impl BinderProvider for DictionaryBinderProvider {
    fn binder_for(&self, model_ty: &Ty) -> Option<Arc<dyn Binder>> {
        instantiate_binder(&Capability::MAPPING, model_ty, |args| {
            Arc::new(DictionaryBinder::new(args[0].clone(), args[1].clone()))
        })
    }
}

/// Adapts a provider into a binder for the composite's ordered list: a
/// provider that declines the target type is an ordinary "did not bind".
pub struct ProvidedBinder {
    provider: Arc<dyn BinderProvider>,
}

impl ProvidedBinder {
    pub fn new(provider: impl BinderProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

impl Binder for ProvidedBinder {
    fn bind(&self, ctx: &mut BindingContext<'_>) -> Result<bool, BindError> {
        match self.provider.binder_for(ctx.metadata.ty()) {
            Some(binder) => binder.bind(ctx),
            None => Ok(false),
        }
    }
}
