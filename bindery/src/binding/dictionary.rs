//! Mapping materialization and the generic dictionary binder.

use crate::binding::adapter::updatable_type_arguments;
use crate::binding::context::{BindingContext, ModelMetadata};
use crate::binding::errors::BindError;
use crate::binding::indices::{
    explicit_index_names, index_list_name, index_model_name, zero_based_index_names,
};
use crate::binding::Binder;
use crate::language::{Capability, Ty};
use crate::value::{MapValue, ScalarValue, Value};

/// Write `pairs` into the model slot, reusing the existing container when
/// possible.
///
/// Same reuse-or-replace decision as
/// [`create_or_replace_sequence`](super::create_or_replace_sequence). Pairs
/// are upserted in order — the last write for a key wins — and pairs with a
/// `None` key are silently dropped.
pub fn create_or_replace_mapping(
    model: &mut Option<Value>,
    key_ty: &Ty,
    value_ty: &Ty,
    pairs: Vec<(Option<ScalarValue>, Value)>,
    make: impl FnOnce() -> MapValue,
) -> MapValue {
    let reusable = match model {
        Some(Value::Map(map))
            if map.key_ty() == key_ty && map.value_ty() == value_ty && !map.is_frozen() =>
        {
            Some(map.clone())
        }
        _ => None,
    };
    let map = match reusable {
        Some(map) => map,
        None => {
            let map = make();
            *model = Some(Value::Map(map.clone()));
            map
        }
    };
    map.clear();
    for (key, value) in pairs {
        if let Some(key) = key {
            map.insert(key, value);
        }
    }
    map
}

/// A binder for mutable mappings, specialized to its key and value types by
/// the generic adapter.
///
/// Each index `i` contributes one pair: `{scope}[i].key` converted to the
/// key type, `{scope}[i].value` bound through the composite. A pair whose
/// key is absent or fails to convert is carried with a `None` key and
/// dropped at materialization.
#[derive(Debug)]
pub struct DictionaryBinder {
    key_ty: Ty,
    value_ty: Ty,
}

impl DictionaryBinder {
    pub fn new(key_ty: Ty, value_ty: Ty) -> Self {
        Self { key_ty, value_ty }
    }

    fn bind_pair(
        &self,
        ctx: &mut BindingContext<'_>,
        entry_name: &str,
    ) -> Result<Option<(Option<ScalarValue>, Value)>, BindError> {
        let key = ctx
            .source
            .get_value(&format!("{entry_name}.key"))
            .and_then(|raw| raw.convert_to(&self.key_ty).ok())
            .and_then(|value| value.as_scalar().cloned());

        let value_name = format!("{entry_name}.value");
        let mut child = ctx.child(ModelMetadata::new(self.value_ty.clone()), value_name);
        let value = if ctx.bindery().composite().bind(&mut child)? {
            child.model
        } else {
            None
        };
        Ok(value.map(|value| (key, value)))
    }
}

impl Binder for DictionaryBinder {
    fn bind(&self, ctx: &mut BindingContext<'_>) -> Result<bool, BindError> {
        if updatable_type_arguments(
            &Capability::MAPPING,
            &Ty::open_map(),
            &ctx.metadata,
            ctx.model.as_ref(),
        )
        .is_none()
        {
            return Ok(false);
        }

        let index_value = ctx.source.get_value(&index_list_name(&ctx.model_name));
        let explicit = explicit_index_names(index_value.as_ref());
        let synthesized = explicit.is_none();

        let mut pairs = Vec::new();
        match explicit {
            Some(names) => {
                for index in names {
                    let entry_name = index_model_name(&ctx.model_name, &index);
                    if let Some(pair) = self.bind_pair(ctx, &entry_name)? {
                        pairs.push(pair);
                    }
                }
            }
            None => {
                for index in zero_based_index_names() {
                    let entry_name = index_model_name(&ctx.model_name, &index);
                    if !ctx.source.contains_prefix(&entry_name) {
                        break;
                    }
                    if let Some(pair) = self.bind_pair(ctx, &entry_name)? {
                        pairs.push(pair);
                    }
                }
            }
        }

        if synthesized && pairs.is_empty() {
            return Ok(false);
        }

        create_or_replace_mapping(&mut ctx.model, &self.key_ty, &self.value_ty, pairs, || {
            MapValue::new(self.key_ty.clone(), self.value_ty.clone())
        });
        Ok(true)
    }
}
