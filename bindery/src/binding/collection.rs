//! Sequence materialization and the generic collection binder.

use crate::binding::adapter::updatable_type_arguments;
use crate::binding::context::{BindingContext, ModelMetadata};
use crate::binding::errors::BindError;
use crate::binding::indices::{
    explicit_index_names, index_list_name, index_model_name, zero_based_index_names,
};
use crate::binding::Binder;
use crate::language::{Capability, Ty};
use crate::source::SourceValue;
use crate::value::{SeqValue, Value};

/// Write `incoming` into the model slot, reusing the existing container when
/// possible.
///
/// An existing sequence of the right element type that is not frozen is
/// reused — cleared, then refilled — preserving its object identity.
/// Anything else is replaced by a fresh container from `make`. Either way
/// the slot ends up committed: order and duplicates of `incoming` are
/// preserved exactly.
pub fn create_or_replace_sequence(
    model: &mut Option<Value>,
    elem_ty: &Ty,
    incoming: Vec<Value>,
    make: impl FnOnce() -> SeqValue,
) -> SeqValue {
    let reusable = match model {
        Some(Value::Seq(seq)) if seq.elem_ty() == elem_ty && !seq.is_frozen() => Some(seq.clone()),
        _ => None,
    };
    let seq = match reusable {
        Some(seq) => seq,
        None => {
            let seq = make();
            *model = Some(Value::Seq(seq.clone()));
            seq
        }
    };
    seq.clear();
    for element in incoming {
        seq.push(element);
    }
    seq
}

/// A binder for mutable sequences, specialized to its element type by the
/// generic adapter.
///
/// Two input forms are supported:
///
/// - *simple*: one or more raw entries directly under the scope name
///   (`items=1&items=2`), each converted to the element type;
/// - *complex*: indexed entries (`items[0]`, `items[1]`, …) bound through
///   the composite, with the index set either taken from the companion
///   `items.index` list or synthesized zero-based until the first absent
///   index.
#[derive(Debug)]
pub struct CollectionBinder {
    elem_ty: Ty,
}

impl CollectionBinder {
    pub fn new(elem_ty: Ty) -> Self {
        Self { elem_ty }
    }

    /// Convert each raw entry to the element type. Entries that fail to
    /// convert record a model-state error under their positional name and
    /// are skipped; the rest bind.
    fn bind_simple(&self, ctx: &mut BindingContext<'_>, raw: &SourceValue) -> Vec<Value> {
        ctx.state
            .borrow_mut()
            .set_attempted_value(&ctx.model_name, raw.attempted());
        let mut elements = Vec::with_capacity(raw.to_strings().len());
        for position in 0..raw.to_strings().len() {
            match raw.convert_entry(position, &self.elem_ty) {
                Ok(element) => elements.push(element),
                Err(e) => {
                    let name = index_model_name(&ctx.model_name, &position.to_string());
                    ctx.state.borrow_mut().add_error(&name, e.to_string());
                }
            }
        }
        elements
    }

    /// Probe indexed entries and bind each through the composite.
    ///
    /// `None` when no explicit index list exists and probing produced
    /// nothing: the source has no trace of this collection.
    fn bind_complex(&self, ctx: &mut BindingContext<'_>) -> Result<Option<Vec<Value>>, BindError> {
        let index_value = ctx.source.get_value(&index_list_name(&ctx.model_name));
        let explicit = explicit_index_names(index_value.as_ref());
        let synthesized = explicit.is_none();

        let elem_metadata = ModelMetadata::new(self.elem_ty.clone());
        let mut elements = Vec::new();
        match explicit {
            Some(names) => {
                for index in names {
                    let child_name = index_model_name(&ctx.model_name, &index);
                    if let Some(element) = self.bind_element(ctx, &elem_metadata, child_name)? {
                        elements.push(element);
                    }
                }
            }
            None => {
                for index in zero_based_index_names() {
                    let child_name = index_model_name(&ctx.model_name, &index);
                    // The infinite index sequence is bounded here: stop at
                    // the first index the source has nothing for.
                    if !ctx.source.contains_prefix(&child_name) {
                        break;
                    }
                    if let Some(element) = self.bind_element(ctx, &elem_metadata, child_name)? {
                        elements.push(element);
                    }
                }
            }
        }

        if synthesized && elements.is_empty() {
            return Ok(None);
        }
        Ok(Some(elements))
    }

    fn bind_element(
        &self,
        ctx: &mut BindingContext<'_>,
        elem_metadata: &ModelMetadata,
        child_name: String,
    ) -> Result<Option<Value>, BindError> {
        let mut child = ctx.child(elem_metadata.clone(), child_name);
        let bound = ctx.bindery().composite().bind(&mut child)?;
        Ok(if bound { child.model } else { None })
    }
}

impl Binder for CollectionBinder {
    fn bind(&self, ctx: &mut BindingContext<'_>) -> Result<bool, BindError> {
        // Neither replacing the reference nor mutating the existing value is
        // legal for this target: binding is impossible.
        if updatable_type_arguments(
            &Capability::SEQUENCE,
            &Ty::open_vec(),
            &ctx.metadata,
            ctx.model.as_ref(),
        )
        .is_none()
        {
            return Ok(false);
        }

        let elements = match ctx.source.get_value(&ctx.model_name) {
            Some(raw) => Some(self.bind_simple(ctx, &raw)),
            None => self.bind_complex(ctx)?,
        };
        let Some(elements) = elements else {
            return Ok(false);
        };

        create_or_replace_sequence(&mut ctx.model, &self.elem_ty, elements, || {
            SeqValue::new(self.elem_ty.clone())
        });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_fresh_container_receives_the_elements_in_order() {
        let mut model = None;
        let incoming = vec![Value::int(1), Value::int(2), Value::int(2), Value::int(3)];
        let seq = create_or_replace_sequence(&mut model, &Ty::int(), incoming.clone(), || {
            SeqValue::new(Ty::int())
        });
        assert_eq!(seq.to_vec(), incoming);
        assert_eq!(model, Some(Value::Seq(seq)));
    }

    #[test]
    fn an_empty_element_sequence_still_commits() {
        let mut model = None;
        let seq =
            create_or_replace_sequence(&mut model, &Ty::int(), vec![], || SeqValue::new(Ty::int()));
        assert!(seq.is_empty());
        assert!(model.is_some());
    }

    #[test]
    fn a_mutable_container_of_the_right_type_is_reused_in_place() {
        let existing = SeqValue::new(Ty::int());
        existing.push(Value::int(99));
        let mut model = Some(Value::Seq(existing.clone()));

        let seq = create_or_replace_sequence(
            &mut model,
            &Ty::int(),
            vec![Value::int(1), Value::int(2)],
            || SeqValue::new(Ty::int()),
        );
        // Same object identity, fully replaced contents.
        assert!(seq.ptr_eq(&existing));
        assert_eq!(existing.to_vec(), vec![Value::int(1), Value::int(2)]);
    }

    #[test]
    fn a_frozen_or_mismatched_container_is_replaced() {
        let frozen = SeqValue::frozen(Ty::int(), vec![Value::int(99)]);
        let mut model = Some(Value::Seq(frozen.clone()));
        let seq =
            create_or_replace_sequence(&mut model, &Ty::int(), vec![Value::int(1)], || {
                SeqValue::new(Ty::int())
            });
        assert!(!seq.ptr_eq(&frozen));
        assert_eq!(frozen.to_vec(), vec![Value::int(99)]);

        let mismatched = SeqValue::new(Ty::string());
        let mut model = Some(Value::Seq(mismatched.clone()));
        let seq =
            create_or_replace_sequence(&mut model, &Ty::int(), vec![Value::int(1)], || {
                SeqValue::new(Ty::int())
            });
        assert!(!seq.ptr_eq(&mismatched));
    }
}
