//! The dynamic value model produced by binding.
//!
//! Bound models are [`Value`]s. Containers are shared handles
//! (`Rc`-backed, request-local — the binding call chain is single-threaded)
//! so that "reuse the existing container" is observable: two handles to the
//! same container compare pointer-equal, and mutating through one is visible
//! through the other.

use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::language::{Capability, ScalarKind, Ty};

/// A dynamically-typed bound value.
#[derive(Clone)]
pub enum Value {
    Scalar(ScalarValue),
    Bytes(Vec<u8>),
    Seq(SeqValue),
    Map(MapValue),
}

/// A scalar value. Usable as a mapping key: floats compare and hash by bit
/// pattern.
#[derive(Clone)]
pub enum ScalarValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ScalarValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::Str(_) => ScalarKind::String,
            ScalarValue::Int(_) => ScalarKind::Int,
            ScalarValue::Float(_) => ScalarKind::Float,
            ScalarValue::Bool(_) => ScalarKind::Bool,
        }
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScalarValue::Str(a), ScalarValue::Str(b)) => a == b,
            (ScalarValue::Int(a), ScalarValue::Int(b)) => a == b,
            (ScalarValue::Float(a), ScalarValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ScalarValue::Bool(a), ScalarValue::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ScalarValue {}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ScalarValue::Str(s) => s.hash(state),
            ScalarValue::Int(i) => i.hash(state),
            ScalarValue::Float(f) => f.to_bits().hash(state),
            ScalarValue::Bool(b) => b.hash(state),
        }
    }
}

impl Debug for ScalarValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Str(s) => write!(f, "{s:?}"),
            ScalarValue::Int(i) => write!(f, "{i}"),
            ScalarValue::Float(x) => write!(f, "{x}"),
            ScalarValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Str(value.to_owned())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Str(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

/// A shared, growable sequence container tagged with its element type.
#[derive(Clone)]
pub struct SeqValue {
    inner: Rc<SeqInner>,
}

struct SeqInner {
    elem_ty: Ty,
    frozen: bool,
    items: RefCell<Vec<Value>>,
}

impl SeqValue {
    pub fn new(elem_ty: Ty) -> Self {
        Self {
            inner: Rc::new(SeqInner {
                elem_ty,
                frozen: false,
                items: RefCell::new(Vec::new()),
            }),
        }
    }

    /// An immutable sequence instance. Attempts to mutate it panic, and the
    /// materialization helpers refuse to reuse it.
    pub fn frozen(elem_ty: Ty, items: Vec<Value>) -> Self {
        Self {
            inner: Rc::new(SeqInner {
                elem_ty,
                frozen: true,
                items: RefCell::new(items),
            }),
        }
    }

    pub fn elem_ty(&self) -> &Ty {
        &self.inner.elem_ty
    }

    pub fn is_frozen(&self) -> bool {
        self.inner.frozen
    }

    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        assert!(!self.is_frozen(), "attempted to mutate a frozen sequence");
        self.inner.items.borrow_mut().clear();
    }

    pub fn push(&self, element: Value) {
        assert!(!self.is_frozen(), "attempted to mutate a frozen sequence");
        self.inner.items.borrow_mut().push(element);
    }

    /// A snapshot of the current contents.
    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.items.borrow().clone()
    }

    /// Whether two handles point at the same underlying container.
    pub fn ptr_eq(&self, other: &SeqValue) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A shared, insertion-ordered mapping container tagged with its key and
/// value types.
#[derive(Clone)]
pub struct MapValue {
    inner: Rc<MapInner>,
}

struct MapInner {
    key_ty: Ty,
    value_ty: Ty,
    frozen: bool,
    entries: RefCell<IndexMap<ScalarValue, Value>>,
}

impl MapValue {
    pub fn new(key_ty: Ty, value_ty: Ty) -> Self {
        Self {
            inner: Rc::new(MapInner {
                key_ty,
                value_ty,
                frozen: false,
                entries: RefCell::new(IndexMap::new()),
            }),
        }
    }

    /// An immutable mapping instance.
    pub fn frozen(key_ty: Ty, value_ty: Ty, entries: Vec<(ScalarValue, Value)>) -> Self {
        Self {
            inner: Rc::new(MapInner {
                key_ty,
                value_ty,
                frozen: true,
                entries: RefCell::new(entries.into_iter().collect()),
            }),
        }
    }

    pub fn key_ty(&self) -> &Ty {
        &self.inner.key_ty
    }

    pub fn value_ty(&self) -> &Ty {
        &self.inner.value_ty
    }

    pub fn is_frozen(&self) -> bool {
        self.inner.frozen
    }

    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        assert!(!self.is_frozen(), "attempted to mutate a frozen mapping");
        self.inner.entries.borrow_mut().clear();
    }

    /// Upsert: a later write for the same key wins, keeping the key's
    /// original position in the iteration order.
    pub fn insert(&self, key: ScalarValue, value: Value) {
        assert!(!self.is_frozen(), "attempted to mutate a frozen mapping");
        self.inner.entries.borrow_mut().insert(key, value);
    }

    pub fn get(&self, key: &ScalarValue) -> Option<Value> {
        self.inner.entries.borrow().get(key).cloned()
    }

    /// A snapshot of the current entries, in insertion order.
    pub fn entries(&self) -> Vec<(ScalarValue, Value)> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn ptr_eq(&self, other: &MapValue) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Value {
    pub fn str(value: impl Into<String>) -> Self {
        Value::Scalar(ScalarValue::Str(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Value::Scalar(ScalarValue::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Value::Scalar(ScalarValue::Float(value))
    }

    pub fn bool(value: bool) -> Self {
        Value::Scalar(ScalarValue::Bool(value))
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&SeqValue> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Check whether this value is an instance of a closed capability
    /// interface.
    pub fn implements(&self, interface: &Ty) -> bool {
        let Ty::Named(interface) = interface else {
            return false;
        };
        match self {
            Value::Seq(seq) => {
                interface.name == Capability::SEQUENCE.name()
                    && interface.args.len() == 1
                    && &interface.args[0] == seq.elem_ty()
            }
            Value::Map(map) => {
                interface.name == Capability::MAPPING.name()
                    && interface.args == [map.key_ty().clone(), map.value_ty().clone()]
            }
            _ => false,
        }
    }

    /// The instance-level read-only flag, for container values.
    pub fn container_is_frozen(&self) -> Option<bool> {
        match self {
            Value::Seq(seq) => Some(seq.is_frozen()),
            Value::Map(map) => Some(map.is_frozen()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => {
                a.elem_ty() == b.elem_ty() && a.to_vec() == b.to_vec()
            }
            (Value::Map(a), Value::Map(b)) => {
                a.key_ty() == b.key_ty()
                    && a.value_ty() == b.value_ty()
                    && a.entries() == b.entries()
            }
            _ => false,
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "bytes[{}]", b.len()),
            Value::Seq(s) => f.debug_list().entries(s.to_vec()).finish(),
            Value::Map(m) => f.debug_map().entries(m.entries()).finish(),
        }
    }
}

impl From<ScalarValue> for Value {
    fn from(value: ScalarValue) -> Self {
        Value::Scalar(value)
    }
}

impl From<SeqValue> for Value {
    fn from(value: SeqValue) -> Self {
        Value::Seq(value)
    }
}

impl From<MapValue> for Value {
    fn from(value: MapValue) -> Self {
        Value::Map(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_handles_share_the_underlying_container() {
        let a = SeqValue::new(Ty::int());
        let b = a.clone();
        a.push(Value::int(1));
        assert_eq!(b.to_vec(), vec![Value::int(1)]);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&SeqValue::new(Ty::int())));
    }

    #[test]
    fn mapping_upsert_keeps_first_position_and_last_value() {
        let map = MapValue::new(Ty::string(), Ty::int());
        map.insert("a".into(), Value::int(1));
        map.insert("b".into(), Value::int(2));
        map.insert("a".into(), Value::int(3));
        assert_eq!(
            map.entries(),
            vec![
                (ScalarValue::from("a"), Value::int(3)),
                (ScalarValue::from("b"), Value::int(2)),
            ]
        );
    }

    #[test]
    fn values_implement_their_closed_interfaces() {
        let seq = Value::Seq(SeqValue::new(Ty::int()));
        assert!(seq.implements(&Ty::sequence(Ty::int())));
        assert!(!seq.implements(&Ty::sequence(Ty::string())));
        assert!(!seq.implements(&Ty::mapping(Ty::string(), Ty::int())));

        let map = Value::Map(MapValue::new(Ty::string(), Ty::int()));
        assert!(map.implements(&Ty::mapping(Ty::string(), Ty::int())));
        assert!(!map.implements(&Ty::sequence(Ty::int())));
    }

    #[test]
    fn float_scalars_are_hashable_by_bit_pattern() {
        let map = MapValue::new(Ty::float(), Ty::int());
        map.insert(ScalarValue::Float(1.5), Value::int(1));
        map.insert(ScalarValue::Float(1.5), Value::int(2));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&ScalarValue::Float(1.5)), Some(Value::int(2)));
    }
}
