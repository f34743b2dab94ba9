//! Value model: plain data, wrappers and opaque instances

use crate::path::push_pointer_token;
use crate::types::{ValueKind, WrapperKind};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// String-keyed mapping. Key order carries no meaning.
pub type Mapping = BTreeMap<String, Value>;

/// A node in a possibly wrapped value tree
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null / absent marker
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(Number),
    /// UTF-8 string value
    String(String),
    /// Ordered, index-addressable sequence
    Sequence(Vec<Value>),
    /// String-keyed mapping
    Mapping(Mapping),
    /// Value carrying tracking identity around exactly one inner value
    Wrapped(Wrapper),
    /// Class instance that is neither container nor wrapper; never traversed
    Opaque(Opaque),
}

impl Value {
    /// Kind tag for this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Sequence(_) => ValueKind::Sequence,
            Value::Mapping(_) => ValueKind::Mapping,
            Value::Wrapped(_) => ValueKind::Wrapped,
            Value::Opaque(_) => ValueKind::Opaque,
        }
    }

    /// Human-readable type name
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// True for null, booleans, numbers and strings
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
        )
    }

    /// Borrow the mapping, if this is one
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the sequence, if this is one
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the wrapper, if this is one
    pub fn as_wrapper(&self) -> Option<&Wrapper> {
        match self {
            Value::Wrapped(wrapper) => Some(wrapper),
            _ => None,
        }
    }

    /// True when no wrapper appears anywhere in the traversable structure.
    ///
    /// Opaque payloads are not inspected.
    pub fn is_plain(&self) -> bool {
        self.find_wrapper().is_none()
    }

    /// JSON Pointer path of the first wrapper found (mappings in key order)
    pub fn find_wrapper(&self) -> Option<String> {
        let mut path = String::new();
        if find_wrapper_at(self, &mut path) {
            Some(path)
        } else {
            None
        }
    }
}

fn find_wrapper_at(value: &Value, path: &mut String) -> bool {
    match value {
        Value::Wrapped(_) => true,
        Value::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                let mark = path.len();
                push_pointer_token(path, &index.to_string());
                if find_wrapper_at(item, path) {
                    return true;
                }
                path.truncate(mark);
            }
            false
        }
        Value::Mapping(map) => {
            for (key, item) in map {
                let mark = path.len();
                push_pointer_token(path, key);
                if find_wrapper_at(item, path) {
                    return true;
                }
                path.truncate(mark);
            }
            false
        }
        _ => false,
    }
}

/// Shared single-slot wrapper around a [`Value`]
///
/// Clones share the slot, so a `set` through one handle is visible through
/// every other. A wrapper can therefore be made to contain itself; such a
/// cyclic value must not be traversed, compared or debug-printed.
#[derive(Clone)]
pub struct Wrapper {
    kind: WrapperKind,
    slot: Arc<RwLock<Value>>,
}

impl Wrapper {
    /// Wrap `value` with the given kind
    pub fn new(kind: WrapperKind, value: impl Into<Value>) -> Self {
        Self {
            kind,
            slot: Arc::new(RwLock::new(value.into())),
        }
    }

    /// Single-slot reference cell
    pub fn reference(value: impl Into<Value>) -> Self {
        Self::new(WrapperKind::Ref, value)
    }

    /// Tracked mutable object
    pub fn reactive(value: impl Into<Value>) -> Self {
        Self::new(WrapperKind::Reactive, value)
    }

    /// Transparent interception wrapper
    pub fn proxy(value: impl Into<Value>) -> Self {
        Self::new(WrapperKind::Proxy, value)
    }

    /// Wrapper kind
    pub fn kind(&self) -> WrapperKind {
        self.kind
    }

    /// Strip exactly one layer, returning a copy of the inner value
    pub fn get(&self) -> Value {
        self.read().clone()
    }

    /// Run `f` against the inner value without copying it
    pub fn with<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.read())
    }

    /// Replace the inner value, returning the previous one
    pub fn set(&self, value: impl Into<Value>) -> Value {
        std::mem::replace(&mut *self.write(), value.into())
    }

    /// True when both handles share the same slot
    pub fn ptr_eq(&self, other: &Wrapper) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Value> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PartialEq for Wrapper {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        if self.ptr_eq(other) {
            return true;
        }
        self.with(|mine| other.with(|theirs| mine == theirs))
    }
}

impl fmt::Debug for Wrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapper")
            .field("kind", &self.kind)
            .field("value", &*self.read())
            .finish()
    }
}

/// Class instance carried through unchanged
#[derive(Debug, Clone, PartialEq)]
pub struct Opaque {
    class: String,
    data: Arc<Value>,
}

impl Opaque {
    /// Create an opaque instance of `class` holding `data`
    pub fn new(class: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            class: class.into(),
            data: Arc::new(data.into()),
        }
    }

    /// Class name
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Payload (may itself contain wrappers; it is never inspected)
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// True when both instances share the same payload allocation
    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(value.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON form and become `Null`
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Sequence(value)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Value::Mapping(value)
    }
}

impl From<Wrapper> for Value {
    fn from(value: Wrapper) -> Self {
        Value::Wrapped(value)
    }
}

impl From<Opaque> for Value {
    fn from(value: Opaque) -> Self {
        Value::Opaque(value)
    }
}

impl<V: Into<Value>> FromIterator<(String, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Value::Mapping(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
