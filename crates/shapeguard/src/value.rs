//! Dynamic value model for validated object graphs
//!
//! An [`Instance`] is a shared, class-tagged object whose properties can be
//! read and stripped while other parts of the graph still hold a reference to
//! it. Graphs may contain back-references, so identity is pointer identity.

use parking_lot::RwLock;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A property value inside an object graph
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent property
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Ordered collection, e.g. an array or set
    List(Vec<Value>),
    /// Keyed collection
    Map(BTreeMap<String, Value>),
    /// Class-shaped object
    Object(Instance),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for both `Undefined` and `Null`
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Elements of an iterable value paired with their position label
    /// (list index or map key). `None` for non-iterable values.
    pub fn entries(&self) -> Option<Vec<(String, &Value)>> {
        match self {
            Value::List(items) => Some(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), item))
                    .collect(),
            ),
            Value::Map(map) => Some(map.iter().map(|(key, item)| (key.clone(), item)).collect()),
            _ => None,
        }
    }

    /// Name of the value's type, used in messages and logs
    pub fn type_name(&self) -> &str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "array",
            Value::Map(_) => "map",
            Value::Object(instance) => instance.class_name().unwrap_or("object"),
        }
    }

    /// Convert to JSON. Back-references are rendered as `"[Circular]"`.
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_guarded(&mut Vec::new())
    }

    fn to_json_guarded(&self, path: &mut Vec<usize>) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(
                items.iter().map(|item| item.to_json_guarded(path)).collect(),
            ),
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), item.to_json_guarded(path)))
                    .collect(),
            ),
            Value::Object(instance) => instance.to_json_guarded(path),
        }
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }
                    match item {
                        Value::List(_) | Value::Map(_) | Value::Object(_) => {
                            write!(f, "[{}]", item.type_name())?
                        }
                        _ => write!(f, "{}", item)?,
                    }
                }
                Ok(())
            }
            Value::Map(_) => write!(f, "[object Map]"),
            Value::Object(instance) => {
                write!(f, "[object {}]", instance.class_name().unwrap_or("Object"))
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
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

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<Instance> for Value {
    fn from(value: Instance) -> Self {
        Value::Object(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}

struct InstanceInner {
    class: Option<String>,
    properties: RwLock<Vec<(String, Value)>>,
}

/// Shared handle to a class-shaped object.
///
/// Cloning the handle does not copy the object; both handles observe the same
/// properties, including removals made by whitelist stripping.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

impl Instance {
    /// Create an empty instance of the given class
    pub fn new(class: impl Into<String>) -> Self {
        Self::with_class(Some(class.into()))
    }

    /// Create an empty plain mapping without a class
    pub fn plain() -> Self {
        Self::with_class(None)
    }

    fn with_class(class: Option<String>) -> Self {
        Self {
            inner: Arc::new(InstanceInner {
                class,
                properties: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Build an instance from a JSON object. Non-object JSON yields an empty instance.
    pub fn from_json(class: impl Into<String>, json: serde_json::Value) -> Self {
        let instance = Self::new(class);
        if let serde_json::Value::Object(map) = json {
            for (name, value) in map {
                instance.set(name, Value::from(value));
            }
        }
        instance
    }

    /// Builder-style property assignment
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn class_name(&self) -> Option<&str> {
        self.inner.class.as_deref()
    }

    pub fn is_plain(&self) -> bool {
        self.inner.class.is_none()
    }

    /// Read a property, `Value::Undefined` when absent
    pub fn get(&self, name: &str) -> Value {
        self.inner
            .properties
            .read()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .unwrap_or(Value::Undefined)
    }

    /// Assign a property. Assigning `Value::Undefined` removes it.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if value.is_undefined() {
            self.remove(&name);
            return;
        }

        let mut properties = self.inner.properties.write();
        match properties.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => properties.push((name, value)),
        }
    }

    /// Delete a property, returning its previous value
    pub fn remove(&self, name: &str) -> Option<Value> {
        let mut properties = self.inner.properties.write();
        let position = properties.iter().position(|(key, _)| key == name)?;
        Some(properties.remove(position).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.properties.read().iter().any(|(key, _)| key == name)
    }

    /// Own property names in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .properties
            .read()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.properties.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.properties.read().is_empty()
    }

    /// Stable identity of the underlying object
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Convert to a JSON object. Back-references are rendered as `"[Circular]"`.
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_guarded(&mut Vec::new())
    }

    fn to_json_guarded(&self, path: &mut Vec<usize>) -> serde_json::Value {
        let id = self.identity();
        if path.contains(&id) {
            return serde_json::Value::String("[Circular]".to_string());
        }

        path.push(id);
        let snapshot = self.inner.properties.read().clone();
        let map = snapshot
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json_guarded(path)))
            .collect();
        path.pop();
        serde_json::Value::Object(map)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.inner.class)
            .field("properties", &self.keys())
            .finish()
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
