// Value: Arc-wrapped element type for O(1) cloning
// Cloning a container shares it, so a cloned element is the same element

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A dynamically typed element.
///
/// Arrays, objects and strings are wrapped in `Arc`, so `clone` is O(1) and
/// keeps element identity: the clone of an object *is* that object as far as
/// [`Value::strict_equals`] is concerned.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Object(Arc<IndexMap<String, Value>>),
}

// ── Type checks ──────────────────────────────────────────────────────────────

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// `null` or `undefined`.
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

// ── Extraction ───────────────────────────────────────────────────────────────

impl Value {
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => {
                let f = *n;
                // i64::MAX as f64 rounds up to 2^63, which does not fit
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    Some(f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Index into an object by key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Index into an array by position.
    #[inline]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(arr) => arr.get(index),
            _ => None,
        }
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

impl Value {
    #[inline]
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    #[inline]
    pub fn array(v: Vec<Value>) -> Self {
        Value::Array(Arc::new(v))
    }

    #[inline]
    pub fn object(m: IndexMap<String, Value>) -> Self {
        Value::Object(Arc::new(m))
    }

    /// Build an object from `(key, value)` pairs, keeping pair order.
    pub fn object_from_pairs(pairs: Vec<(String, Value)>) -> Self {
        Value::Object(Arc::new(pairs.into_iter().collect()))
    }
}

// ── Identity, truthiness and ordering ────────────────────────────────────────

impl Value {
    /// Equality used by `==`, `contains` and `remove_element`.
    ///
    /// Primitives compare by value (`NaN` never equals `NaN`, as in IEEE-754);
    /// arrays and objects compare by identity, so two structurally equal but
    /// separately built objects are different elements.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Key matching for `group` and `distinct`: [`Value::strict_equals`]
    /// except that `NaN` matches `NaN`, so every key lands in exactly one
    /// bucket.
    pub fn same_key(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => self.strict_equals(other),
        }
    }

    /// Hashable form of [`Value::same_key`]: two values produce equal keys
    /// exactly when `same_key` holds. Container keys are addresses, so a key
    /// is only meaningful while the value it came from is alive.
    pub(crate) fn hash_key(&self) -> HashKey {
        match self {
            Value::Null => HashKey::Null,
            Value::Undefined => HashKey::Undefined,
            Value::Bool(b) => HashKey::Bool(*b),
            Value::Number(n) if n.is_nan() => HashKey::Number(f64::NAN.to_bits()),
            // -0 and 0 are the same key
            Value::Number(n) if *n == 0.0 => HashKey::Number(0.0f64.to_bits()),
            Value::Number(n) => HashKey::Number(n.to_bits()),
            Value::String(s) => HashKey::String(Arc::clone(s)),
            Value::Array(a) => HashKey::Address(Arc::as_ptr(a) as *const () as usize),
            Value::Object(o) => HashKey::Address(Arc::as_ptr(o) as *const () as usize),
        }
    }

    /// `false`, `0`, `NaN`, `""`, `null` and `undefined` are falsy; every
    /// other value, empty containers included, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null | Value::Undefined => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Ordering between two keys of the same orderable kind.
    ///
    /// Returns `None` when the kinds differ or are not orderable (only
    /// numbers, strings and booleans are). `NaN` sorts after every other
    /// number and equal to itself, so the order is total.
    pub fn compare_keys(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                Some(a.partial_cmp(b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan())))
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum HashKey {
    Null,
    Undefined,
    Bool(bool),
    Number(u64),
    String(Arc<str>),
    Address(usize),
}

// ── From impls ───────────────────────────────────────────────────────────────

impl From<bool> for Value {
    #[inline]
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u64> for Value {
    #[inline]
    fn from(n: u64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    #[inline]
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(v: Vec<Value>) -> Self {
        Value::Array(Arc::new(v))
    }
}

impl From<IndexMap<String, Value>> for Value {
    #[inline]
    fn from(m: IndexMap<String, Value>) -> Self {
        Value::Object(Arc::new(m))
    }
}

// ── PartialEq ────────────────────────────────────────────────────────────────

/// Structural (deep) equality. Operators never use this; they use
/// [`Value::strict_equals`] or [`Value::same_key`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

// ── Display ──────────────────────────────────────────────────────────────────

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => format_number(*n, f),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(arr) => {
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    if !v.is_nullish() {
                        write!(f, "{}", v)?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => write!(f, "[object Object]"),
        }
    }
}

/// Number display used by string concatenation: integral values print
/// without a fractional part.
fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        write!(f, "{}", if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{}", n)
    }
}

// ── Serialization ────────────────────────────────────────────────────────────

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null | Value::Undefined => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => {
                if n.is_nan() || n.is_infinite() {
                    serializer.serialize_none()
                } else if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for v in arr.iter() {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
        }
    }
}

// ── Deserialization (single-pass JSON→Value) ─────────────────────────────────

impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "any valid JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::string(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v.into()))
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut vec = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(elem) = seq.next_element()? {
            vec.push(elem);
        }
        Ok(Value::array(vec))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut m = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((k, v)) = map.next_entry()? {
            m.insert(k, v);
        }
        Ok(Value::object(m))
    }
}

// ── JSON string I/O ──────────────────────────────────────────────────────────

impl Value {
    /// Serialize to a JSON string. `undefined` serializes as `null`.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a JSON string into a Value (single pass, no intermediate
    /// `serde_json::Value`).
    pub fn from_json_str(s: &str) -> Result<Value, serde_json::Error> {
        serde_json::from_str(s)
    }
}

// ── Conversion from serde_json::Value ────────────────────────────────────────

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.into()),
            serde_json::Value::Array(arr) => {
                Value::Array(Arc::new(arr.into_iter().map(Value::from).collect()))
            }
            serde_json::Value::Object(map) => {
                let m: IndexMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
                Value::Object(Arc::new(m))
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null | Value::Undefined => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(serde_json::Value::from).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// ── value! macro ─────────────────────────────────────────────────────────────

/// Macro for constructing Value literals, similar to `serde_json::json!`
///
/// Usage:
///   value!(null)           → Value::Null
///   value!(true)           → Value::Bool(true)
///   value!(42)             → Value::Number(42.0)
///   value!("hello")        → Value::String("hello")
///   value!([1, 2, 3])      → Value::Array(..)
///   value!({"k": v, ...})  → Value::Object(..) in key order
///   value!(expr)           → Value::from(expr)
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::value::Value::Null
    };

    (true) => {
        $crate::value::Value::Bool(true)
    };

    (false) => {
        $crate::value::Value::Bool(false)
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::value::Value::array(vec![ $( $crate::value!($elem) ),* ])
    };

    ({ $($key:tt : $val:tt),* $(,)? }) => {
        $crate::value::Value::object_from_pairs(vec![
            $( (($key).to_string(), $crate::value!($val)) ),*
        ])
    };

    ($other:expr) => {
        $crate::value::Value::from($other)
    };
}

// ── Tests ────────────────────────────────────────────────────────────────────
