//! `Sequence`: an ordered collection of [`Value`]s with query operators.
//!
//! ```
//! use linq_core::{value, IntoSequence};
//!
//! let people = vec![
//!     value!({"name": "Ada", "age": 36}),
//!     value!({"name": "Alan", "age": 41}),
//!     value!({"name": "Grace", "age": 85}),
//! ]
//! .into_sequence();
//!
//! let names = people
//!     .where_("p => p.age > 40")?
//!     .order_by_desc("p => p.age")?
//!     .select("p => p.name")?;
//! assert_eq!(names.into_vec(), vec![value!("Grace"), value!("Alan")]);
//! # Ok::<(), linq_core::Error>(())
//! ```

use std::cmp::Ordering;
use std::ops::{Deref, Index};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::compiler::{IntoLambda, Lambda};
use crate::error::{Error, Result};
use crate::value::Value;

/// Ordered, index-addressable, mutable collection of elements.
///
/// Operators that return a `Sequence` share elements with the receiver:
/// containers are not copied, so `where_`, `take`, `order_by` and friends
/// return the same elements by identity. Only `select`/`select_many`
/// produce new values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence {
    items: Vec<Value>,
}

/// One bucket produced by [`Sequence::group`].
///
/// Serializes as `{"key": .., "items": [..]}`. Converting into a [`Value`]
/// gives the same object shape, so groups can be collected into a
/// `Sequence` and queried further.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    key: Value,
    items: Sequence,
}

impl Group {
    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn items(&self) -> &Sequence {
        &self.items
    }

    pub fn into_items(self) -> Sequence {
        self.items
    }
}

impl Deref for Group {
    type Target = Sequence;

    fn deref(&self) -> &Sequence {
        &self.items
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

// ── Collection basics ────────────────────────────────────────────────────────

impl Sequence {
    pub fn new() -> Self {
        Sequence { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Sequence {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Marker for code that needs to tell a query-capable sequence apart
    /// from a plain list. Always true: the type is the marker.
    pub const fn is_linq_array() -> bool {
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.items.push(value.into());
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.items
    }

    pub fn from_json_str(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json_string(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ── Searching ────────────────────────────────────────────────────────────────

impl Sequence {
    /// First element satisfying `predicate`, or `None`.
    pub fn first(&self, predicate: impl IntoLambda) -> Result<Option<Value>> {
        let predicate = predicate.into_lambda()?;
        for item in &self.items {
            if predicate.test(item)? {
                return Ok(Some(item.clone()));
            }
        }
        Ok(None)
    }

    /// Last element satisfying `predicate`, or `None`.
    pub fn last(&self, predicate: impl IntoLambda) -> Result<Option<Value>> {
        let predicate = predicate.into_lambda()?;
        for item in self.items.iter().rev() {
            if predicate.test(item)? {
                return Ok(Some(item.clone()));
            }
        }
        Ok(None)
    }

    /// Position of the first element satisfying `predicate`.
    pub fn find_index(&self, predicate: impl IntoLambda) -> Result<Option<usize>> {
        let predicate = predicate.into_lambda()?;
        for (index, item) in self.items.iter().enumerate() {
            if predicate.test(item)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    pub fn any(&self, predicate: impl IntoLambda) -> Result<bool> {
        Ok(self.find_index(predicate)?.is_some())
    }

    /// True if some element is [`Value::strict_equals`] to `value`.
    pub fn contains(&self, value: &Value) -> bool {
        self.items.iter().any(|item| item.strict_equals(value))
    }
}

// ── Filtering and projection ─────────────────────────────────────────────────

impl Sequence {
    pub fn where_(&self, predicate: impl IntoLambda) -> Result<Sequence> {
        let predicate = predicate.into_lambda()?;
        let mut out = Vec::new();
        for item in &self.items {
            if predicate.test(item)? {
                out.push(item.clone());
            }
        }
        Ok(Sequence { items: out })
    }

    pub fn select(&self, selector: impl IntoLambda) -> Result<Sequence> {
        let selector = selector.into_lambda()?;
        let items = self
            .items
            .iter()
            .map(|item| selector.apply(item))
            .collect::<Result<Vec<_>>>()?;
        Ok(Sequence { items })
    }

    /// Concatenate the arrays `selector` returns for each element.
    pub fn select_many(&self, selector: impl IntoLambda) -> Result<Sequence> {
        let selector = selector.into_lambda()?;
        let mut out = Vec::new();
        for item in &self.items {
            match selector.apply(item)? {
                Value::Array(inner) => out.extend(inner.iter().cloned()),
                other => {
                    return Err(Error::TypeMismatch(format!(
                        "select_many selector must return an array, got {}",
                        other.type_name()
                    )))
                }
            }
        }
        Ok(Sequence { items: out })
    }

    pub fn take(&self, count: usize) -> Sequence {
        self.items.iter().take(count).cloned().collect()
    }

    pub fn skip(&self, count: usize) -> Sequence {
        self.items.iter().skip(count).cloned().collect()
    }

    /// Shallow copy: same elements, same order, independent structure.
    pub fn copy(&self) -> Sequence {
        self.clone()
    }
}

// ── Grouping and de-duplication ──────────────────────────────────────────────

impl Sequence {
    /// Bucket elements by `selector`, in first-seen key order.
    pub fn group(&self, selector: impl IntoLambda) -> Result<Vec<Group>> {
        let selector = selector.into_lambda()?;
        let keys = self.keys(&selector)?;

        let mut groups: IndexMap<_, Group> = IndexMap::new();
        for (key, item) in keys.into_iter().zip(&self.items) {
            groups
                .entry(key.hash_key())
                .or_insert_with(|| Group {
                    key,
                    items: Sequence::new(),
                })
                .items
                .items
                .push(item.clone());
        }
        Ok(groups.into_values().collect())
    }

    /// Drop repeated elements, keeping the first occurrence of each.
    pub fn distinct(&self) -> Sequence {
        self.distinct_by_keys(&self.items)
    }

    /// Keep the first element for each distinct `selector` output.
    pub fn distinct_by(&self, selector: impl IntoLambda) -> Result<Sequence> {
        let selector = selector.into_lambda()?;
        let keys = self.keys(&selector)?;
        Ok(self.distinct_by_keys(&keys))
    }

    fn distinct_by_keys(&self, keys: &[Value]) -> Sequence {
        let mut seen: IndexMap<_, &Value> = IndexMap::new();
        for (key, item) in keys.iter().zip(&self.items) {
            seen.entry(key.hash_key()).or_insert(item);
        }
        seen.into_values().cloned().collect()
    }

    fn keys(&self, selector: &Lambda) -> Result<Vec<Value>> {
        self.items.iter().map(|item| selector.apply(item)).collect()
    }
}

// ── Aggregation ──────────────────────────────────────────────────────────────

impl Sequence {
    /// Sum of the selector's numeric outputs; `0` for an empty sequence.
    pub fn sum(&self, selector: impl IntoLambda) -> Result<f64> {
        let selector = selector.into_lambda()?;
        self.numbers("sum", &selector).map(|ns| ns.iter().sum())
    }

    pub fn avg(&self, selector: impl IntoLambda) -> Result<f64> {
        let selector = selector.into_lambda()?;
        let numbers = self.numbers("avg", &selector)?;
        if numbers.is_empty() {
            return Err(Error::EmptySequence("avg"));
        }
        Ok(numbers.iter().sum::<f64>() / numbers.len() as f64)
    }

    /// Largest key; the first one wins a tie.
    pub fn max(&self, selector: impl IntoLambda) -> Result<Value> {
        self.extreme("max", selector, Ordering::Greater)
    }

    /// Smallest key; the first one wins a tie.
    pub fn min(&self, selector: impl IntoLambda) -> Result<Value> {
        self.extreme("min", selector, Ordering::Less)
    }

    fn numbers(&self, op: &str, selector: &Lambda) -> Result<Vec<f64>> {
        self.items
            .iter()
            .map(|item| match selector.apply(item)? {
                Value::Number(n) => Ok(n),
                other => Err(Error::TypeMismatch(format!(
                    "{} selector must return numbers, got {}",
                    op,
                    other.type_name()
                ))),
            })
            .collect()
    }

    fn extreme(&self, op: &'static str, selector: impl IntoLambda, wins: Ordering) -> Result<Value> {
        let selector = selector.into_lambda()?;
        let keys = self.keys(&selector)?;
        check_orderable(op, &keys)?;

        let mut keys = keys.into_iter();
        let mut best = keys.next().ok_or(Error::EmptySequence(op))?;
        for key in keys {
            if key.compare_keys(&best) == Some(wins) {
                best = key;
            }
        }
        Ok(best)
    }
}

// ── Ordering ─────────────────────────────────────────────────────────────────

impl Sequence {
    /// Stable ascending sort by `selector`.
    pub fn order_by(&self, selector: impl IntoLambda) -> Result<Sequence> {
        self.sorted(selector, Direction::Ascending)
    }

    /// Stable descending sort by `selector`.
    pub fn order_by_desc(&self, selector: impl IntoLambda) -> Result<Sequence> {
        self.sorted(selector, Direction::Descending)
    }

    fn sorted(&self, selector: impl IntoLambda, direction: Direction) -> Result<Sequence> {
        let selector = selector.into_lambda()?;
        let keys = self.keys(&selector)?;
        check_orderable("order_by", &keys)?;

        let mut keyed: Vec<(Value, &Value)> = keys.into_iter().zip(&self.items).collect();
        keyed.sort_by(|(a, _), (b, _)| {
            direction.apply(a.compare_keys(b).unwrap_or(Ordering::Equal))
        });
        Ok(keyed.into_iter().map(|(_, item)| item.clone()).collect())
    }
}

/// All keys must share one orderable kind.
fn check_orderable(op: &str, keys: &[Value]) -> Result<()> {
    let Some(first) = keys.first() else {
        return Ok(());
    };
    for key in keys {
        if key.compare_keys(first).is_none() {
            return Err(Error::TypeMismatch(format!(
                "{} keys must all be numbers, strings or booleans, got {} and {}",
                op,
                first.type_name(),
                key.type_name()
            )));
        }
    }
    Ok(())
}

// ── Mutation ─────────────────────────────────────────────────────────────────

impl Sequence {
    /// Empty the sequence in place.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Remove the first element identical to `element`. Returns whether one
    /// was removed.
    pub fn remove_element(&mut self, element: &Value) -> bool {
        match self.items.iter().position(|item| item.strict_equals(element)) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove and return the element at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<Value> {
        if index >= self.items.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }
}

// ── Conversions ──────────────────────────────────────────────────────────────

impl Deref for Sequence {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.items
    }
}

impl Index<usize> for Sequence {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.items[index]
    }
}

impl From<Vec<Value>> for Sequence {
    fn from(items: Vec<Value>) -> Self {
        Sequence { items }
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Self {
        Value::array(seq.items)
    }
}

impl From<Group> for Value {
    fn from(group: Group) -> Self {
        Value::object_from_pairs(vec![
            ("key".to_string(), group.key),
            ("items".to_string(), group.items.into()),
        ])
    }
}

impl TryFrom<Value> for Sequence {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Sequence {
                items: items.as_ref().clone(),
            }),
            other => Err(Error::TypeMismatch(format!(
                "expected an array, got {}",
                other.type_name()
            ))),
        }
    }
}

impl FromIterator<Value> for Sequence {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Sequence {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<Value> for Sequence {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl IntoIterator for Sequence {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Opt a plain list into the query operators.
pub trait IntoSequence {
    fn into_sequence(self) -> Sequence;
}

impl<T: Into<Value>> IntoSequence for Vec<T> {
    fn into_sequence(self) -> Sequence {
        self.into_iter().map(Into::into).collect()
    }
}

impl IntoSequence for &[Value] {
    fn into_sequence(self) -> Sequence {
        self.iter().cloned().collect()
    }
}
