//! Structural values for trace records.
//!
//! A [`Value`] is a scalar, a list, a named record with an ordered field
//! list, or a keyed map. Equality is structural and ignores key order;
//! rendering is canonical and always emits keys in lexicographic order, so
//! the two never depend on how a record was built.
//!
//! Values are finite trees. Nothing here detects cycles, and the owned
//! representation cannot build one.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Write};

/// Non-composite value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scalar {
    /// Boolean flag
    Bool(bool),
    /// Integer (every memory cell fits)
    Int(i64),
    /// Text
    Str(String),
}

/// Named record with a declared field order
#[derive(Debug, Clone)]
pub struct Record {
    kind: String,
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty record of the given kind
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: IndexMap::new(),
        }
    }

    /// Append a field, replacing any previous value under the same name
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl ToValue) -> Self {
        self.fields.insert(name.into(), value.to_value());
        self
    }

    /// Insert a field in place
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Record kind, used to look up equality overrides
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Fields in declared order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Structural value
#[derive(Debug, Clone)]
pub enum Value {
    /// Scalar leaf
    Scalar(Scalar),
    /// Positional list
    List(Vec<Value>),
    /// Named record
    Record(Record),
    /// Keyed map
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Integer value
    #[must_use]
    pub fn int(v: impl Into<i64>) -> Self {
        Self::Scalar(Scalar::Int(v.into()))
    }

    /// String value
    #[must_use]
    pub fn str(v: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Str(v.into()))
    }

    /// Boolean value
    #[must_use]
    pub fn bool(v: bool) -> Self {
        Self::Scalar(Scalar::Bool(v))
    }

    /// Whether this is a record or a map
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Record(_) | Self::Map(_))
    }

    /// Look up a key in a record or map
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Record(r) => r.get(key),
            Self::Map(m) => m.get(key),
            _ => None,
        }
    }

    /// Integer payload, if this is an integer scalar
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Scalar(Scalar::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Boolean payload, if this is a boolean scalar
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Scalar(Scalar::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Number of keys of a composite, `None` otherwise
    fn key_count(&self) -> Option<usize> {
        match self {
            Self::Record(r) => Some(r.len()),
            Self::Map(m) => Some(m.len()),
            _ => None,
        }
    }

    /// Composite entries sorted by key; empty for scalars and lists
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, &Value)> {
        match self {
            Self::Record(r) => {
                let mut entries: Vec<_> = r.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                entries
            }
            Self::Map(m) => m.iter().map(|(k, v)| (k.as_str(), v)).collect(),
            _ => Vec::new(),
        }
    }

    /// Restore record kinds that the text form drops.
    ///
    /// A map becomes a record of `kind`. Each of its fields is rebuilt with
    /// the kind `resolve(kind, field)` names; fields it names no kind for are
    /// kept as they are. List items share the kind of their field. Values
    /// that are already records are left alone.
    #[must_use]
    pub fn with_kinds<F>(self, kind: &str, resolve: &F) -> Self
    where
        F: Fn(&str, &str) -> Option<&'static str>,
    {
        match self {
            Self::Map(fields) => {
                let mut record = Record::new(kind);
                for (name, value) in fields {
                    let value = match resolve(kind, &name) {
                        Some(child) => value.with_kinds(child, resolve),
                        None => value,
                    };
                    record.insert(name, value);
                }
                Self::Record(record)
            }
            Self::List(items) => {
                Self::List(items.into_iter().map(|v| v.with_kinds(kind, resolve)).collect())
            }
            other => other,
        }
    }
}

/// Replaces structural equality for a record kind
pub type EqualityFn = fn(&Record, &Record) -> bool;

/// Per-kind equality overrides
#[derive(Debug, Clone, Default)]
pub struct EqualityOverrides {
    by_kind: HashMap<String, EqualityFn>,
}

impl EqualityOverrides {
    /// No overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an override for a record kind
    #[must_use]
    pub fn with(mut self, kind: impl Into<String>, f: EqualityFn) -> Self {
        self.by_kind.insert(kind.into(), f);
        self
    }

    /// Override registered for a kind
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<EqualityFn> {
        self.by_kind.get(kind).copied()
    }
}

/// Structural equality with no overrides.
///
/// Scalars compare by type and value, lists positionally, and composites by
/// key set and per-key equality regardless of insertion order.
#[must_use]
pub fn equal(a: &Value, b: &Value) -> bool {
    equal_with(a, b, &EqualityOverrides::default())
}

/// Structural equality honouring per-kind overrides.
///
/// An override applies only when both sides are records of the same kind;
/// it replaces the recursive comparison for that pair entirely.
#[must_use]
pub fn equal_with(a: &Value, b: &Value, overrides: &EqualityOverrides) -> bool {
    match (a, b) {
        (Value::Scalar(x), Value::Scalar(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(v, w)| equal_with(v, w, overrides))
        }
        (Value::Record(x), Value::Record(y)) if x.kind() == y.kind() => {
            match overrides.get(x.kind()) {
                Some(f) => f(x, y),
                None => equal_composite(a, b, overrides),
            }
        }
        _ if a.is_composite() && b.is_composite() => equal_composite(a, b, overrides),
        _ => false,
    }
}

fn equal_composite(a: &Value, b: &Value, overrides: &EqualityOverrides) -> bool {
    if a.key_count() != b.key_count() {
        return false;
    }
    a.entries().into_iter().all(|(key, v)| {
        b.get(key).is_some_and(|w| equal_with(v, w, overrides))
    })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equal(self, other)
    }
}

/// Canonical text form.
///
/// Integers are decimal, booleans `true`/`false`, strings double-quoted with
/// escapes, lists `[a, b]`, records and maps `{k=v, k2=v2}` with keys in
/// lexicographic byte order.
#[must_use]
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) -> fmt::Result {
    match value {
        Value::Scalar(Scalar::Bool(b)) => write!(out, "{}", b),
        Value::Scalar(Scalar::Int(i)) => write!(out, "{}", i),
        Value::Scalar(Scalar::Str(s)) => write_quoted(out, s),
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item)?;
            }
            out.push(']');
            Ok(())
        }
        Value::Record(_) | Value::Map(_) => {
            out.push('{');
            for (i, (key, item)) in value.entries().into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if is_ident(key) {
                    out.push_str(key);
                } else {
                    write_quoted(out, key)?;
                }
                out.push('=');
                write_value(out, item)?;
            }
            out.push('}');
            Ok(())
        }
    }
}

fn write_quoted(out: &mut String, s: &str) -> fmt::Result {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => write!(out, "\\u{{{:04x}}}", c as u32)?,
            c => out.push(c),
        }
    }
    out.push('"');
    Ok(())
}

/// Whether a key can be rendered bare
pub(crate) fn is_ident(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Self::Scalar(Scalar::Int(i)) => serializer.serialize_i64(*i),
            Self::Scalar(Scalar::Str(s)) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Record(_) | Self::Map(_) => {
                let entries = self.entries();
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries {
                    map.serialize_entry(key, item)?;
                }
                map.end()
            }
        }
    }
}

/// Conversion into a structural value
pub trait ToValue {
    /// Build the value
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for Record {
    fn to_value(&self) -> Value {
        Value::Record(self.clone())
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::bool(*self)
    }
}

macro_rules! impl_to_value_int {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value {
                    Value::int(i64::from(*self))
                }
            }
        )*
    };
}

impl_to_value_int!(u8, u16, u32, i8, i16, i32, i64);

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::str(self)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::str(self.as_str())
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}
