//! Records and field values

use std::borrow::Cow;

/// A single field value.
///
/// `H` is the host's presentation handle. The grid carries `Rendered` values
/// around but never looks inside them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<H = ()> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Rendered(H),
}

impl<H> Value<H> {
    /// Numeric view of the value, if it is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, Value::Rendered(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Textual form used for searching, sorting and plain display.
    /// Null and rendered values have no text.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Value::Null | Value::Rendered(_) => Cow::Borrowed(""),
            Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Value::Int(n) => Cow::Owned(n.to_string()),
            Value::Float(n) => Cow::Owned(n.to_string()),
            Value::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl<H> From<&str> for Value<H> {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl<H> From<String> for Value<H> {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<H> From<i64> for Value<H> {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl<H> From<i32> for Value<H> {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl<H> From<u64> for Value<H> {
    fn from(n: u64) -> Self {
        i64::try_from(n).map(Value::Int).unwrap_or(Value::Float(n as f64))
    }
}

impl<H> From<f64> for Value<H> {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl<H> From<bool> for Value<H> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<H, T: Into<Value<H>>> From<Option<T>> for Value<H> {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One grid row: an ordered mapping from field name to value.
///
/// Field order is insertion order and is what column inference follows.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<H = ()> {
    fields: Vec<(String, Value<H>)>,
}

impl<H> Default for Record<H> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<H> Record<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Record::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value<H>>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field, replacing an existing value in place so field order is kept
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value<H>>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value<H>> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value<H>> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value<H>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The conventional `id` field, when it holds an integer
    pub fn id(&self) -> Option<i64> {
        match self.get("id") {
            Some(Value::Int(n)) => Some(*n),
            _ => None,
        }
    }
}

impl<H, K: Into<String>, V: Into<Value<H>>> FromIterator<(K, V)> for Record<H> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}
