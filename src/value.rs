//! Typed attribute values attached to log records.
//!
//! A [`Value`] is one of a closed set of kinds. Scalars carry their native
//! representation, [`Value::Group`] nests further attributes and
//! [`Value::LogValuer`] defers computing the value until a handler needs it.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::document::{DocValue, DocumentValue};

/// Upper bound on chained [`LogValuer`] resolutions, so that a valuer that
/// keeps returning valuers cannot hang the caller.
const MAX_LOG_VALUES: usize = 100;

/// A value whose concrete form is computed on demand.
pub trait LogValuer: Send + Sync {
    fn log_value(&self) -> Value;
}

impl<F> LogValuer for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn log_value(&self) -> Value {
        self()
    }
}

/// Opaque payload of an `Any` value. The default is the nil payload.
#[derive(Clone, Default)]
pub struct AnyValue(Option<Arc<dyn DocumentValue>>);

impl AnyValue {
    pub fn new<T: DocumentValue + 'static>(value: T) -> Self {
        AnyValue(Some(Arc::new(value)))
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_none()
    }

    /// Document form of the payload; nil becomes [`DocValue::Null`].
    pub fn to_doc_value(&self) -> DocValue {
        match &self.0 {
            Some(v) => v.to_doc_value(),
            None => DocValue::Null,
        }
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(v) => fmt::Debug::fmt(&**v, f),
            None => f.write_str("nil"),
        }
    }
}

/// Attribute value. The variant is the value's kind.
#[derive(Clone)]
pub enum Value {
    Any(AnyValue),
    Bool(bool),
    Duration(Duration),
    Float64(f64),
    Int64(i64),
    String(String),
    Time(DateTime<Utc>),
    Uint64(u64),
    Group(Vec<Attr>),
    LogValuer(Arc<dyn LogValuer>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Any(AnyValue::default())
    }
}

impl Value {
    pub fn any<T: Serialize + fmt::Debug + Send + Sync + 'static>(value: T) -> Self {
        Value::Any(AnyValue::new(value))
    }

    pub fn group(attrs: impl IntoIterator<Item = Attr>) -> Self {
        Value::Group(attrs.into_iter().collect())
    }

    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Value::LogValuer(Arc::new(f))
    }

    /// `true` for the nil `Any` value, the value of a zero [`Attr`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Any(v) if v.is_nil())
    }

    /// Follow [`LogValuer`]s until a concrete value is reached.
    ///
    /// Each valuer in the chain is invoked exactly once. A chain longer than
    /// [`MAX_LOG_VALUES`] resolves to an `Any` carrying an error message.
    pub fn resolve(self) -> Value {
        let mut value = self;
        for _ in 0..MAX_LOG_VALUES {
            match value {
                Value::LogValuer(valuer) => value = valuer.log_value(),
                resolved => return resolved,
            }
        }
        Value::any("LogValue called too many times on a LogValuer")
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Any(v) => f.debug_tuple("Any").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            Value::Float64(v) => f.debug_tuple("Float64").field(v).finish(),
            Value::Int64(v) => f.debug_tuple("Int64").field(v).finish(),
            Value::String(v) => f.debug_tuple("String").field(v).finish(),
            Value::Time(v) => f.debug_tuple("Time").field(v).finish(),
            Value::Uint64(v) => f.debug_tuple("Uint64").field(v).finish(),
            Value::Group(v) => f.debug_tuple("Group").field(v).finish(),
            Value::LogValuer(_) => f.write_str("LogValuer(..)"),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v.into())
            }
        })*
    };
}

impl_from! {
    bool => Bool,
    Duration => Duration,
    f64 => Float64,
    i64 => Int64,
    i32 => Int64,
    String => String,
    &str => String,
    DateTime<Utc> => Time,
    u64 => Uint64,
    u32 => Uint64,
    Vec<Attr> => Group,
}

/// A key/value pair attached to a record.
///
/// The zero attribute (empty key, nil value) is ignored by handlers. A group
/// with an empty key is inlined into its parent.
#[derive(Debug, Clone, Default)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Attr {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn any<T: Serialize + fmt::Debug + Send + Sync + 'static>(
        key: impl Into<String>,
        value: T,
    ) -> Self {
        Attr::new(key, Value::any(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Attr::new(key, value)
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Attr::new(key, value)
    }

    pub fn float64(key: impl Into<String>, value: f64) -> Self {
        Attr::new(key, value)
    }

    pub fn int64(key: impl Into<String>, value: i64) -> Self {
        Attr::new(key, value)
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Attr::new(key, Value::String(value.into()))
    }

    pub fn time(key: impl Into<String>, value: DateTime<Utc>) -> Self {
        Attr::new(key, value)
    }

    pub fn uint64(key: impl Into<String>, value: u64) -> Self {
        Attr::new(key, value)
    }

    pub fn group(key: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) -> Self {
        Attr::new(key, Value::group(attrs))
    }

    pub fn lazy<F>(key: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Attr::new(key, Value::lazy(f))
    }

    /// `true` for the zero attribute, which contributes nothing to output.
    pub fn is_zero(&self) -> bool {
        self.key.is_empty() && self.value.is_nil()
    }
}
