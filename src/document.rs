//! Ordered document representation handed to a [`DocumentStore`].
//!
//! A [`Document`] is a sequence of key/value [`Entry`]s. Keys are not
//! deduplicated and insertion order is preserved, so the stored document
//! mirrors the attribute order of the log record it was built from.
//!
//! [`DocumentStore`]: crate::store::DocumentStore

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// One key/value pair of a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: DocValue,
}

/// Ordered sequence of entries. Duplicate keys are allowed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    entries: Vec<Entry>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the end of the document.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<DocValue>) {
        self.entries.push(Entry {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// First value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&DocValue> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }
}

impl IntoIterator for Document {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<DocValue>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (key, value) in iter {
            doc.push(key, value);
        }
        doc
    }
}

/// Value stored in a [`Document`] entry.
///
/// Durations and timestamps keep their own variants so that stores with a
/// native representation for them (BSON, OpenSearch dates) can use it.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    Null,
    Bool(bool),
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    String(String),
    Duration(Duration),
    DateTime(DateTime<Utc>),
    Array(Vec<DocValue>),
    Document(Document),
}

impl DocValue {
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            DocValue::Document(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocValue::String(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for DocValue {
            fn from(v: $ty) -> Self {
                DocValue::$variant(v.into())
            }
        })*
    };
}

impl_from! {
    bool => Bool,
    i64 => Int64,
    u64 => UInt64,
    f64 => Float64,
    String => String,
    &str => String,
    Duration => Duration,
    DateTime<Utc> => DateTime,
    Vec<DocValue> => Array,
    Document => Document,
}

impl From<serde_json::Value> for DocValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => DocValue::Null,
            Json::Bool(b) => DocValue::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DocValue::Int64(i)
                } else if let Some(u) = n.as_u64() {
                    DocValue::UInt64(u)
                } else {
                    DocValue::Float64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => DocValue::String(s),
            Json::Array(items) => DocValue::Array(items.into_iter().map(DocValue::from).collect()),
            Json::Object(map) => DocValue::Document(map.into_iter().collect()),
        }
    }
}

/// Capability of an opaque value to render itself as a [`DocValue`].
///
/// This is what `Any` attribute values must implement. Every
/// `Serialize` type gets it for free through its JSON form.
pub trait DocumentValue: fmt::Debug + Send + Sync {
    fn to_doc_value(&self) -> DocValue;
}

impl<T> DocumentValue for T
where
    T: Serialize + fmt::Debug + Send + Sync,
{
    fn to_doc_value(&self) -> DocValue {
        match serde_json::to_value(self) {
            Ok(json) => DocValue::from(json),
            Err(e) => DocValue::String(format!("!ERROR:{}", e)),
        }
    }
}

/// Durations serialize as signed nanoseconds, saturating outside the `i64`
/// range.
fn duration_nanos(d: &Duration) -> i64 {
    d.num_nanoseconds().unwrap_or(if *d < Duration::zero() {
        i64::MIN
    } else {
        i64::MAX
    })
}

impl Serialize for DocValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DocValue::Null => serializer.serialize_unit(),
            DocValue::Bool(b) => serializer.serialize_bool(*b),
            DocValue::Int64(i) => serializer.serialize_i64(*i),
            DocValue::UInt64(u) => serializer.serialize_u64(*u),
            DocValue::Float64(f) => serializer.serialize_f64(*f),
            DocValue::String(s) => serializer.serialize_str(s),
            DocValue::Duration(d) => serializer.serialize_i64(duration_nanos(d)),
            DocValue::DateTime(t) => {
                serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            DocValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DocValue::Document(doc) => doc.serialize(serializer),
        }
    }
}

impl Serialize for Document {
    /// Serializes as a map in entry order. Duplicate keys are emitted as-is.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_entries_in_insertion_order() {
        let mut inner = Document::new();
        inner.push("z", 1i64);
        inner.push("a", "x");

        let mut doc = Document::new();
        doc.push("level", "INFO");
        doc.push("group", inner);
        doc.push("level", "again");

        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            json,
            r#"{"level":"INFO","group":{"z":1,"a":"x"},"level":"again"}"#
        );
    }

    #[test]
    fn serializes_durations_as_nanoseconds_and_times_as_rfc3339() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let mut doc = Document::new();
        doc.push("elapsed", Duration::milliseconds(1500));
        doc.push("at", t);

        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            json,
            r#"{"elapsed":1500000000,"at":"2024-05-01T12:30:00Z"}"#
        );
    }

    #[derive(Debug, Serialize)]
    struct Payload {
        id: u32,
        tags: Vec<&'static str>,
    }

    #[test]
    fn serializable_values_convert_through_json() {
        let value = Payload {
            id: 7,
            tags: vec!["a", "b"],
        }
        .to_doc_value();

        let doc = value.as_document().unwrap();
        assert_eq!(doc.get("id"), Some(&DocValue::Int64(7)));
        assert_eq!(
            doc.get("tags"),
            Some(&DocValue::Array(vec!["a".into(), "b".into()]))
        );
    }

    #[derive(Debug, Serialize)]
    struct Reading {
        zeta: i64,
        alpha: i64,
        mid: Inner,
    }

    #[derive(Debug, Serialize)]
    struct Inner {
        y: bool,
        b: bool,
    }

    #[test]
    fn serializable_values_keep_field_declaration_order() {
        let value = Reading {
            zeta: 1,
            alpha: 2,
            mid: Inner { y: true, b: false },
        }
        .to_doc_value();

        let doc = value.as_document().unwrap();
        assert_eq!(doc.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
        let mid = doc.get("mid").and_then(DocValue::as_document).unwrap();
        assert_eq!(mid.keys().collect::<Vec<_>>(), ["y", "b"]);
        assert_eq!(
            serde_json::to_string(&Document::from_iter([("r", value)])).unwrap(),
            r#"{"r":{"zeta":1,"alpha":2,"mid":{"y":true,"b":false}}}"#
        );
    }
}
