//! Conversion of log records and their attribute trees into [`Document`]s.

use crate::document::{DocValue, Document};
use crate::record::Record;
use crate::value::{Attr, Value};

/// Key of the record time entry.
pub const TIME_KEY: &str = "time";
/// Key of the record level entry.
pub const LEVEL_KEY: &str = "level";
/// Key of the record message entry.
pub const MESSAGE_KEY: &str = "msg";

/// Fixed leading entries of a record document: `time` (only for a non-zero
/// timestamp), then `level` and `msg`.
pub fn record_header(record: &Record) -> Document {
    let mut doc = Document::new();
    if let Some(time) = record.time {
        doc.push(TIME_KEY, time);
    }
    doc.push(LEVEL_KEY, record.level.to_string());
    doc.push(MESSAGE_KEY, record.message.as_str());
    doc
}

/// Full document for `record`: the header followed by its attributes.
pub fn record_document(record: &Record) -> Document {
    append_attrs(record_header(record), record.attrs())
}

/// Fold `attrs` into `doc` in order and return it.
///
/// Groups with an empty key are spliced into `doc`; named groups become a
/// nested document, which is only appended when it ended up with at least
/// one entry. Lazy values are resolved once and dispatched again under the
/// original key.
pub fn append_attrs(mut doc: Document, attrs: &[Attr]) -> Document {
    for attr in attrs {
        if attr.is_zero() {
            continue;
        }
        let key = attr.key.as_str();
        match &attr.value {
            Value::Any(v) => doc.push(key, v.to_doc_value()),
            Value::Bool(v) => doc.push(key, *v),
            Value::Duration(v) => doc.push(key, *v),
            Value::Float64(v) => doc.push(key, *v),
            Value::Int64(v) => doc.push(key, *v),
            Value::String(v) => doc.push(key, v.as_str()),
            Value::Time(v) => doc.push(key, *v),
            Value::Uint64(v) => doc.push(key, *v),
            Value::Group(children) => {
                if children.is_empty() {
                    continue;
                }
                if key.is_empty() {
                    doc = append_attrs(doc, children);
                } else {
                    let group = append_attrs(Document::new(), children);
                    if !group.is_empty() {
                        doc.push(key, DocValue::Document(group));
                    }
                }
            }
            Value::LogValuer(_) => {
                let resolved = Attr {
                    key: attr.key.clone(),
                    value: attr.value.clone().resolve(),
                };
                doc = append_attrs(doc, std::slice::from_ref(&resolved));
            }
        }
    }
    doc
}
