use chrono::{DateTime, Utc};

use crate::level::Level;
use crate::value::Attr;

/// A single log event as seen by a [`Handler`](crate::handler::Handler).
///
/// `time` is `None` for the zero time; handlers omit the time field then.
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub time: Option<DateTime<Utc>>,
    pub level: Level,
    pub message: String,
    attrs: Vec<Attr>,
}

impl Record {
    pub fn new(time: Option<DateTime<Utc>>, level: Level, message: impl Into<String>) -> Self {
        Record {
            time,
            level,
            message: message.into(),
            attrs: Vec::new(),
        }
    }

    /// Append attributes after the ones already on the record.
    pub fn add_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        self.attrs.extend(attrs);
    }

    /// Builder-style variant of [`Record::add_attrs`].
    pub fn with_attrs(mut self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        self.add_attrs(attrs);
        self
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attrs_are_appended_in_call_order() {
        let mut record = Record::new(None, Level::INFO, "m").with_attrs([Attr::int64("a", 1)]);
        record.add_attrs([Attr::int64("b", 2), Attr::int64("c", 3)]);

        let keys: Vec<&str> = record.attrs().iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(record.message, "m");
        assert!(record.time.is_none());
    }
}
