use std::fmt;
use std::str::FromStr;

/// Importance of a log record.
///
/// Levels are plain integers so that applications can define their own in
/// between the named ones. Higher means more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(pub i32);

impl Level {
    pub const DEBUG: Level = Level(-4);
    pub const INFO: Level = Level(0);
    pub const WARN: Level = Level(4);
    pub const ERROR: Level = Level(8);

    /// Named levels, most severe first.
    const NAMED: [(Level, &'static str); 4] = [
        (Level::ERROR, "ERROR"),
        (Level::WARN, "WARN"),
        (Level::INFO, "INFO"),
        (Level::DEBUG, "DEBUG"),
    ];
}

impl fmt::Display for Level {
    /// Renders the nearest named level at or below `self`, followed by the
    /// offset from it when there is one, e.g. `INFO`, `WARN+2`, `DEBUG-4`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (base, name) = Self::NAMED
            .iter()
            .copied()
            .find(|(base, _)| self.0 >= base.0)
            .unwrap_or((Level::DEBUG, "DEBUG"));

        let offset = self.0 - base.0;
        if offset == 0 {
            f.write_str(name)
        } else {
            write!(f, "{}{:+}", name, offset)
        }
    }
}

/// Error returned when parsing a [`Level`] from text.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid level {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Parses the same syntax [`Display`](fmt::Display) produces, ignoring
    /// case: `info`, `WARN`, `error+2`, `Debug-1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseLevelError(s.to_string());

        let (name, offset) = match s.find(&['+', '-'][..]) {
            Some(i) => {
                let offset: i32 = s[i..].parse().map_err(|_| err())?;
                (&s[..i], offset)
            }
            None => (s, 0),
        };

        let base = Self::NAMED
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(base, _)| *base)
            .ok_or_else(err)?;

        base.0.checked_add(offset).map(Level).ok_or_else(err)
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level(Level::DEBUG.0 - 4),
            tracing::Level::DEBUG => Level::DEBUG,
            tracing::Level::INFO => Level::INFO,
            tracing::Level::WARN => Level::WARN,
            _ => Level::ERROR,
        }
    }
}
