//! Severity levels and threshold filtering

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity of a log line, also used as the logger's threshold
///
/// Ordered `Debug < Info < Warning < Error < All`. `All` is only meaningful
/// as a threshold: it lets every line through regardless of ordering.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    #[default]
    All,
}

impl Severity {
    /// Parse a configuration token
    ///
    /// Only the exact lowercase names are recognized. Anything else,
    /// including the empty string, means "log everything".
    pub fn parse(s: &str) -> Self {
        match s {
            "debug" => Severity::Debug,
            "info" => Severity::Info,
            "warning" => Severity::Warning,
            "error" => Severity::Error,
            _ => Severity::All,
        }
    }

    /// Get the configuration name for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::All => "all",
        }
    }

    /// Get the bracketed tag written into each line
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Debug => "[DEBUG]",
            Severity::Info => "[INFO]",
            Severity::Warning => "[WARNING]",
            Severity::Error => "[ERROR]",
            Severity::All => "[ALL]",
        }
    }

    /// Check whether a line of `incoming` severity passes this threshold
    pub fn permits(&self, incoming: Severity) -> bool {
        *self == Severity::All || *self <= incoming
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Severity::parse(s))
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        Severity::parse(&s)
    }
}

impl From<Severity> for String {
    fn from(level: Severity) -> Self {
        level.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMITTING: [Severity; 4] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
    ];

    #[test]
    fn test_parse_known_levels() {
        assert_eq!(Severity::parse("debug"), Severity::Debug);
        assert_eq!(Severity::parse("info"), Severity::Info);
        assert_eq!(Severity::parse("warning"), Severity::Warning);
        assert_eq!(Severity::parse("error"), Severity::Error);
    }

    #[test]
    fn test_parse_unknown_defaults_to_all() {
        assert_eq!(Severity::parse(""), Severity::All);
        assert_eq!(Severity::parse("bogus"), Severity::All);
        // Exact lowercase only
        assert_eq!(Severity::parse("DEBUG"), Severity::All);
        assert_eq!(Severity::parse(" info"), Severity::All);
        assert_eq!(Severity::parse("warn"), Severity::All);
        assert_eq!(Severity::default(), Severity::All);
    }

    #[test]
    fn test_from_str_never_fails() {
        let level: Severity = "nonsense".parse().unwrap();
        assert_eq!(level, Severity::All);
        let level: Severity = "error".parse().unwrap();
        assert_eq!(level, Severity::Error);
    }

    #[test]
    fn test_permits_matches_ordering() {
        for threshold in EMITTING {
            for incoming in EMITTING {
                assert_eq!(
                    threshold.permits(incoming),
                    threshold <= incoming,
                    "threshold {threshold} incoming {incoming}"
                );
            }
        }
    }

    #[test]
    fn test_all_permits_everything() {
        for incoming in EMITTING {
            assert!(Severity::All.permits(incoming));
        }
    }

    #[test]
    fn test_warning_threshold() {
        assert!(!Severity::Warning.permits(Severity::Debug));
        assert!(!Severity::Warning.permits(Severity::Info));
        assert!(Severity::Warning.permits(Severity::Warning));
        assert!(Severity::Warning.permits(Severity::Error));
    }

    #[test]
    fn test_tags() {
        assert_eq!(Severity::Debug.tag(), "[DEBUG]");
        assert_eq!(Severity::Info.tag(), "[INFO]");
        assert_eq!(Severity::Warning.tag(), "[WARNING]");
        assert_eq!(Severity::Error.tag(), "[ERROR]");
    }
}
