//! Line formatting flags
//!
//! Parsed from a `|`-separated list such as `date|time|shortfile`.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Set of enabled display options for each log line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FormatFlags(u8);

/// Token names in bit order
const TOKENS: &[(&str, FormatFlags)] = &[
    ("date", FormatFlags::DATE),
    ("time", FormatFlags::TIME),
    ("microseconds", FormatFlags::MICROSECONDS),
    ("longfile", FormatFlags::LONG_FILE),
    ("shortfile", FormatFlags::SHORT_FILE),
    ("utc", FormatFlags::UTC),
];

impl FormatFlags {
    /// No flags set
    pub const EMPTY: FormatFlags = FormatFlags(0);
    /// Local date, `2026/01/21`
    pub const DATE: FormatFlags = FormatFlags(1 << 0);
    /// Local time, `14:30:45`
    pub const TIME: FormatFlags = FormatFlags(1 << 1);
    /// Microsecond resolution, implies a time field
    pub const MICROSECONDS: FormatFlags = FormatFlags(1 << 2);
    /// Full file path of the call site
    pub const LONG_FILE: FormatFlags = FormatFlags(1 << 3);
    /// Final path component only; overrides `LONG_FILE`
    pub const SHORT_FILE: FormatFlags = FormatFlags(1 << 4);
    /// Use UTC rather than the local time zone
    pub const UTC: FormatFlags = FormatFlags(1 << 5);
    /// `DATE | TIME`
    pub const STD_FLAGS: FormatFlags = FormatFlags(Self::DATE.0 | Self::TIME.0);

    /// Parse a `|`-separated token list
    ///
    /// Tokens are trimmed; unknown tokens are ignored.
    pub fn parse(s: &str) -> Self {
        s.split('|')
            .map(str::trim)
            .filter_map(Self::from_token)
            .fold(Self::EMPTY, |acc, flag| acc | flag)
    }

    fn from_token(token: &str) -> Option<Self> {
        if token == "stdflags" {
            return Some(Self::STD_FLAGS);
        }
        TOKENS
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, flag)| *flag)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Check whether every flag in `other` is set
    pub fn contains(&self, other: FormatFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any timestamp field is rendered
    pub fn has_timestamp(&self) -> bool {
        self.0 & (Self::DATE.0 | Self::TIME.0 | Self::MICROSECONDS.0) != 0
    }
}

impl BitOr for FormatFlags {
    type Output = FormatFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        FormatFlags(self.0 | rhs.0)
    }
}

impl fmt::Display for FormatFlags {
    /// Canonical token list, e.g. `date|time|shortfile`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = TOKENS
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect();
        f.write_str(&names.join("|"))
    }
}

impl From<String> for FormatFlags {
    fn from(s: String) -> Self {
        FormatFlags::parse(&s)
    }
}

impl From<FormatFlags> for String {
    fn from(flags: FormatFlags) -> Self {
        flags.to_string()
    }
}
