use serde::Serialize;
use std::fmt;

/// How a filter value is compared against a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum MatchMode {
    /// Equality (`=`)
    #[default]
    Exact,
    /// Case-insensitive match of the literal value (`ILIKE value`)
    CaseInsensitive,
    /// Substring match (`ILIKE %value%`)
    Anywhere,
    /// Prefix match (`ILIKE value%`)
    Start,
    /// Suffix match (`ILIKE %value`)
    End,
}

impl MatchMode {
    /// Resolve a textual alias such as `eq`, `ilike`, `prefix` or `contains`.
    ///
    /// Matching ignores case and surrounding whitespace. Anything unknown,
    /// including the empty string, resolves to [`MatchMode::Exact`].
    #[must_use]
    pub fn from_alias(alias: &str) -> Self {
        match alias.trim().to_lowercase().as_str() {
            "ci" | "caseinsensitive" | "case_insensitive" | "ilike" => Self::CaseInsensitive,
            "start" | "prefix" | "starts_with" => Self::Start,
            "end" | "suffix" | "ends_with" => Self::End,
            "any" | "anywhere" | "contains" => Self::Anywhere,
            _ => Self::Exact,
        }
    }

    /// Wrap `value` in the `%` wildcards this mode needs.
    ///
    /// Returns `None` for [`MatchMode::Exact`], which compares by equality.
    #[must_use]
    pub fn pattern(self, value: &str) -> Option<String> {
        match self {
            Self::Exact => None,
            Self::CaseInsensitive => Some(value.to_string()),
            Self::Start => Some(format!("{value}%")),
            Self::End => Some(format!("%{value}")),
            Self::Anywhere => Some(format!("%{value}%")),
        }
    }
}

impl From<&str> for MatchMode {
    fn from(alias: &str) -> Self {
        Self::from_alias(alias)
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exact => "Exact",
            Self::CaseInsensitive => "CaseInsensitive",
            Self::Anywhere => "Anywhere",
            Self::Start => "Start",
            Self::End => "End",
        };
        f.write_str(name)
    }
}
