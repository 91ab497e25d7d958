//! Structured query parameters produced by the parser.

use super::match_mode::MatchMode;
use sea_orm::Order;
use serde::{Serialize, Serializer};
use std::fmt;

/// Row limit: a count, or the `ALL` sentinel meaning "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    Count(u64),
    #[default]
    All,
}

impl Limit {
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Count(_))
    }

    /// The numeric limit, `None` for `ALL`.
    #[must_use]
    pub const fn count(self) -> Option<u64> {
        match self {
            Self::Count(n) => Some(n),
            Self::All => None,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::All => f.write_str("ALL"),
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count(n) => serializer.serialize_u64(*n),
            Self::All => serializer.serialize_str("ALL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Pagination {
    pub limit: Limit,
    pub offset: u64,
}

impl Pagination {
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parse `asc` or `desc`, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sort {
    pub column: String,
    pub direction: SortDirection,
}

/// A single `column <mode> value` predicate.
///
/// `column` is never empty: the parser drops entries that would produce one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCondition {
    pub column: String,
    pub mode: MatchMode,
    pub value: String,
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FilterCondition: [Column: {}, MatchMode: {}, Value: {}]",
            self.column, self.mode, self.value
        )
    }
}

/// Conjunctive filter conditions, in the order they appeared in the query string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Filter {
    pub conditions: Vec<FilterCondition>,
}

impl Filter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Pagination, sorting and filtering requested by a single request.
///
/// Built once per request by [`parse_query_params`](super::parser::parse_query_params)
/// and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct QueryParams {
    pub pagination: Pagination,
    pub filter: Filter,
    pub sort: Option<Sort>,
}

impl QueryParams {
    /// True when nothing differs from the defaults (`LIMIT ALL OFFSET 0`, no sort, no filter).
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.pagination.is_default() && self.filter.is_empty() && self.sort.is_none()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sort {
            Some(sort) => write!(
                f,
                "QueryParams: [Sort: column: {}, direction: {}]",
                sort.column, sort.direction
            )?,
            None => f.write_str("QueryParams: [Sort: none]")?,
        }
        f.write_str(", [Filter: conditions: [")?;
        for (i, condition) in self.filter.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{condition}")?;
        }
        write!(
            f,
            "]], [Page: offset: {}, limit: {}]",
            self.pagination.offset, self.pagination.limit
        )
    }
}
