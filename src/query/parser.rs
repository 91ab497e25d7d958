//! Query-string to [`QueryParams`] translation.
//!
//! Recognized keys:
//!
//! | key      | form                                   | example                      |
//! |----------|----------------------------------------|------------------------------|
//! | `filter` | `<column>[_<mode>]=<value>`, repeatable | `filter=habit_code_any=gym`  |
//! | `sort`   | `[-+]<column>[:asc\|desc]`             | `sort=-completed_at`         |
//! | `limit`  | non-negative integer or `all`          | `limit=15`                   |
//! | `offset` | non-negative integer                   | `offset=30`                  |
//! | `page`   | positive integer, needs numeric limit  | `page=3`                     |
//!
//! Malformed pieces are dropped silently; parsing never fails.

use super::match_mode::MatchMode;
use super::params::{Filter, FilterCondition, Limit, Pagination, QueryParams, Sort, SortDirection};
use super::values::QueryValues;

/// Parse the recognized keys of `values` into [`QueryParams`].
///
/// Returns `None` when no recognized key produced a usable value, including
/// when `values` is empty or only carries unrelated keys.
#[must_use]
pub fn parse_query_params(values: &QueryValues) -> Option<QueryParams> {
    if values.is_empty() {
        return None;
    }

    let mut params = QueryParams {
        pagination: Pagination {
            limit: Limit::All,
            offset: 0,
        },
        ..Default::default()
    };
    let mut has_params = false;

    let conditions: Vec<FilterCondition> = values
        .all("filter")
        .iter()
        .filter_map(|raw| parse_filter_condition(raw))
        .collect();
    if !conditions.is_empty() {
        params.filter = Filter { conditions };
        has_params = true;
    }

    if let Some(sort) = parse_sort(values.first("sort")) {
        params.sort = Some(sort);
        has_params = true;
    }

    if let Some(limit) = parse_limit(values.first("limit")) {
        params.pagination.limit = limit;
        has_params = true;
    }

    if let Some(offset) = parse_non_negative(values.first("offset")) {
        params.pagination.offset = offset;
        has_params = true;
    } else if let (Some(page), Limit::Count(limit)) =
        (parse_non_negative(values.first("page")), params.pagination.limit)
    {
        if page > 0 {
            params.pagination.offset = (page - 1).saturating_mul(limit);
            has_params = true;
        }
    }

    if has_params {
        tracing::debug!(params = %params, "parsed query parameters");
        Some(params)
    } else {
        None
    }
}

/// Parse one `filter` value of the form `<column>[_<mode>]=<value>`.
///
/// Only the first `=` separates key from value, and only the last `_` separates
/// column from mode, so `habit_code_anywhere=a=b` yields column `habit_code`,
/// mode [`MatchMode::Anywhere`] and value `a=b`.
#[must_use]
pub fn parse_filter_condition(raw: &str) -> Option<FilterCondition> {
    let (key, value) = raw.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let (column, mode) = match key.rsplit_once('_') {
        Some((column, mode)) => (column.trim(), MatchMode::from_alias(mode)),
        None => (key, MatchMode::Exact),
    };
    if column.is_empty() {
        return None;
    }

    Some(FilterCondition {
        column: column.to_string(),
        mode,
        value: value.trim().to_string(),
    })
}

/// Parse a `sort` value: `-col` sorts descending, `+col` or `col` ascending,
/// and an explicit `:asc`/`:desc` suffix overrides the sign.
#[must_use]
pub fn parse_sort(raw: &str) -> Option<Sort> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (raw, mut direction) = if let Some(rest) = raw.strip_prefix('-') {
        (rest, SortDirection::Desc)
    } else {
        (raw.strip_prefix('+').unwrap_or(raw), SortDirection::Asc)
    };

    let (column, explicit) = match raw.split_once(':') {
        Some((column, explicit)) => (column, Some(explicit)),
        None => (raw, None),
    };
    let column = column.trim();
    if column.is_empty() {
        return None;
    }

    if let Some(explicit) = explicit.and_then(SortDirection::parse) {
        direction = explicit;
    }

    Some(Sort {
        column: column.to_string(),
        direction,
    })
}

/// Parse a `limit` value: `all` (any case) or a non-negative integer.
#[must_use]
pub fn parse_limit(raw: &str) -> Option<Limit> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("all") {
        return Some(Limit::All);
    }
    parse_non_negative(raw).map(Limit::Count)
}

fn parse_non_negative(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|value| u64::try_from(value).ok())
}
