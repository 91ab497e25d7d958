use crate::query::Pagination;
use axum::http::header::{CONTENT_RANGE, HeaderMap, HeaderValue};
use serde::Serialize;

/// One page of a list endpoint: the rows plus the unpaginated row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(data: Vec<T>, total: u64) -> Self {
        Self { data, total }
    }

    /// Number of rows on this page.
    #[must_use]
    pub fn returned(&self) -> u64 {
        u64::try_from(self.data.len()).unwrap_or(u64::MAX)
    }
}

/// Keep printable ASCII so the name is always a valid header value.
fn sanitize_resource_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()).collect()
}

/// Build the `Content-Range` header for a page of results.
///
/// # Arguments
///
/// * `resource_name` - Resource label; non-ASCII and control characters are removed.
/// * `pagination` - The pagination the page was queried with.
/// * `returned` - How many rows the page actually holds.
/// * `total_count` - Rows available without pagination.
///
/// # Returns
///
/// `<resource> <first>-<last>/<total>`, or `<resource> */<total>` for an empty page.
#[must_use]
pub fn content_range(
    resource_name: &str,
    pagination: &Pagination,
    returned: u64,
    total_count: u64,
) -> HeaderMap {
    let resource = sanitize_resource_name(resource_name);

    let range = if returned == 0 {
        format!("{resource} */{total_count}")
    } else {
        let first = pagination.offset;
        let last = first.saturating_add(returned - 1);
        format!("{resource} {first}-{last}/{total_count}")
    };

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&range) {
        Ok(value) => {
            headers.insert(CONTENT_RANGE, value);
        }
        Err(err) => tracing::warn!(error = %err, range, "skipping invalid Content-Range header"),
    }
    headers
}
