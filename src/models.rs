use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters accepted by list endpoints behind [`query_params_middleware`].
///
/// Only documents the parameters for OpenAPI; parsing happens in the middleware.
///
/// # Filtering
/// Each `filter` value is `<column>_<mode>=<value>`. Modes: `exact` (default),
/// `ci`/`ilike`, `start`/`prefix`, `end`/`suffix`, `anywhere`/`contains`.
/// ```text
/// ?filter=habit_code_anywhere=gym&filter=name_eq=Focus
/// ```
///
/// # Pagination
/// `limit` is a count or `all`. `offset` wins over `page` when both are given.
///
/// # Sorting
/// `-column`, `+column` or `column:asc|desc`.
///
/// [`query_params_middleware`]: crate::query::query_params_middleware
#[derive(Debug, Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Repeatable filter condition.
    #[param(example = json!(["habit_code_anywhere=gym", "name_eq=Focus"]))]
    pub filter: Option<Vec<String>>,
    /// Sort column with direction.
    #[param(example = "-completed_at")]
    pub sort: Option<String>,
    /// Page size, or `all`.
    #[param(example = "15")]
    pub limit: Option<String>,
    /// Rows to skip.
    #[param(example = 30)]
    pub offset: Option<u64>,
    /// 1-based page number, used with `limit`.
    #[param(example = 3)]
    pub page: Option<u64>,
}
