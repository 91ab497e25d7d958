//! # Pagination, Sorting & Filtering
//!
//! Turns loosely structured query strings into a validated [`QueryParams`] and
//! projects it onto a sea-orm / sea-query select.
//!
//! ```rust,ignore
//! // GET /habits?filter=habit_code_anywhere=gym&filter=name_eq=Focus&sort=-completed_at&limit=15&page=3
//! let app = Router::new()
//!     .route("/habits", get(list_habits))
//!     .layer(middleware::from_fn(query_params_middleware));
//!
//! async fn list_habits(ListParams(params): ListParams, State(db): State<DatabaseConnection>) {
//!     // WHERE "habit_code" ILIKE '%gym%' AND "name" = 'Focus'
//!     // ORDER BY "completed_at" DESC LIMIT 15 OFFSET 30
//!     let habits = apply_query_params(habit::Entity::find(), params.as_ref())
//!         .all(&db)
//!         .await?;
//! }
//! ```
//!
//! Filter keys are `<column>_<mode>`; see [`MatchMode::from_alias`] for the
//! accepted modes. Malformed input is dropped piece by piece and never rejects
//! the request.

pub mod match_mode;
pub mod middleware;
pub mod modifiers;
pub mod params;
pub mod parser;
pub mod values;

pub use match_mode::MatchMode;
pub use middleware::{ListParams, query_params, query_params_middleware};
pub use modifiers::{
    QueryModifier, USER_ID_COLUMN, apply_filter, apply_query_params, order, paginate,
    scope_to_column, scope_to_user,
};
pub use params::{Filter, FilterCondition, Limit, Pagination, QueryParams, Sort, SortDirection};
pub use parser::{parse_filter_condition, parse_limit, parse_query_params, parse_sort};
pub use values::QueryValues;
