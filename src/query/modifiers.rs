//! Projection of [`QueryParams`] onto a composable SQL query.
//!
//! [`apply_query_params`] always applies pagination, then ordering, then filters,
//! so generated clauses come out in the same sequence whichever parts are set.
//! Each call appends clauses: applying the same parameters twice adds them twice.

use super::params::{Filter, Limit, Pagination, QueryParams, Sort, SortDirection};
use crate::context::UserId;
use sea_orm::{
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    sea_query::{Alias, Expr, SelectStatement, SimpleExpr, extension::postgres::PgExpr},
};

/// Column compared by [`scope_to_user`].
pub const USER_ID_COLUMN: &str = "user_id";

/// The query-builder operations the applier needs.
///
/// Every method consumes and returns the query so calls chain like the
/// sea-orm builders themselves.
pub trait QueryModifier: Sized {
    /// `LIMIT n`, or no limit for [`Limit::All`].
    #[must_use]
    fn set_limit(self, limit: Limit) -> Self;

    #[must_use]
    fn set_offset(self, offset: u64) -> Self;

    #[must_use]
    fn add_order_by(self, column: &str, direction: SortDirection) -> Self;

    /// `column = value`, ANDed with existing predicates.
    #[must_use]
    fn add_where_equals(self, column: &str, value: &str) -> Self;

    /// `column ILIKE pattern`, ANDed with existing predicates.
    #[must_use]
    fn add_where_ilike(self, column: &str, pattern: &str) -> Self;
}

fn equals(column: &str, value: &str) -> SimpleExpr {
    Expr::col(Alias::new(column)).eq(value)
}

fn ilike(column: &str, pattern: &str) -> SimpleExpr {
    Expr::col(Alias::new(column)).ilike(pattern)
}

impl<E: EntityTrait> QueryModifier for Select<E> {
    fn set_limit(self, limit: Limit) -> Self {
        QuerySelect::limit(self, limit.count())
    }

    fn set_offset(self, offset: u64) -> Self {
        QuerySelect::offset(self, offset)
    }

    fn add_order_by(self, column: &str, direction: SortDirection) -> Self {
        QueryOrder::order_by(self, SimpleExpr::from(Expr::col(Alias::new(column))), direction.into())
    }

    fn add_where_equals(self, column: &str, value: &str) -> Self {
        QueryFilter::filter(self, equals(column, value))
    }

    fn add_where_ilike(self, column: &str, pattern: &str) -> Self {
        QueryFilter::filter(self, ilike(column, pattern))
    }
}

impl QueryModifier for SelectStatement {
    fn set_limit(mut self, limit: Limit) -> Self {
        match limit {
            Limit::Count(n) => {
                self.limit(n);
            }
            Limit::All => {
                self.reset_limit();
            }
        }
        self
    }

    fn set_offset(mut self, offset: u64) -> Self {
        self.offset(offset);
        self
    }

    fn add_order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.order_by(Alias::new(column), direction.into());
        self
    }

    fn add_where_equals(mut self, column: &str, value: &str) -> Self {
        self.and_where(equals(column, value));
        self
    }

    fn add_where_ilike(mut self, column: &str, pattern: &str) -> Self {
        self.and_where(ilike(column, pattern));
        self
    }
}

/// Apply limit and offset. Always emits both, defaults included.
pub fn paginate<Q: QueryModifier>(query: Q, pagination: &Pagination) -> Q {
    query
        .set_limit(pagination.limit)
        .set_offset(pagination.offset)
}

pub fn order<Q: QueryModifier>(query: Q, sort: Option<&Sort>) -> Q {
    match sort {
        Some(sort) => query.add_order_by(&sort.column, sort.direction),
        None => query,
    }
}

/// Add one predicate per condition, in order.
pub fn apply_filter<Q: QueryModifier>(query: Q, filter: &Filter) -> Q {
    filter
        .conditions
        .iter()
        .fold(query, |query, condition| match condition.mode.pattern(&condition.value) {
            None => query.add_where_equals(&condition.column, &condition.value),
            Some(pattern) => query.add_where_ilike(&condition.column, &pattern),
        })
}

/// Apply pagination, ordering and filters, in that order.
///
/// `None` returns the query untouched.
pub fn apply_query_params<Q: QueryModifier>(query: Q, params: Option<&QueryParams>) -> Q {
    let Some(params) = params else {
        return query;
    };
    let query = paginate(query, &params.pagination);
    let query = order(query, params.sort.as_ref());
    apply_filter(query, &params.filter)
}

/// Restrict the query to rows owned by `user`.
pub fn scope_to_user<Q: QueryModifier>(query: Q, user: &UserId) -> Q {
    scope_to_column(query, USER_ID_COLUMN, user.as_str())
}

pub fn scope_to_column<Q: QueryModifier>(query: Q, column: &str, value: &str) -> Q {
    query.add_where_equals(column, value)
}
