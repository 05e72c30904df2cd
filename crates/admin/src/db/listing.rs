//! Paginated, searchable list queries.
//!
//! Every resource list runs two statements: a page of rows and a count of all
//! matching rows. Both are built by [`PagedQuery`] from the same rendered
//! predicate and the same bind values, so `total` always counts exactly the
//! filtered set the page was cut from.
//!
//! The two statements run concurrently without snapshot isolation; a write
//! landing between them can skew `total` by a row.

use backoffice_core::{OrderStatus, PaymentStatus};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::RepositoryError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

// =============================================================================
// Parameters
// =============================================================================

/// Raw `?search=&page=&limit=` query string.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Normalized list parameters: `page >= 1`, `1 <= limit <= MAX_LIMIT`, and a
/// trimmed, non-empty search term or none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    search: Option<String>,
    page: i64,
    limit: i64,
}

impl ListParams {
    #[must_use]
    pub fn new(search: Option<&str>, page: Option<i64>, limit: Option<i64>) -> Self {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        Self {
            search,
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    #[must_use]
    pub const fn page(&self) -> i64 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.limit
    }

    /// Rows skipped before this page.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `%term%` with LIKE metacharacters escaped, so the match is a literal substring.
    fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|term| {
            let mut pattern = String::with_capacity(term.len() + 2);
            pattern.push('%');
            for c in term.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

impl From<ListQuery> for ListParams {
    fn from(query: ListQuery) -> Self {
        Self::new(query.search.as_deref(), query.page, query.limit)
    }
}

// =============================================================================
// Result Envelope
// =============================================================================

/// One page of a list plus the metadata needed to render pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            limit: params.limit,
            total_pages: total_pages(total, params.limit),
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }

    /// Convert each item, failing on the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Paginated<U>, E> {
        Ok(Paginated {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        })
    }
}

/// `ceil(total / limit)`, zero for an empty result.
#[must_use]
pub const fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

// =============================================================================
// Query Construction
// =============================================================================

/// Static shape of a resource's list query.
#[derive(Debug, Clone, Copy)]
pub struct ListSpec {
    /// Projection for the data query.
    pub columns: &'static str,
    /// `FROM` clause including joins; shared by data and count queries.
    pub from: &'static str,
    /// Text columns matched case-insensitively by the search term.
    pub search_columns: &'static [&'static str],
    /// `ORDER BY` expression (without the keywords).
    pub order_by: &'static str,
}

/// A typed value for an equality filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterValue {
    OrderStatus(OrderStatus),
    PaymentStatus(PaymentStatus),
}

impl From<OrderStatus> for FilterValue {
    fn from(value: OrderStatus) -> Self {
        Self::OrderStatus(value)
    }
}

impl From<PaymentStatus> for FilterValue {
    fn from(value: PaymentStatus) -> Self {
        Self::PaymentStatus(value)
    }
}

#[derive(Debug, Clone, Copy)]
struct Filter {
    column: &'static str,
    value: FilterValue,
}

/// Paired data/count query for one list request.
#[derive(Debug, Clone)]
pub struct PagedQuery<'a> {
    spec: &'a ListSpec,
    params: &'a ListParams,
    filters: Vec<Filter>,
}

impl<'a> PagedQuery<'a> {
    #[must_use]
    pub const fn new(spec: &'a ListSpec, params: &'a ListParams) -> Self {
        Self {
            spec,
            params,
            filters: Vec::new(),
        }
    }

    /// Add `column = value`, or nothing when `value` is `None`.
    #[must_use]
    pub fn filter(mut self, column: &'static str, value: Option<impl Into<FilterValue>>) -> Self {
        if let Some(value) = value {
            self.filters.push(Filter {
                column,
                value: value.into(),
            });
        }
        self
    }

    /// Push ` WHERE ...` for the search term and filters, if there are any.
    ///
    /// This is the single source of the predicate for both statements.
    fn push_predicate(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        let pattern = self
            .params
            .search_pattern()
            .filter(|_| !self.spec.search_columns.is_empty());

        if pattern.is_none() && self.filters.is_empty() {
            return;
        }

        qb.push(" WHERE ");
        let mut first = true;

        if let Some(pattern) = pattern {
            qb.push("(");
            for (i, column) in self.spec.search_columns.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
            }
            qb.push(")");
            first = false;
        }

        for filter in &self.filters {
            if !first {
                qb.push(" AND ");
            }
            first = false;
            qb.push(filter.column).push(" = ");
            match filter.value {
                FilterValue::OrderStatus(v) => qb.push_bind(v),
                FilterValue::PaymentStatus(v) => qb.push_bind(v),
            };
        }
    }

    /// `SELECT <columns> FROM ... [WHERE ...] ORDER BY ... LIMIT $n OFFSET $m`
    #[must_use]
    pub fn data_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM {}",
            self.spec.columns, self.spec.from
        ));
        self.push_predicate(&mut qb);
        qb.push(" ORDER BY ")
            .push(self.spec.order_by)
            .push(" LIMIT ")
            .push_bind(self.params.limit)
            .push(" OFFSET ")
            .push_bind(self.params.offset());
        qb
    }

    /// `SELECT COUNT(*) FROM ... [WHERE ...]`
    #[must_use]
    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.spec.from));
        self.push_predicate(&mut qb);
        qb
    }

    /// Run both statements and assemble the page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn fetch<T>(&self, pool: &PgPool) -> Result<Paginated<T>, RepositoryError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut data = self.data_query();
        let mut count = self.count_query();

        let (items, total) = tokio::try_join!(
            data.build_query_as::<T>().fetch_all(pool),
            count.build_query_scalar::<i64>().fetch_one(pool),
        )?;

        Ok(Paginated::new(items, total, self.params))
    }
}
