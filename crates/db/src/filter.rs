//! Dynamic WHERE-clause construction shared by every index query.
//!
//! Conditions are pushed with their bind values; placeholders are numbered
//! in push order so the same builder renders both the `COUNT(*)` and the
//! page query.

use serde::Serialize;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, PgPool, Postgres};

use erasmus_core::listing::{ListOptions, Page, TrashedFilter};
use erasmus_core::types::{Date, DbId, Timestamp};

/// A typed bind parameter for dynamic queries.
#[derive(Debug, Clone)]
pub enum BindValue {
    BigInt(i64),
    Text(String),
    Bool(bool),
    Timestamp(Timestamp),
    Date(Date),
}

impl From<DbId> for BindValue {
    fn from(v: DbId) -> Self {
        BindValue::BigInt(v)
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        BindValue::Text(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        BindValue::Text(v.to_string())
    }
}

impl From<bool> for BindValue {
    fn from(v: bool) -> Self {
        BindValue::Bool(v)
    }
}

impl From<Timestamp> for BindValue {
    fn from(v: Timestamp) -> Self {
        BindValue::Timestamp(v)
    }
}

impl From<Date> for BindValue {
    fn from(v: Date) -> Self {
        BindValue::Date(v)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    conditions: Vec<String>,
    values: Vec<BindValue>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number the next placeholder will take.
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }

    pub fn values(&self) -> &[BindValue] {
        &self.values
    }

    /// Add a condition built from the placeholder of a single bind value.
    pub fn push(&mut self, value: impl Into<BindValue>, condition: impl FnOnce(&str) -> String) {
        let placeholder = format!("${}", self.next_index());
        self.conditions.push(condition(&placeholder));
        self.values.push(value.into());
    }

    /// Add a condition without bind values.
    pub fn raw(&mut self, condition: impl Into<String>) {
        self.conditions.push(condition.into());
    }

    pub fn eq(&mut self, column: &str, value: impl Into<BindValue>) {
        self.push(value, |p| format!("{column} = {p}"));
    }

    pub fn eq_opt<V: Into<BindValue>>(&mut self, column: &str, value: Option<V>) {
        if let Some(v) = value {
            self.eq(column, v);
        }
    }

    pub fn gte_opt<V: Into<BindValue>>(&mut self, column: &str, value: Option<V>) {
        if let Some(v) = value {
            self.push(v, |p| format!("{column} >= {p}"));
        }
    }

    pub fn lte_opt<V: Into<BindValue>>(&mut self, column: &str, value: Option<V>) {
        if let Some(v) = value {
            self.push(v, |p| format!("{column} <= {p}"));
        }
    }

    /// Case-insensitive match of one pattern against any of `columns`.
    pub fn search(&mut self, columns: &[&str], pattern: Option<String>) {
        if let Some(pattern) = pattern {
            self.push(pattern, |p| {
                let parts: Vec<String> = columns.iter().map(|c| format!("{c} ILIKE {p}")).collect();
                format!("({})", parts.join(" OR "))
            });
        }
    }

    pub fn trashed(&mut self, filter: TrashedFilter, column: &str) {
        if let Some(condition) = filter.sql_condition(column) {
            self.raw(condition);
        }
    }

    /// `WHERE ...` or an empty string.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
pub fn bind_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments> {
    for val in values {
        q = match val {
            BindValue::BigInt(v) => q.bind(*v),
            BindValue::Text(v) => q.bind(v.as_str()),
            BindValue::Bool(v) => q.bind(*v),
            BindValue::Timestamp(v) => q.bind(*v),
            BindValue::Date(v) => q.bind(*v),
        };
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
pub fn bind_values_scalar<'q, O>(
    mut q: sqlx::query::QueryScalar<'q, Postgres, O, PgArguments>,
    values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, Postgres, O, PgArguments> {
    for val in values {
        q = match val {
            BindValue::BigInt(v) => q.bind(*v),
            BindValue::Text(v) => q.bind(v.as_str()),
            BindValue::Bool(v) => q.bind(*v),
            BindValue::Timestamp(v) => q.bind(*v),
            BindValue::Date(v) => q.bind(*v),
        };
    }
    q
}

/// Count and fetch one page of `select` over `from` (which must alias the
/// main table so filter columns resolve).
pub async fn fetch_page<T>(
    pool: &PgPool,
    select: &str,
    from: &str,
    filter: &FilterBuilder,
    order_by: &str,
    options: &ListOptions,
) -> Result<Page<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + Serialize,
{
    let where_clause = filter.where_clause();

    let count_sql = format!("SELECT COUNT(*)::BIGINT FROM {from} {where_clause}");
    let total = bind_values_scalar(sqlx::query_scalar::<_, i64>(&count_sql), filter.values())
        .fetch_one(pool)
        .await?;

    let idx = filter.next_index();
    let sql = format!(
        "SELECT {select} FROM {from} {where_clause} ORDER BY {order_by} LIMIT ${idx} OFFSET ${}",
        idx + 1
    );
    let rows = bind_values(sqlx::query_as::<_, T>(&sql), filter.values())
        .bind(options.per_page)
        .bind(options.offset())
        .fetch_all(pool)
        .await?;

    Ok(Page::new(rows, total, options))
}

/// Fetch every row matching `filter`, for exports.
pub async fn fetch_all<T>(
    pool: &PgPool,
    select: &str,
    from: &str,
    filter: &FilterBuilder,
    order_by: &str,
) -> Result<Vec<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!(
        "SELECT {select} FROM {from} {} ORDER BY {order_by}",
        filter.where_clause()
    );
    bind_values(sqlx::query_as::<_, T>(&sql), filter.values())
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_has_no_where() {
        assert_eq!(FilterBuilder::new().where_clause(), "");
        assert_eq!(FilterBuilder::new().next_index(), 1);
    }

    #[test]
    fn placeholders_follow_push_order() {
        let mut f = FilterBuilder::new();
        f.eq("c.program_id", 3_i64);
        f.trashed(TrashedFilter::Without, "c.deleted_at");
        f.search(&["c.title", "c.requirements"], Some("%x%".to_string()));
        assert_eq!(
            f.where_clause(),
            "WHERE c.program_id = $1 AND c.deleted_at IS NULL AND (c.title ILIKE $2 OR c.requirements ILIKE $2)"
        );
        assert_eq!(f.next_index(), 3);
        assert_eq!(f.values().len(), 2);
    }

    #[test]
    fn optional_filters_skip_none() {
        let mut f = FilterBuilder::new();
        f.eq_opt::<String>("status", None);
        f.gte_opt::<Timestamp>("created_at", None);
        f.search(&["title"], None);
        assert_eq!(f.where_clause(), "");
    }
}
