//! Shared query builder for the timeline source tables.
//!
//! Every timeline table is read the same way: optional entity scope,
//! inclusive date bounds, a strict `(date, unified id)` keyset bound,
//! optional search pushdown, newest first, limited. The per-table
//! differences (columns, date expression, id prefix, searchable text) are
//! described by a [`TimelineTable`].

use sqlx::PgPool;
use steward_core::types::{DbId, Timestamp};

/// Row-level query for one timeline table.
#[derive(Debug, Clone, Default)]
pub struct TimelineRowQuery {
    /// `(column, id)` the rows must reference, e.g. `("client_id", 5)`.
    pub scope: Option<(&'static str, DbId)>,
    pub date_from: Option<Timestamp>,
    pub date_to: Option<Timestamp>,
    /// Only rows strictly older than `(timestamp, unified id)`.
    pub before: Option<(Timestamp, String)>,
    /// Case-insensitive substring, applied to the table's searchable text.
    pub search: Option<String>,
    pub limit: i64,
}

/// Static description of how a table maps onto the timeline.
pub(crate) struct TimelineTable {
    /// `SELECT ... FROM table alias LEFT JOIN ...` without WHERE.
    pub select: &'static str,
    pub alias: &'static str,
    /// Expression giving the row's position on the timeline.
    pub date_expr: &'static str,
    /// Prefix of the unified id, e.g. `"activity-"`.
    pub id_prefix: &'static str,
    /// Expressions matching the mapped title/description. Empty disables
    /// pushdown; callers then filter in memory.
    pub search_exprs: &'static [&'static str],
}

/// Typed bind value for dynamically-built timeline queries.
#[derive(Debug, Clone)]
enum BindValue {
    BigInt(i64),
    Text(String),
    Timestamp(Timestamp),
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the SQL text and bind values for `query` against `table`.
///
/// The LIMIT placeholder is the last bind index; the caller binds it.
fn build_timeline_sql(table: &TimelineTable, query: &TimelineRowQuery) -> (String, Vec<BindValue>) {
    let alias = table.alias;
    let date = table.date_expr;
    let unified_id = format!("('{}' || {alias}.id::text) COLLATE \"C\"", table.id_prefix);

    let mut conditions: Vec<String> = Vec::new();
    let mut bind_values: Vec<BindValue> = Vec::new();
    let mut bind_idx = 1u32;

    if let Some((column, id)) = query.scope {
        conditions.push(format!("{alias}.{column} = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(id));
    }

    if let Some(from) = query.date_from {
        conditions.push(format!("{date} >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = query.date_to {
        conditions.push(format!("{date} <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(to));
    }

    if let Some((ts, ref id)) = query.before {
        conditions.push(format!(
            "({date} < ${ts_idx} OR ({date} = ${ts_idx} AND {unified_id} < ${id_idx}))",
            ts_idx = bind_idx,
            id_idx = bind_idx + 1,
        ));
        bind_idx += 2;
        bind_values.push(BindValue::Timestamp(ts));
        bind_values.push(BindValue::Text(id.clone()));
    }

    if let Some(ref term) = query.search {
        if !table.search_exprs.is_empty() {
            let clauses: Vec<String> = table
                .search_exprs
                .iter()
                .map(|expr| format!("{expr} ILIKE ${bind_idx}"))
                .collect();
            conditions.push(format!("({})", clauses.join(" OR ")));
            bind_idx += 1;
            bind_values.push(BindValue::Text(format!("%{}%", escape_like(term))));
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "{select} {where_clause} ORDER BY {date} DESC, {unified_id} DESC LIMIT ${bind_idx}",
        select = table.select,
    );

    (sql, bind_values)
}

/// Run a timeline query and decode the rows.
pub(crate) async fn fetch_timeline_rows<O>(
    pool: &PgPool,
    table: &TimelineTable,
    query: &TimelineRowQuery,
) -> Result<Vec<O>, sqlx::Error>
where
    O: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    let (sql, bind_values) = build_timeline_sql(table, query);

    let mut q = sqlx::query_as::<_, O>(&sql);
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(v),
            BindValue::Text(v) => q = q.bind(v),
            BindValue::Timestamp(v) => q = q.bind(v),
        }
    }
    q.bind(query.limit).fetch_all(pool).await
}

/// Read one row of a timeline table with the same joins as the timeline.
pub(crate) async fn fetch_timeline_row<O>(
    pool: &PgPool,
    table: &TimelineTable,
    id: DbId,
) -> Result<Option<O>, sqlx::Error>
where
    O: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    let sql = format!("{} WHERE {}.id = $1", table.select, table.alias);
    sqlx::query_as::<_, O>(&sql).bind(id).fetch_optional(pool).await
}
