//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for the users and counters tables.

use super::params::SqlParam;
use crate::model::UserDraft;
use crate::query::{ListQuery, SortField, SortOrder, UserFilter};

pub const USERS_TABLE: &str = "users";
pub const COUNTERS_TABLE: &str = "counters";

const USER_COLUMNS: [&str; 6] = ["id", "name", "email", "role", "status", "salary"];

/// Quote identifier for PostgreSQL (safe: only from constants).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn column_list() -> String {
    USER_COLUMNS.iter().map(|c| quoted(c)).collect::<Vec<_>>().join(", ")
}

/// Escape LIKE wildcards so the search term matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    fn push_param(&mut self, v: SqlParam) -> usize {
        self.params.push(v);
        self.params.len()
    }

    fn push_draft(&mut self, draft: &UserDraft) -> Vec<String> {
        [
            SqlParam::Text(draft.name.clone()),
            SqlParam::Text(draft.email.clone()),
            SqlParam::Text(draft.role.as_str().to_string()),
            SqlParam::Text(draft.status.as_str().to_string()),
            SqlParam::Float(draft.salary),
        ]
        .into_iter()
        .map(|p| format!("${}", self.push_param(p)))
        .collect()
    }
}

fn where_clause(q: &mut QueryBuf, filter: &UserFilter) -> String {
    let mut parts = Vec::new();
    if let Some(ref search) = filter.search {
        let n = q.push_param(SqlParam::Text(escape_like(search)));
        parts.push(format!("{} ILIKE '%' || ${} || '%' ESCAPE '\\'", quoted("name"), n));
    }
    if let Some(role) = filter.role {
        let n = q.push_param(SqlParam::Text(role.as_str().to_string()));
        parts.push(format!("{} = ${}", quoted("role"), n));
    }
    if let Some(status) = filter.status {
        let n = q.push_param(SqlParam::Text(status.as_str().to_string()));
        parts.push(format!("{} = ${}", quoted("status"), n));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// Text columns sort bytewise so the order does not depend on the database locale.
fn order_clause(query: &ListQuery) -> String {
    let id = quoted("id");
    let Some(field) = query.sort_by else {
        return format!(" ORDER BY {} ASC", id);
    };
    let dir = match query.sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    let col = match field {
        SortField::Id | SortField::Salary => quoted(field.column()),
        _ => format!("{} COLLATE \"C\"", quoted(field.column())),
    };
    if field == SortField::Id {
        format!(" ORDER BY {} {}", col, dir)
    } else {
        format!(" ORDER BY {} {}, {} ASC", col, dir, id)
    }
}

/// SELECT COUNT(*) AS total with the filter predicate.
pub fn select_count(filter: &UserFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, filter);
    q.sql = format!("SELECT COUNT(*) AS total FROM {}{}", quoted(USERS_TABLE), where_sql);
    q
}

/// SELECT one page: filter, ORDER BY sort field then id, LIMIT/OFFSET.
pub fn select_page(query: &ListQuery) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, &query.filter);
    let limit = q.push_param(SqlParam::Int(i64::from(query.per_page)));
    let offset = q.push_param(SqlParam::Int(i64::try_from(query.offset()).unwrap_or(i64::MAX)));
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT ${} OFFSET ${}",
        column_list(),
        quoted(USERS_TABLE),
        where_sql,
        order_clause(query),
        limit,
        offset
    );
    q
}

pub fn select_all() -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        column_list(),
        quoted(USERS_TABLE),
        quoted("id")
    );
    q
}

pub fn select_by_id(id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(SqlParam::Int(id));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}",
        column_list(),
        quoted(USERS_TABLE),
        quoted("id"),
        n
    );
    q
}

/// Atomically increments the named counter (creating it at 1) and returns the new value as `seq`.
pub fn next_sequence(counter: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(SqlParam::Text(counter.to_string()));
    let table = quoted(COUNTERS_TABLE);
    q.sql = format!(
        "INSERT INTO {table} (\"name\", \"seq\") VALUES (${n}, 1) \
         ON CONFLICT (\"name\") DO UPDATE SET \"seq\" = {table}.\"seq\" + 1 \
         RETURNING \"seq\""
    );
    q
}

/// Raises the named counter to at least `floor`; never lowers it.
pub fn raise_sequence(counter: &str, floor: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(SqlParam::Text(counter.to_string()));
    let m = q.push_param(SqlParam::Int(floor));
    let table = quoted(COUNTERS_TABLE);
    q.sql = format!(
        "INSERT INTO {table} (\"name\", \"seq\") VALUES (${n}, ${m}) \
         ON CONFLICT (\"name\") DO UPDATE SET \"seq\" = GREATEST({table}.\"seq\", EXCLUDED.\"seq\")"
    );
    q
}

/// INSERT with an explicit id, returning the stored row.
pub fn insert(id: i64, draft: &UserDraft) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut placeholders = vec![format!("${}", q.push_param(SqlParam::Int(id)))];
    placeholders.extend(q.push_draft(draft));
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(USERS_TABLE),
        column_list(),
        placeholders.join(", "),
        column_list()
    );
    q
}

/// UPDATE every mutable column by id, returning the stored row.
pub fn update(id: i64, draft: &UserDraft) -> QueryBuf {
    let mut q = QueryBuf::new();
    let placeholders = q.push_draft(draft);
    let sets: Vec<String> = USER_COLUMNS[1..]
        .iter()
        .zip(placeholders)
        .map(|(col, ph)| format!("{} = {}", quoted(col), ph))
        .collect();
    let n = q.push_param(SqlParam::Int(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        quoted(USERS_TABLE),
        sets.join(", "),
        quoted("id"),
        n,
        column_list()
    );
    q
}

pub fn delete(id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(SqlParam::Int(id));
    q.sql = format!("DELETE FROM {} WHERE {} = ${}", quoted(USERS_TABLE), quoted("id"), n);
    q
}

pub fn delete_all() -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("DELETE FROM {}", quoted(USERS_TABLE));
    q
}
