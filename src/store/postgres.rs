//! PostgreSQL-backed store and startup DDL.

use super::{UserStore, USER_ID_COUNTER};
use crate::error::AppError;
use crate::model::{Role, Status, User, UserDraft};
use crate::query::{ListQuery, UserFilter};
use crate::sql::{self, bind_all, QueryBuf, COUNTERS_TABLE, USERS_TABLE};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgRow};
use sqlx::{ConnectOptions, PgConnection, PgPool, Row};
use std::str::FromStr;

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        PgUserStore { pool }
    }

    async fn insert_with_id(tx: &mut PgConnection, id: i64, draft: &UserDraft) -> Result<User, AppError> {
        let q = sql::insert(id, draft);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        let row = bind_all(sqlx::query(&q.sql), &q.params).fetch_one(&mut *tx).await?;
        row_to_user(&row)
    }

    async fn fetch_users(&self, q: &QueryBuf) -> Result<Vec<User>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.params).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_user).collect()
    }

    async fn fetch_user(&self, q: &QueryBuf) -> Result<Option<User>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(sqlx::query(&q.sql), &q.params).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_user).transpose()
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn count(&self, filter: &UserFilter) -> Result<u64, AppError> {
        let q = sql::select_count(filter);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(sqlx::query(&q.sql), &q.params).fetch_one(&self.pool).await?;
        let total: i64 = row.try_get("total")?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn find_page(&self, query: &ListQuery) -> Result<Vec<User>, AppError> {
        self.fetch_users(&sql::select_page(query)).await
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        self.fetch_users(&sql::select_all()).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        self.fetch_user(&sql::select_by_id(id)).await
    }

    async fn insert(&self, draft: &UserDraft) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;
        let q = sql::next_sequence(USER_ID_COUNTER);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        let row = bind_all(sqlx::query(&q.sql), &q.params).fetch_one(&mut *tx).await?;
        let id: i64 = row.try_get("seq")?;
        let user = Self::insert_with_id(&mut *tx, id, draft).await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn replace(&self, id: i64, draft: &UserDraft) -> Result<Option<User>, AppError> {
        self.fetch_user(&sql::update(id, draft)).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let q = sql::delete(id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let result = bind_all(sqlx::query(&q.sql), &q.params).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn import(&self, users: &[User]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let q = sql::delete_all();
        sqlx::query(&q.sql).execute(&mut *tx).await?;
        for u in users {
            Self::insert_with_id(&mut *tx, u.id, &UserDraft::from(u.clone())).await?;
        }
        let max_id = users.iter().map(|u| u.id).max().unwrap_or(0);
        let q = sql::raise_sequence(USER_ID_COUNTER, max_id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        bind_all(sqlx::query(&q.sql), &q.params).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(users.len() as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

fn row_to_user(row: &PgRow) -> Result<User, AppError> {
    let role: String = row.try_get("role")?;
    let status: String = row.try_get("status")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role: Role::from_str(&role).map_err(|e| AppError::Internal(format!("stored role '{}'", e.0)))?,
        status: Status::from_str(&status)
            .map_err(|e| AppError::Internal(format!("stored status '{}'", e.0)))?,
        salary: row.try_get("salary")?,
    })
}

/// Create the users and counters tables if they do not exist.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    let users_ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{}" (
            id BIGINT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            role TEXT NOT NULL,
            status TEXT NOT NULL,
            salary DOUBLE PRECISION NOT NULL CHECK (salary >= 0)
        )
        "#,
        USERS_TABLE
    );
    sqlx::query(&users_ddl).execute(pool).await?;

    let counters_ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{}" (
            name TEXT PRIMARY KEY,
            seq BIGINT NOT NULL
        )
        "#,
        COUNTERS_TABLE
    );
    sqlx::query(&counters_ddl).execute(pool).await?;
    tracing::info!("users and counters tables ready");
    Ok(())
}

/// Connect to the server's `postgres` database and create the target database if missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin, db_name) = admin_options(database_url)?;
    let Some(db_name) = db_name else {
        return Ok(());
    };
    let mut conn: PgConnection = admin.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

/// Options for the maintenance `postgres` database on the same server, plus the target
/// database name when the URL names one other than `postgres`.
fn admin_options(database_url: &str) -> Result<(PgConnectOptions, Option<String>), AppError> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Internal(format!("invalid DATABASE_URL: {}", e)))?;
    let db_name = opts
        .get_database()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "postgres")
        .map(str::to_string);
    Ok((opts.database("postgres"), db_name))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
