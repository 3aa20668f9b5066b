//! Persistence port for user records and the id sequence counter.

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::{ensure_database_exists, ensure_tables, PgUserStore};

use crate::error::AppError;
use crate::model::{User, UserDraft};
use crate::query::{ListQuery, UserFilter};
use async_trait::async_trait;

/// Counter name under which user ids are sequenced.
pub const USER_ID_COUNTER: &str = "user_id";

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Number of users matching the filter.
    async fn count(&self, filter: &UserFilter) -> Result<u64, AppError>;

    /// One page of matching users in the query's sort order.
    async fn find_page(&self, query: &ListQuery) -> Result<Vec<User>, AppError>;

    /// Every user, ordered by id.
    async fn find_all(&self) -> Result<Vec<User>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Takes the next counter value as id and stores the user, as one atomic step.
    async fn insert(&self, draft: &UserDraft) -> Result<User, AppError>;

    /// Replaces every mutable field. `None` if no user has this id.
    async fn replace(&self, id: i64, draft: &UserDraft) -> Result<Option<User>, AppError>;

    /// `false` if no user has this id.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Drops all users, stores `users` with their own ids, and raises the counter to at
    /// least the largest imported id. Returns the number stored.
    async fn import(&self, users: &[User]) -> Result<u64, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

/// Open the PostgreSQL store (creating the database and tables if needed) with a bounded pool.
pub async fn connect_postgres(database_url: &str, max_connections: u32) -> Result<PgUserStore, AppError> {
    ensure_database_exists(database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    ensure_tables(&pool).await?;
    Ok(PgUserStore::new(pool))
}
