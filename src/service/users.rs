//! User operations on top of a [`UserStore`]: validation first, then one store call.

use super::stats::{aggregate, UserStats};
use super::validation::RequestValidator;
use crate::error::AppError;
use crate::model::User;
use crate::query::ListQuery;
use crate::response::UserPage;
use crate::store::UserStore;
use serde_json::{Map, Value};
use std::collections::HashSet;

pub struct UserService;

impl UserService {
    /// Count and page are read concurrently; both use the same predicate.
    pub async fn list(store: &dyn UserStore, query: &ListQuery) -> Result<UserPage, AppError> {
        let (total, users) = tokio::try_join!(store.count(&query.filter), store.find_page(query))?;
        Ok(UserPage {
            total,
            total_pages: query.total_pages(total),
            current_page: query.page,
            users,
        })
    }

    pub async fn all(store: &dyn UserStore) -> Result<Vec<User>, AppError> {
        store.find_all().await
    }

    pub async fn stats(store: &dyn UserStore) -> Result<UserStats, AppError> {
        Ok(aggregate(&store.find_all().await?))
    }

    pub async fn read(store: &dyn UserStore, id: i64) -> Result<User, AppError> {
        store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))
    }

    /// Any `id` in the body is ignored; the store assigns the next one.
    pub async fn create(store: &dyn UserStore, body: &Map<String, Value>) -> Result<User, AppError> {
        let draft = RequestValidator::validate_user(body)?;
        let user = store.insert(&draft).await?;
        tracing::info!(id = user.id, "user created");
        Ok(user)
    }

    /// Full replace of the mutable fields. The stored id always wins over the body's.
    pub async fn update(store: &dyn UserStore, id: i64, body: &Map<String, Value>) -> Result<User, AppError> {
        let draft = RequestValidator::validate_user(body)?;
        let user = store
            .replace(id, &draft)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;
        tracing::info!(id, "user updated");
        Ok(user)
    }

    pub async fn delete(store: &dyn UserStore, id: i64) -> Result<(), AppError> {
        if !store.delete(id).await? {
            return Err(AppError::NotFound(format!("user {}", id)));
        }
        tracing::info!(id, "user deleted");
        Ok(())
    }

    /// Replace the collection with the `users` array of `document`. Every entry must pass
    /// validation and carry a unique positive integer `id`; nothing is written otherwise.
    pub async fn import(store: &dyn UserStore, document: &Value) -> Result<u64, AppError> {
        let entries = document
            .get("users")
            .and_then(Value::as_array)
            .ok_or_else(|| AppError::BadRequest("document must have a \"users\" array".into()))?;
        let mut users = Vec::with_capacity(entries.len());
        let mut seen = HashSet::new();
        for (i, entry) in entries.iter().enumerate() {
            let body = entry
                .as_object()
                .ok_or_else(|| AppError::BadRequest(format!("users[{}] must be an object", i)))?;
            let id = parse_import_id(body.get("id"))
                .ok_or_else(|| AppError::BadRequest(format!("users[{}].id must be a positive integer", i)))?;
            if !seen.insert(id) {
                return Err(AppError::BadRequest(format!("users[{}].id {} is duplicated", i, id)));
            }
            let draft = RequestValidator::validate_user(body).map_err(|e| match e {
                AppError::Validation { field, message } => AppError::Validation {
                    field,
                    message: format!("users[{}]: {}", i, message),
                },
                other => other,
            })?;
            users.push(draft.into_user(id));
        }
        let stored = store.import(&users).await?;
        tracing::info!(count = stored, "users imported");
        Ok(stored)
    }
}

/// Exported documents sometimes carry ids as strings; both forms are accepted.
fn parse_import_id(v: Option<&Value>) -> Option<i64> {
    match v? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|id| *id > 0)
}
