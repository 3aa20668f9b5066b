//! User CRUD handlers: list, all, stats, read, create, update, delete.

use crate::error::AppError;
use crate::query::ListQuery;
use crate::response::{AllUsers, Message};
use crate::service::UserService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Ids in paths must be positive integers; anything else is rejected before the store is consulted.
fn parse_id(id_str: &str) -> Result<i64, AppError> {
    match id_str.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::BadRequest(format!("invalid id '{}'", id_str))),
    }
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = ListQuery::from_params(&params, state.max_per_page)?;
    let page = UserService::list(state.store.as_ref(), &query).await?;
    Ok(Json(page))
}

pub async fn all(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = UserService::all(state.store.as_ref()).await?;
    Ok(Json(AllUsers { users }))
}

pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(UserService::stats(state.store.as_ref()).await?))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    Ok(Json(UserService::read(state.store.as_ref(), id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    let user = UserService::create(state.store.as_ref(), &body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let body = body_to_map(body)?;
    Ok(Json(UserService::update(state.store.as_ref(), id, &body).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    UserService::delete(state.store.as_ref(), id).await?;
    Ok(Json(Message::new("User deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0")]
    #[case("-3")]
    #[case("abc")]
    #[case("1.5")]
    #[case("")]
    fn rejects_non_positive_ids(#[case] raw: &str) {
        assert!(matches!(parse_id(raw), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn accepts_positive_ids() {
        assert_eq!(parse_id("42").unwrap(), 42);
    }
}
