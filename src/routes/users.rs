//! User CRUD routes.
//! `/users/allUsers` and `/users/stats` are static segments and take precedence over `/users/:id`.

use crate::handlers::users::{all, create, delete as delete_handler, list, read, stats, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/users", get(list).post(create))
        .route("/users/allUsers", get(all))
        .route("/users/stats", get(stats))
        .route("/users/:id", get(read).put(update).delete(delete_handler))
        .with_state(state)
}
