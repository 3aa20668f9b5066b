//! User administration backend: users CRUD over a pluggable store, plus a typed client.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod model;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use client::{ClientError, Filters, UsersClient};
pub use config::ServerConfig;
pub use error::{AppError, ConfigError};
pub use model::{Role, Status, User, UserDraft};
pub use query::ListQuery;
pub use response::{AllUsers, Message, UserPage};
pub use routes::{app, common_routes, user_routes};
pub use service::{aggregate, UserService, UserStats};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables, MemoryUserStore, PgUserStore, UserStore};
