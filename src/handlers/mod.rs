//! HTTP handlers for the users API.

pub mod users;
pub use users::*;
