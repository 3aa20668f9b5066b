//! Server configuration: types, environment loading, validation.

pub mod loader;
pub mod types;
pub mod validator;

pub use types::*;
pub use validator::*;
