//! UserService: validated user operations over a store.

pub mod stats;
mod users;
mod validation;
pub use stats::{aggregate, UserStats};
pub use users::UserService;
pub use validation::RequestValidator;
