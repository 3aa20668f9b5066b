//! Replace every stored user with the contents of a JSON file shaped `{"users": [...]}`.
//!
//! Usage: `user-admin-import [path]` (default `db.json`). Requires `DATABASE_URL`.

use user_admin::store::connect_postgres;
use user_admin::{logging, ServerConfig, UserService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    logging::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "db.json".into());
    let config = ServerConfig::from_env()?;
    let url = config
        .database_url
        .ok_or("DATABASE_URL must be set to import users")?;

    let raw = tokio::fs::read_to_string(&path).await?;
    let document: serde_json::Value = serde_json::from_str(&raw)?;
    let store = connect_postgres(&url, config.db_max_connections).await?;
    let count = UserService::import(&store, &document).await?;
    tracing::info!(count, path = %path, "import finished");
    Ok(())
}
