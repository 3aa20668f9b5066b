//! tracing subscriber setup shared by the binaries.

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise info for this crate and HTTP request spans.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("user_admin=info,tower_http=info")),
        )
        .init();
}
