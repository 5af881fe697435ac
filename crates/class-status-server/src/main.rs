//! `class-status-server`: serve the class-status HTTP API.
//!
//! ```sh
//! CLASS_STATUS_SEED=seed.json CLASS_STATUS_PORT=8080 RUST_LOG=info class-status-server
//! ```

use class_status_server::{config::Config, start_server};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    start_server(config).await
}
