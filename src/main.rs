use anyhow::Result;
use std::env;
use template_lookup::{server, AppConfig};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = AppConfig::from_env()?;
    info!(
        key_candidates = ?config.lookup.key.candidates,
        boundary = %config.lookup.grouping.section_boundary,
        sub_boundary = ?config.lookup.grouping.sub_boundary,
        "lookup config"
    );

    // ─── 3) serve ────────────────────────────────────────────────────
    server::serve(config).await
}
