//! Eduverse server binary
//!
//! Configuration comes from the YAML file named by `EDUVERSE_CONFIG`
//! (defaults otherwise); `EDUVERSE_ADDR` overrides the bind address and
//! `RUST_LOG` the log filter.

use std::sync::Arc;

use anyhow::{Context, Result};
use eduverse::config::AppConfig;
use eduverse::seed::{SeedFile, Seeder};
use eduverse::server::{RestExposure, ServerBuilder, serve};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("eduverse=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::load_from_env()?;
    let addr = config.bind_addr()?;
    let seed_path = config.seed.clone();

    let host = ServerBuilder::new()
        .with_config(config)
        .with_event_bus(1024)
        .build_host()?;

    if let Some(path) = seed_path {
        let seed = SeedFile::from_yaml_file(&path)?;
        Seeder::new(&host.state)
            .apply(&seed)
            .await
            .with_context(|| format!("failed to apply seed {}", path.display()))?;
    }

    tracing::info!(
        entities = ?host.entity_types(),
        "eduverse v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let app = RestExposure::build_router(Arc::new(host))?;
    serve(app, addr).await
}
