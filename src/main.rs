//! Language router demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http server ─▶ language middleware ─▶ echo handler
//!                                      │
//!                                      ▼
//!                          LanguageRoutes (Arc, immutable)
//!                          ├── LanguageTable
//!                          └── RuleEngine ◀── augmented rules ◀── rule cache
//! ```
//!
//! Usage: `lang-router [config.toml]`. Without a file the defaults are used, which
//! only makes sense together with `LANG_ROUTER_LANGUAGES=en,ru,...`.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use lang_router::config::{load_config, validate_config, RouterConfig};
use lang_router::http::{build_app, server};
use lang_router::language::RawLanguages;
use lang_router::observability::init_logging;
use lang_router::routing::LanguageRoutes;
use lang_router::rules::open_store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => load_config(&path)?,
        None => {
            let mut config = RouterConfig::default();
            if let Ok(codes) = std::env::var("LANG_ROUTER_LANGUAGES") {
                config.languages = RawLanguages::codes(codes.split(',').map(str::trim));
            }
            validate_config(&config).map_err(|errors| {
                errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
            })?;
            config
        }
    };

    init_logging(&config.observability.log_level)?;
    tracing::info!("lang-router v{} starting", env!("CARGO_PKG_VERSION"));

    let routes = Arc::new(LanguageRoutes::build(&config, open_store(&config.cache))?);

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        languages = routes.table().len(),
        "Listening for connections"
    );

    server::run(listener, build_app(routes)).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
