use anyhow::{Context, Result};
use round_engine::{Country, CountrySource, JsonFileSource};
use std::path::PathBuf;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod games;
mod routes;

use config::GatewayConfig;
use games::{AppState, GameLimits};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "country_guess_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;

    // One-shot load; without a dataset no game can start
    let countries = match load_dataset(config.data_path.clone()).await {
        Ok(countries) => countries,
        Err(e) => {
            tracing::error!("Initialization failed: {:#}", e);
            return Err(e);
        }
    };
    tracing::info!("   Loaded {} countries", countries.len());

    let limits = GameLimits::from_config(&config);
    tracing::info!(
        "   Games expire after {}s idle, at most {} kept",
        config.game_ttl_secs,
        limits.max_games
    );
    let state = AppState::new(countries).with_limits(limits);
    let _sweeper = state.spawn_sweeper();

    let api_routes = routes::api_router(state);

    let app = if config.ui_dir.exists() {
        tracing::info!("   Serving UI from {}", config.ui_dir.display());
        api_routes.fallback_service(ServeDir::new(&config.ui_dir))
    } else {
        tracing::warn!("   UI directory {} not found - API only", config.ui_dir.display());
        api_routes
    };

    let addr = config.bind_addr();
    tracing::info!("Country Guess gateway starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Read the dataset off the async runtime
async fn load_dataset(path: PathBuf) -> Result<Vec<Country>> {
    let source = JsonFileSource::new(path);
    let origin = source.describe();

    let countries = tokio::task::spawn_blocking(move || source.load_countries())
        .await?
        .with_context(|| format!("Could not load country data from {}", origin))?;

    Ok(countries)
}
