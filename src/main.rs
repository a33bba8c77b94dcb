use std::sync::Arc;

use salvo::logging::Logger;
use salvo::prelude::{Listener, Server, Service, TcpListener};
use tracing_subscriber::EnvFilter;

use tcbuilds::aggregator::Aggregator;
use tcbuilds::cache::{CacheCoordinator, Pipeline};
use tcbuilds::config::Config;
use tcbuilds::handlers;
use tcbuilds::teamcity::TeamCityClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (development only)
    #[cfg(debug_assertions)]
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let default_filter = format!(
        "info,tcbuilds={}",
        if cfg!(debug_assertions) {
            "debug"
        } else {
            "info"
        }
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let client = Arc::new(TeamCityClient::from_config(&config)?);
    let aggregator = Aggregator::new(client, config.branch.clone())
        .with_project(config.project.clone())
        .with_concurrency(config.fetch_concurrency);
    let pipeline = Pipeline::new(aggregator, config.base(), config.title.clone());

    let (coordinator, queue) = CacheCoordinator::new(config.cache_lifetime());
    tokio::spawn(coordinator.clone().run_refresh_loop(queue, pipeline));
    // First tick fires immediately and produces the initial snapshot.
    coordinator.spawn_refresh_timer(config.cache_lifetime());

    let service = Service::new(handlers::router(coordinator)).hoop(Logger::new());

    tracing::info!(
        base = config.base(),
        branch = %config.branch,
        project = config.project.as_deref().unwrap_or("<all>"),
        authenticated = config.auth.is_some(),
        "Serving latest builds on http://{}",
        config.listen
    );

    let acceptor = TcpListener::new(&config.listen).bind().await;
    Server::new(acceptor).serve(service).await;
    Ok(())
}
