use clap::Parser; // for cli
use metadata_gateway::{config::Args, create_app, fetcher::HttpFetcher, state::AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // parse cli arguments
    let args = Args::parse();

    let fetcher = Arc::new(HttpFetcher::new(&args)?);
    let state = Arc::new(AppState::new(&args, fetcher));
    let app = create_app(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metadata gateway running on http://{}", addr);
    info!("Cache TTL: {} seconds", args.cache_ttl);
    info!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit, args.rate_window
    );
    info!("Fetch timeout: {} seconds, user agent {:?}", args.fetch_timeout, args.user_agent);

    // peer address feeds the rate limiter's client key
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
