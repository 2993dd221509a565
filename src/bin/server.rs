use std::{fs::OpenOptions, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use merchant_console::{AppConfig, AppState, build_router, graceful_shutdown};

/// The web server for merchant_console.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// How long the mock merchant API takes to answer, in milliseconds.
    #[arg(long, default_value_t = 500)]
    latency_ms: u64,

    /// The probability that a mock merchant API request fails, from 0 to 1.
    #[arg(long, default_value_t = 0.0)]
    failure_rate: f64,

    /// How often the transaction lists refresh, in milliseconds (at most one hour).
    #[arg(long, default_value_t = 5000, value_parser = clap::value_parser!(u64).range(1..=3_600_000))]
    refresh_ms: u64,

    /// The number of merchants per page.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    page_size: u64,

    /// Seeds the sample data and the failure injection.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

impl From<&Args> for AppConfig {
    fn from(args: &Args) -> Self {
        Self {
            latency: Duration::from_millis(args.latency_ms),
            failure_rate: args.failure_rate,
            refresh_interval: Duration::from_millis(args.refresh_ms),
            page_size: args.page_size,
            seed: args.seed,
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    setup_logging()?;

    let args = Args::parse();
    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let state = AppState::new(&AppConfig::from(&args));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state.clone()));

    #[cfg(debug_assertions)]
    let router = router
        .layer(axum::middleware::from_fn(merchant_console::logging_middleware))
        .layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    let result = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await;

    state.stop_feeds();
    tracing::info!("server stopped");

    result
}

fn setup_logging() -> std::io::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but the handlers
        // already log their errors.
        .on_failure(());

    router.layer(tracing_layer)
}
