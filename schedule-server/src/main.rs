use std::env;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schedule_server::cache::{Config, RenderCache};
use schedule_server::cli;
use schedule_server::routes::{router, AppState};
use schedule_server::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::parse(env::args().skip(1).collect());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schedule_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = Store::load(&args.data_file, args.meta_file.clone())
        .with_context(|| format!("loading schedule data from {}", args.data_file.display()))?;
    info!(
        events = store.event_count(),
        data_file = %args.data_file.display(),
        "loaded schedule data"
    );

    let cache = RenderCache::new(Config {
        enabled: args.enable_cache,
        ttl: args.cache_ttl,
    });

    let app = router(AppState {
        store: Arc::new(store),
        cache,
    });

    let listener = TcpListener::bind(args.address).await?;
    info!("listening at http://{}", args.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
