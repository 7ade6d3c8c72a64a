//! Cashtag trends service — binary entrypoint.
//! Boots the Axum HTTP server with the live-fetch, snapshot and aggregation routes.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cashtag_trends::metrics::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cashtag_trends=info,warn"));

    // Shuttle may already own the global subscriber; that's fine.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let app = cashtag_trends::app()?;
    let router = match Metrics::init() {
        Ok(m) => app.merge(m.router()),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            app
        }
    };

    Ok(router.into())
}
