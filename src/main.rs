use filing_api_rest::{AppState, router};
use filing_core::constants::DEFAULT_REST_ADDR;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the filing development backend
///
/// Serves the in-memory REST API with seeded accounts (`admin`/`admin123`, `user`/`user123`)
/// and two templates. State is lost on restart.
///
/// # Environment Variables
/// - `FILING_REST_ADDR`: REST server address (default: "0.0.0.0:8822")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("filing=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("FILING_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    tracing::info!("++ Starting filing REST on {}", rest_addr);

    let app = router(AppState::seeded());
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("-- Shutting down filing REST");
        })
        .await?;

    Ok(())
}
