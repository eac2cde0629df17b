//! FlowField Gateway binary. Loads config once, probes the local backend, then serves.

use flowfield_core::{create_stt, Dispatcher, GatewayConfig};
use flowfield_gateway::{build_router, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::load()?;
    tracing::info!(
        target: "flowfield::gateway",
        "FlowField gateway v{} (local model '{}' at {}, cloud {})",
        flowfield_core::version(),
        config.ollama_model,
        config.ollama_host,
        config.openai_base_url
    );

    let dispatcher = Dispatcher::from_config(&config).await;
    let stt = create_stt(&config);
    let state = Arc::new(AppState { dispatcher, stt });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(target: "flowfield::gateway", "Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
