use axum::{extract::FromRef, Router};
use common::{
    storage::session::create_session_store,
    utils::{config::get_config, llm::OpenAICompletionProvider},
};
use html_router::{html_routes, html_state::HtmlState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let config = get_config()?;

    let session_store = Arc::new(create_session_store(&config).await?);
    let provider = Arc::new(OpenAICompletionProvider::from_config(&config));
    info!(
        processing_model = %config.processing_model,
        query_model = %config.query_model,
        timeout_secs = config.completion_timeout_secs,
        "Completion provider configured"
    );

    let html_state =
        HtmlState::new_with_resources(provider, session_store, config.clone(), None);

    let app = Router::new()
        .merge(html_routes(&html_state))
        .with_state(AppState { html_state });

    let serve_address = format!("0.0.0.0:{}", config.http_port);
    info!("Starting server listening on {}", serve_address);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Clone, FromRef)]
struct AppState {
    html_state: HtmlState,
}
