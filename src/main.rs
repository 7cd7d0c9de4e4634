mod config;
mod guard;
mod identity;
mod llm;
mod model;
mod routes;
mod services;
mod state;
mod store;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env();

    let auth = identity::AuthFacade::from_config(&config.identity);
    let data = store::DataService::from_config(&config.store);
    tracing::info!(identity = %auth.mode(), store = data.mode().as_str(), "providers selected");

    // Initialize LLM client (non-fatal: AI features disabled if config missing).
    let llm: Option<Arc<dyn llm::LlmChat>> = match llm::GeminiClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured, AI features disabled");
            None
        }
    };

    let state = state::AppState::new(auth, data, llm);

    let app = routes::app(state);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "mockprep listening");
    axum::serve(listener, app).await.expect("server failed");
}
