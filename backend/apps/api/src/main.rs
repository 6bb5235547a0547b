//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; chat failures are reported by the
//! `chat` crate itself.

use axum::{
    Router, http,
    http::{Method, header},
};
use chat::application::usage::{log_usage_stats, usage_stats};
use chat::presentation::handlers::ChatAppState;
use chat::{ApiConfigLoader, ChatConfig, GrokClient, chat_router};
use chrono::Utc;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:31114";
const DEFAULT_LOG_DIR: &str = "logs";
const USAGE_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// File log at INFO (or `RUST_LOG`), console at WARN
fn init_tracing() -> WorkerGuard {
    let log_dir = env::var("CHAT_LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
    let file_appender = tracing_appender::rolling::daily(log_dir, "grok_ui");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "chat_api=info,chat=info,tower_http=info".into());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(LevelFilter::WARN),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let _log_guard = init_tracing();

    // Chat configuration
    let config = ChatConfig::from_env()?;

    // API configuration: fail fast when the key is missing
    let api_config = ApiConfigLoader::from_env();
    if let Err(e) = api_config.load() {
        tracing::error!(error = %e, "Failed to load API configuration");
        return Err(e.into());
    }

    let client = GrokClient::from_config(&config)?;
    tracing::info!(
        minute_limit = config.minute_limit,
        hour_limit = config.hour_limit,
        max_history = config.max_history,
        "Chat configuration loaded"
    );

    let state = ChatAppState::new(client, api_config, config);

    // Periodic usage snapshot
    let session = state.session();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(USAGE_LOG_INTERVAL);
        loop {
            interval.tick().await;
            let stats = usage_stats(&mut *session.lock().await, Utc::now());
            log_usage_stats(&stats);
        }
    });

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:8501,http://127.0.0.1:8501".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]));

    // Build router
    let app = Router::new()
        .nest("/api/chat", chat_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("CHAT_BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
