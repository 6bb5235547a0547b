//! HTTP Handlers

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use platform::time_format::TimestampFormatter;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::config::{ApiConfigLoader, ChatConfig};
use crate::application::history::{clear_history as clear_session_history, search_history};
use crate::application::session::SessionContext;
use crate::application::submit_query::SubmitQueryUseCase;
use crate::application::usage::{
    log_usage_stats, reset_usage as reset_session_usage, usage_stats,
};
use crate::domain::client::CompletionClient;
use crate::presentation::dto::{
    DisplayResponse, HistoryQuery, HistoryResponse, QueryRequest, UsageResponse,
};

/// Shared state for chat handlers
///
/// One session per process: queries are serialized through the session lock.
pub struct ChatAppState<C>
where
    C: CompletionClient + Send + Sync + 'static,
{
    pub session: Arc<Mutex<SessionContext>>,
    pub submit: Arc<SubmitQueryUseCase<C>>,
    pub formatter: TimestampFormatter,
}

impl<C> Clone for ChatAppState<C>
where
    C: CompletionClient + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            submit: self.submit.clone(),
            formatter: self.formatter.clone(),
        }
    }
}

impl<C> ChatAppState<C>
where
    C: CompletionClient + Send + Sync + 'static,
{
    pub fn new(client: C, api_config: ApiConfigLoader, config: ChatConfig) -> Self {
        let session = SessionContext::new(&config, Utc::now());
        Self {
            session: Arc::new(Mutex::new(session)),
            submit: Arc::new(SubmitQueryUseCase::new(
                Arc::new(client),
                Arc::new(api_config),
                Arc::new(config),
            )),
            formatter: TimestampFormatter::default(),
        }
    }

    /// Handle to the session, for background tasks
    pub fn session(&self) -> Arc<Mutex<SessionContext>> {
        self.session.clone()
    }
}

/// POST /api/chat/query
pub async fn submit_query<C>(
    State(state): State<ChatAppState<C>>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse
where
    C: CompletionClient + Send + Sync + 'static,
{
    let mut session = state.session.lock().await;
    let result = state.submit.execute(&mut session, &req.text, Utc::now()).await;

    let status = match result.error {
        None => StatusCode::OK,
        Some(kind) => StatusCode::from_u16(kind.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    };

    (status, Json(DisplayResponse::from(result)))
}

/// GET /api/chat/history
pub async fn get_history<C>(
    State(state): State<ChatAppState<C>>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse>
where
    C: CompletionClient + Send + Sync + 'static,
{
    let session = state.session.lock().await;
    let term = query.search.as_deref().unwrap_or("");
    let page = search_history(&session, term, query.limit);

    Json(HistoryResponse::from_page(&page, &state.formatter))
}

/// DELETE /api/chat/history
pub async fn clear_history<C>(State(state): State<ChatAppState<C>>) -> StatusCode
where
    C: CompletionClient + Send + Sync + 'static,
{
    let mut session = state.session.lock().await;
    clear_session_history(&mut session);
    StatusCode::NO_CONTENT
}

/// GET /api/chat/usage
pub async fn get_usage<C>(State(state): State<ChatAppState<C>>) -> Json<UsageResponse>
where
    C: CompletionClient + Send + Sync + 'static,
{
    let mut session = state.session.lock().await;
    let stats = usage_stats(&mut session, Utc::now());
    log_usage_stats(&stats);
    Json(UsageResponse::new(stats, session.started_at()))
}

/// DELETE /api/chat/usage
pub async fn reset_usage<C>(State(state): State<ChatAppState<C>>) -> StatusCode
where
    C: CompletionClient + Send + Sync + 'static,
{
    let mut session = state.session.lock().await;
    reset_session_usage(&mut session);
    StatusCode::NO_CONTENT
}
