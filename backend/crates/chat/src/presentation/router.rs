//! Chat Router

use axum::{
    Router,
    routing::{get, post},
};

use crate::domain::client::CompletionClient;
use crate::presentation::handlers::{self, ChatAppState};

/// Create the chat router for any completion client
pub fn chat_router<C>(state: ChatAppState<C>) -> Router
where
    C: CompletionClient + Send + Sync + 'static,
{
    Router::new()
        .route("/query", post(handlers::submit_query::<C>))
        .route(
            "/history",
            get(handlers::get_history::<C>).delete(handlers::clear_history::<C>),
        )
        .route(
            "/usage",
            get(handlers::get_usage::<C>).delete(handlers::reset_usage::<C>),
        )
        .with_state(state)
}
