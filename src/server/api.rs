use crate::agent::ChatAgent;
use crate::models::chat::Exchange;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    body::Bytes,
    extract::State,
    response::{ IntoResponse, Response },
    http::StatusCode,
    Json,
};
use serde::{ Deserialize, Serialize };
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
    status: &'static str,
    model: String,
    conversation_id: usize,
    history_count: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    status: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct HistoryResponse {
    status: &'static str,
    history: Vec<Exchange>,
    total_exchanges: usize,
}

#[derive(Serialize)]
struct ClearHistoryResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct SummaryResponse {
    status: &'static str,
    summary: String,
    total_exchanges: usize,
}

#[derive(Clone)]
struct AppState {
    agent: Arc<ChatAgent>,
}

pub fn router(agent: Arc<ChatAgent>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .route("/history", get(get_history_handler).delete(clear_history_handler))
        .route("/summary", get(summary_handler))
        .layer(cors)
        .with_state(AppState { agent })
}

pub async fn start_http_server(
    addr: &str,
    agent: Arc<ChatAgent>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    info!("Starting HTTP API server on: http://{}", addr);

    let app = router(agent);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn internal_error(err: Box<dyn Error + Send + Sync>) -> Response {
    error!("chat request failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
            status: "failed",
        }),
    ).into_response()
}

async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Response {
    // The body is validated against an explicit request struct; a missing
    // body, non-JSON payload, or absent field all get the same fixed 400.
    let message = serde_json::from_slice::<ChatRequest>(&body)
        .ok()
        .and_then(|req| req.message);

    let Some(message) = message else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No message provided".to_string(),
                status: "failed",
            }),
        ).into_response();
    };

    match state.agent.chat(&message).await {
        Ok(turn) =>
            (
                StatusCode::OK,
                Json(ChatResponse {
                    response: turn.response,
                    status: "success",
                    model: state.agent.model(),
                    conversation_id: turn.history_count,
                    history_count: turn.history_count,
                }),
            ).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "healthy" })
}

async fn get_history_handler(State(state): State<AppState>) -> Response {
    let history = match state.agent.history().await {
        Ok(history) => history,
        Err(e) => return internal_error(e),
    };

    let total_exchanges = history.len();
    Json(HistoryResponse {
        status: "success",
        history,
        total_exchanges,
    }).into_response()
}

async fn clear_history_handler(State(state): State<AppState>) -> Response {
    if let Err(e) = state.agent.clear_history().await {
        return internal_error(e);
    }

    Json(ClearHistoryResponse {
        status: "success",
        message: "Conversation history cleared",
    }).into_response()
}

async fn summary_handler(State(state): State<AppState>) -> Response {
    let summary = match state.agent.summary().await {
        Ok(summary) => summary,
        Err(e) => return internal_error(e),
    };
    let total_exchanges = match state.agent.total_exchanges().await {
        Ok(total) => total,
        Err(e) => return internal_error(e),
    };

    Json(SummaryResponse {
        status: "success",
        summary,
        total_exchanges,
    }).into_response()
}
