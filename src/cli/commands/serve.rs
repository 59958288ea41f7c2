//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for the video library and question answering.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SporreError;
use crate::library::{list_videos, VideoEntry};
use crate::pipeline::{AnswerBundle, AskPipeline};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    pipeline: AskPipeline,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    preflight::check(Operation::Serve)?;

    let pipeline = AskPipeline::new(settings.clone())?;

    let state = Arc::new(AppState { pipeline, settings });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/videos", get(videos))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Sporre API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Videos", "GET  /videos");
    Output::kv("Ask", "POST /ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AskRequest {
    /// The question to answer. Required; rejected with 400 when missing.
    #[serde(default)]
    question: Option<String>,
    /// Video title selecting a per-video transcript.
    #[serde(default)]
    video_title: Option<String>,
}

#[derive(Serialize)]
struct VideosResponse(Vec<VideoEntry>);

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn videos(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match list_videos(
        &state.settings.videos_dir(),
        &state.settings.library.extensions,
    ) {
        Ok(videos) => Json(VideosResponse(videos)).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    let Some(question) = req.question.filter(|q| !q.trim().is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required field: question".to_string(),
        );
    };

    match state
        .pipeline
        .ask(&question, req.video_title.as_deref())
        .await
    {
        Ok(bundle) => Json::<AnswerBundle>(bundle).into_response(),
        Err(e @ SporreError::InvalidInput(_)) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e @ SporreError::TranscriptNotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, e.to_string())
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
