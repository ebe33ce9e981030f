//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers::{self, SessionManager};
use super::models::{AddCategoryRequest, ApiError, ApiResponse, ClassifyQuery, ClassifyRequest};
use crate::controller::DynController;
use crate::render::{self, OutputFormat};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<DynController>,
    pub sessions: Arc<SessionManager>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        .route("/api/sessions", post(create_session_handler))
        .route("/api/sessions/:id", axum::routing::delete(end_session_handler))
        .route(
            "/api/sessions/:id/categories",
            get(list_categories_handler).post(add_category_handler),
        )
        .route("/api/sessions/:id/classify", post(classify_handler))
        .route("/", get(serve_ui))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Configure and start the HTTP server
pub async fn start_http_server(
    controller: Arc<DynController>,
    sessions: Arc<SessionManager>,
    port: u16,
) -> Result<()> {
    let app = build_router(AppState {
        controller,
        sessions,
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("🌐 API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(handlers::health_check(&state.sessions).await))
}

async fn create_session_handler(State(state): State<AppState>) -> impl IntoResponse {
    let info = handlers::create_session(&state.sessions).await;
    (StatusCode::CREATED, Json(ApiResponse::success(info)))
}

async fn end_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let data = handlers::end_session(&state.sessions, &id).await?;
    Ok(Json(ApiResponse::success(data)))
}

async fn list_categories_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let data = handlers::list_categories(&state.sessions, &id).await?;
    Ok(Json(ApiResponse::success(data)))
}

async fn add_category_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AddCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let data = handlers::add_category(&state.controller, &state.sessions, &id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

async fn classify_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ClassifyQuery>,
    Json(payload): Json<ClassifyRequest>,
) -> Result<Response, ApiError> {
    let format = match query.format.as_deref() {
        Some(format) => format.parse::<OutputFormat>().map_err(|e| ApiError {
            status: StatusCode::BAD_REQUEST,
            message: e.to_string(),
        })?,
        None => OutputFormat::Json,
    };

    let report = handlers::classify(&state.controller, &state.sessions, &id, payload).await?;

    match format {
        OutputFormat::Html => Ok(Html(render::render_html(&report)).into_response()),
        OutputFormat::Text => Ok(render::render_text(&report).into_response()),
        OutputFormat::Json => Ok(Json(ApiResponse::success(report)).into_response()),
    }
}

/// Simple API info page
async fn serve_ui() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Olympics Classification API</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; }
        .endpoint { background: #f5f5f5; padding: 10px; margin: 10px 0; }
    </style>
</head>
<body>
    <h1>Olympics Classification API</h1>
    <div class="endpoint"><strong>POST /api/sessions</strong> - Start a session</div>
    <div class="endpoint"><strong>GET /api/sessions/:id/categories</strong> - List categories</div>
    <div class="endpoint"><strong>POST /api/sessions/:id/categories</strong> - Add a custom category</div>
    <div class="endpoint"><strong>POST /api/sessions/:id/classify</strong> - Classify videos (?format=html for players, ?format=text for plain text)</div>
    <div class="endpoint"><strong>DELETE /api/sessions/:id</strong> - End a session</div>
</body>
</html>
"#,
    )
}
