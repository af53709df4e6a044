use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use noor_core::errors::GuidanceError;
use noor_core::guidance::{
    GuidanceClient, GuidanceResponse, HadithInsightsInput, HadithInsightsOutput, NoorAi,
    PersonalAdviceInput, PersonalAdviceOutput,
};
use noor_core::history::Turn;
use noor_core::request::RequestAssembler;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    noor: Arc<NoorAi>,
    assembler: RequestAssembler,
}

impl AppState {
    pub fn new(noor: NoorAi, assembler: RequestAssembler) -> Self {
        Self {
            noor: Arc::new(noor),
            assembler,
        }
    }
}

/// Body of `POST /api/guidance`
#[derive(Deserialize)]
pub struct GuidanceBody {
    #[serde(default)]
    history: Vec<Turn>,
    #[serde(default, rename = "newInput", alias = "lifeSituation")]
    new_input: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    error: String,
}

/// Error type for HTTP server
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Upstream(String),
}

impl From<GuidanceError> for ApiError {
    fn from(err: GuidanceError) -> Self {
        match err {
            GuidanceError::Validation(msg) => ApiError::BadRequest(msg),
            GuidanceError::Upstream(msg) => ApiError::Upstream(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => {
                warn!(error = %msg, "Rejected request");
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: msg })).into_response()
            }
            Self::Upstream(msg) => {
                error!(error = %msg, "Upstream model call failed");
                let body = Json(ErrorBody {
                    error: GuidanceError::Upstream(msg).user_message(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

/// Builds the router with every NoorAI route
pub fn router(state: AppState) -> Router {
    // The web front-end calls from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/api/guidance", post(handle_guidance))
        .route("/api/hadith", post(handle_hadith))
        .route("/api/advice", post(handle_advice))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn run_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;

    axum::serve(listener, router(state))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start HTTP server: {}", e))
}

/// Health check handler
async fn health() -> impl IntoResponse {
    "NoorAI is running"
}

/// Handler for multi-turn guidance requests
async fn handle_guidance(
    State(state): State<AppState>,
    payload: Result<Json<GuidanceBody>, JsonRejection>,
) -> Result<Json<GuidanceResponse>, ApiError> {
    let Json(body) = payload?;

    let new_input = body
        .new_input
        .ok_or_else(|| ApiError::BadRequest("newInput is required".to_string()))?;

    if let Some(index) = body.history.iter().position(|turn| !turn.is_valid()) {
        return Err(ApiError::BadRequest(format!(
            "history[{}] has empty content",
            index
        )));
    }

    let request = state.assembler.assemble(&body.history, &new_input)?;
    let response = state.noor.generate(&request).await?;
    Ok(Json(response))
}

/// Handler for Hadith explanations
async fn handle_hadith(
    State(state): State<AppState>,
    payload: Result<Json<HadithInsightsInput>, JsonRejection>,
) -> Result<Json<HadithInsightsOutput>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.noor.extract_hadith_insights(&input).await?))
}

/// Handler for personalized advice
async fn handle_advice(
    State(state): State<AppState>,
    payload: Result<Json<PersonalAdviceInput>, JsonRejection>,
) -> Result<Json<PersonalAdviceOutput>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.noor.personalize_advice(&input).await?))
}
