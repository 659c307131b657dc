//! Thin JSON facade over the registry
//!
//! Owns no business logic: requests deserialize to the typed submission
//! contract, run through the engine and the commit path, and errors map onto
//! HTTP statuses. Master CRUD, authentication, and document handling live in
//! external systems.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use landtenure_engine::{AllocationSubmission, Ceilings};

use crate::error::RegistryError;
use crate::models::{CommitSummary, QueueFilter, VerificationStats};
use crate::registry::{self, HouseholdDetail};
use crate::subdivision;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ceilings: Ceilings,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/households/{national_id}", get(get_household))
        .route("/households/{id}/allocations", get(get_allocations))
        .route("/households/{id}/approve", post(approve))
        .route("/subdivision/queue", get(queue))
        .route("/allocations", post(submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

struct ApiError(RegistryError);

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RegistryError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RegistryError::HouseholdNotFound(_) | RegistryError::ParcelNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            RegistryError::CeilingExceeded { .. } => StatusCode::CONFLICT,
            _ => {
                tracing::error!(error = %self.0, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn stats(State(state): State<AppState>) -> Result<Json<VerificationStats>, ApiError> {
    let stats = registry::verification_stats(&state.pool).await?;
    Ok(Json(stats))
}

async fn get_household(
    State(state): State<AppState>,
    Path(national_id): Path<String>,
) -> Result<Json<HouseholdDetail>, ApiError> {
    let detail =
        registry::find_household_by_national_id(&state.pool, &state.ceilings, &national_id)
            .await?;
    Ok(Json(detail))
}

async fn get_allocations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<crate::models::AllocationWithMember>>, ApiError> {
    let rows = registry::list_allocations(&state.pool, id).await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
struct QueueParams {
    #[serde(default)]
    filter: QueueFilter,
}

async fn queue(
    State(state): State<AppState>,
    Query(params): Query<QueueParams>,
) -> Result<Json<Vec<crate::models::QueueEntry>>, ApiError> {
    tracing::debug!(filter = %params.filter, "queue requested");
    let entries =
        registry::list_subdivision_queue(&state.pool, &state.ceilings, params.filter).await?;
    Ok(Json(entries))
}

async fn submit(
    State(state): State<AppState>,
    Json(submission): Json<AllocationSubmission>,
) -> Result<Json<CommitSummary>, ApiError> {
    let summary =
        subdivision::submit_allocation(&state.pool, &state.ceilings, &submission).await?;
    Ok(Json(summary))
}

async fn approve(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CommitSummary>, ApiError> {
    let summary = subdivision::approve_within_ceiling(&state.pool, &state.ceilings, id).await?;
    Ok(Json(summary))
}
