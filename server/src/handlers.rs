//! HTTP handlers.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use sparks_core::types::{AiResult, Category, Idea, IdeaDraft, IdeaPatch, IdeaQuery};
use std::str::FromStr;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ApiError, ErrorResponse, Result};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessRequest {
    #[serde(rename = "rawInput", default)]
    pub raw_input: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
}

/// Listing filters. Blank values are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListIdeasParams {
    pub category: Option<String>,
    /// active, actioned or archived
    pub status: Option<String>,
    /// normal, important or urgent
    pub priority: Option<String>,
    /// newest (default), oldest or priority
    pub sort: Option<String>,
    /// Case-insensitive match on title, summary or tags
    pub search: Option<String>,
}

impl ListIdeasParams {
    fn into_query(self) -> Result<(IdeaQuery, String)> {
        let query = IdeaQuery {
            category: non_blank(self.category),
            status: parse_param("status", self.status)?,
            priority: parse_param("priority", self.priority)?,
            sort: parse_param("sort", self.sort)?.unwrap_or_default(),
        };
        Ok((query, self.search.unwrap_or_default()))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_param<T: FromStr>(name: &str, value: Option<String>) -> Result<Option<T>> {
    non_blank(value)
        .map(|v| {
            v.parse()
                .map_err(|_| ApiError::BadRequest(format!("Invalid {name}: {v}")))
        })
        .transpose()
}

/// Liveness plus a store probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and store healthy", body = HealthResponse),
        (status = 503, description = "Store unreachable", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.workflow.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                store: "ok".to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    store: "unavailable".to_string(),
                }),
            )
        }
    }
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("Metrics are disabled".to_string()))?;
    Ok((
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}

#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "Categories ordered by name", body = Vec<Category>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.workflow.list_categories().await?))
}

#[utoipa::path(
    post,
    path = "/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Blank name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>)> {
    let Json(request) = body?;
    let category = state.workflow.accept_category(&request.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode> {
    let Path(id) = id?;
    state.workflow.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/ideas",
    params(ListIdeasParams),
    responses(
        (status = 200, description = "Matching ideas", body = Vec<Idea>),
        (status = 400, description = "Invalid filter value", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_ideas(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<ListIdeasParams>, QueryRejection>,
) -> Result<Json<Vec<Idea>>> {
    let Query(params) = params?;
    let (query, search) = params.into_query()?;
    Ok(Json(state.workflow.list_ideas(&query, &search).await?))
}

#[utoipa::path(
    post,
    path = "/ideas",
    request_body = IdeaDraft,
    responses(
        (status = 201, description = "Idea stored", body = Idea),
        (status = 400, description = "Missing required field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn create_idea(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<IdeaDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Idea>)> {
    let Json(draft) = body?;
    let idea = state.workflow.confirm_idea(draft).await?;
    Ok((StatusCode::CREATED, Json(idea)))
}

#[utoipa::path(
    patch,
    path = "/ideas/{id}",
    params(("id" = Uuid, Path, description = "Idea id")),
    request_body = IdeaPatch,
    responses(
        (status = 200, description = "Updated idea", body = Idea),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 404, description = "No such idea", body = ErrorResponse)
    )
)]
pub async fn update_idea(
    State(state): State<Arc<AppState>>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
    body: std::result::Result<Json<IdeaPatch>, JsonRejection>,
) -> Result<Json<Idea>> {
    let Path(id) = id?;
    let Json(patch) = body?;
    Ok(Json(state.workflow.update_idea(id, patch).await?))
}

#[utoipa::path(
    delete,
    path = "/ideas/{id}",
    params(("id" = Uuid, Path, description = "Idea id")),
    responses(
        (status = 204, description = "Idea deleted, or never existed"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn delete_idea(
    State(state): State<Arc<AppState>>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode> {
    let Path(id) = id?;
    state.workflow.delete_idea(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Turns raw text into a reviewable suggestion. Nothing is stored.
#[utoipa::path(
    post,
    path = "/ideas/process",
    request_body = ProcessRequest,
    responses(
        (status = 200, description = "Structured suggestion", body = AiResult),
        (status = 400, description = "Blank input", body = ErrorResponse),
        (status = 429, description = "Completion service rate limited", body = ErrorResponse),
        (status = 500, description = "Completion failed or was unusable", body = ErrorResponse)
    )
)]
pub async fn process_idea(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<AiResult>> {
    let Json(request) = body?;
    Ok(Json(state.workflow.create_draft(&request.raw_input).await?))
}
