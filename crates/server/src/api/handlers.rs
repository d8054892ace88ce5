//! HTTP request handlers and shared application state.

use crate::api::auth::{ApiKeys, Caller};
use crate::api::errors::ApiError;
use crate::api::metrics;
use crate::api::models::*;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;
use tripsearch_core::config;
use tripsearch_core::document::{parse_date, TripDocument};
use tripsearch_core::search::{
    parse_pagination, search_detailed, RelevanceWeights, SearchParams, SearchQuery,
};
use tripsearch_core::storage::{save_snapshot, Database};

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Criterion weights, validated once at startup.
    pub weights: Arc<RelevanceWeights>,
    pub data_dir: String,
    pub api_keys: ApiKeys,
    pub prometheus_handle: PrometheusHandle,
    pub start_time: Instant,
}

impl AppState {
    /// Writes a snapshot after a mutation. Failures are logged; the periodic task retries.
    fn persist(&self) {
        if let Err(e) = save_snapshot(&self.db, std::path::Path::new(&self.data_dir)) {
            tracing::error!("Snapshot after write failed: {}", e);
        }
    }
}

fn parse_date_filter(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("invalid date '{}'", value))),
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        total_documents: state.db.document_count(),
    })
}

/// `GET /metrics`
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}

/// `GET /trips/search/:opts`
///
/// `opts` is `city[.mood1.mood2...]`; the other criteria come from the query string.
pub async fn search_trips(
    State(state): State<AppState>,
    Path(opts): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<TripPageResponse>, ApiError> {
    let query = SearchQuery::parse(&opts, &params)?;
    let outcome = search_detailed(&query, &state.db, &state.weights)?;
    metrics::record_search(outcome.path, outcome.candidates);
    tracing::info!(
        target: "trip",
        city = %query.city,
        path = outcome.path.as_str(),
        results = outcome.page.len(),
        "Search"
    );
    Ok(Json(TripPageResponse::from_page(
        outcome.page,
        query.pagination,
    )))
}

/// `GET /trips`
pub async fn list_trips(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<TripPageResponse>, ApiError> {
    let pagination = parse_pagination(params.page.as_deref(), params.page_size.as_deref())?;
    let trips = state.db.list_trips(pagination);
    Ok(Json(TripPageResponse::from_results(
        trips.into_iter().map(TripResult::from).collect(),
        pagination,
    )))
}

/// `GET /trips/:id`
pub async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TripDocument>, ApiError> {
    Ok(Json(state.db.get_trip(&id)?))
}

/// `GET /trips/:id/:file`
///
/// Pictures are served by the data service; this answers with a redirect to it.
pub async fn get_picture(
    Path((id, file)): Path<(String, String)>,
    Query(params): Query<PictureParams>,
) -> Result<Response, ApiError> {
    let location = picture_location(&id, &file, params.size.as_deref())?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

fn picture_location(id: &str, file: &str, size: Option<&str>) -> Result<String, ApiError> {
    let (name, ext) = file
        .rsplit_once('.')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("'{}' is not a picture name", file)))?;
    if !config::PICTURE_EXTENSIONS.contains(&ext) {
        return Err(ApiError::BadRequest(format!(
            "picture extension must be one of {}",
            config::PICTURE_EXTENSIONS.join(", ")
        )));
    }
    let mut location = format!("{}/{}/{}.{}", config::PICTURE_REDIRECT_BASE, id, name, ext);
    if let Some(size) = size.filter(|s| !s.is_empty()) {
        if !size.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ApiError::BadRequest(format!("invalid picture size '{}'", size)));
        }
        location.push_str("?size=");
        location.push_str(size);
    }
    Ok(location)
}

/// `GET /users/:user_id/trips`
pub async fn user_trips(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<UserTripsParams>,
) -> Result<Json<TripListResponse>, ApiError> {
    let date = parse_date_filter(params.date.as_deref())?;
    Ok(Json(TripListResponse::new(
        state.db.trips_of_user(&user_id, date),
    )))
}

/// `GET /users/my/trips`
pub async fn my_trips(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<UserTripsParams>,
) -> Result<Json<TripListResponse>, ApiError> {
    let date = parse_date_filter(params.date.as_deref())?;
    Ok(Json(TripListResponse::new(
        state.db.my_trips(&caller.user_id, date),
    )))
}

/// `GET /users/my/trips/:id`
///
/// Requires a key but reads like `GET /trips/:id`: any caller may fetch any live trip,
/// no ownership check is made.
pub async fn my_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TripDocument>, ApiError> {
    Ok(Json(state.db.get_trip(&id)?))
}

/// `POST /trips`
pub async fn create_trip(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<TripPayload>,
) -> Result<(StatusCode, Json<TripDocument>), ApiError> {
    let trip = state.db.create_trip(payload, &caller.user_id)?;
    state.persist();
    metrics::record_write_operation("create");
    Ok((StatusCode::CREATED, Json(trip)))
}

/// `PUT /trips/:id`
pub async fn update_trip(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(payload): Json<TripPayload>,
) -> Result<Json<TripDocument>, ApiError> {
    let trip = state.db.update_trip(&id, &caller.user_id, payload)?;
    state.persist();
    metrics::record_write_operation("update");
    Ok(Json(trip))
}

/// `PUT|POST /trips/:id/togglePublic`
pub async fn toggle_public(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<TripDocument>, ApiError> {
    let trip = state.db.toggle_public(&id, &caller.user_id)?;
    state.persist();
    metrics::record_write_operation("toggle_public");
    Ok(Json(trip))
}

/// `DELETE /trips/:id`
pub async fn delete_trip(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_trip(&id, &caller.user_id)?;
    state.persist();
    metrics::record_write_operation("delete");
    Ok(StatusCode::NO_CONTENT)
}

/// Retired picture upload routes.
pub async fn picture_upload_gone() -> ApiError {
    ApiError::Gone("Picture uploads moved to the data service".into())
}
