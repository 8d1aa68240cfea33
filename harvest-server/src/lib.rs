//! HTTP API for HarvestHub.
//!
//! Every route under `/api/v1/{collection}` takes `farmers` or `traders` as
//! the collection and maps onto one core operation.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post, put},
};
use chrono::{DateTime, Utc};
use harvest_core::{
    CoreError, CoreServices, ErrorKind, InputError, Inventory, PendingVerification,
    VerificationId,
};
use harvest_model::PersonRecord;
use harvest_types::{RecordId, Role};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Shared state behind every handler.
pub struct AppState {
    pub services: CoreServices,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(services: CoreServices) -> Self {
        Self {
            services,
            started_at: Utc::now(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub now: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RegisterResponse {
    pub id: RecordId,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<RecordId>,
}

#[derive(Deserialize)]
struct RegisterRequest {
    mobile: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct CodeRequest {
    mobile: String,
}

/// Only the verification handle and the code. The account is the one the
/// code was requested for.
#[derive(Deserialize)]
struct VerifyRequest {
    verification_id: VerificationId,
    code: String,
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    crop: String,
}

#[derive(Deserialize)]
struct PopularParams {
    #[serde(default)]
    district: String,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct QuantityRequest {
    value: Value,
}

#[derive(Deserialize)]
struct AddCropRequest {
    name: String,
}

/// A core failure rendered as a JSON error response.
#[derive(Debug)]
pub struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl From<harvest_types::Error> for ApiError {
    fn from(err: harvest_types::Error) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoreError::InvalidInput(InputError::UnknownCollection(_)) => StatusCode::NOT_FOUND,
            err => status_for(err.kind()),
        };
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }
        let existing_id = match &self.0 {
            CoreError::DuplicateRegistration { existing_id, .. } => Some(existing_id.clone()),
            _ => None,
        };
        let body = ErrorBody {
            kind: self.0.kind(),
            message: self.0.to_string(),
            existing_id,
        };
        (status, Json(body)).into_response()
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::DuplicateRegistration => StatusCode::CONFLICT,
        ErrorKind::NotFound | ErrorKind::NotRegistered => StatusCode::NOT_FOUND,
        ErrorKind::VerificationFailed => StatusCode::UNAUTHORIZED,
        ErrorKind::StoreUnavailable | ErrorKind::ProviderUnavailable | ErrorKind::Cancelled => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ErrorKind::InvalidRecord => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

type ApiResult<T> = Result<T, ApiError>;
type SharedState = State<Arc<AppState>>;

fn role_of(collection: &str) -> ApiResult<Role> {
    Ok(Role::from_collection(collection)?)
}

async fn health_handler(State(state): SharedState) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.started_at,
        now: Utc::now(),
    })
}

async fn register_handler(
    State(state): SharedState,
    Path(collection): Path<String>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let role = role_of(&collection)?;
    let id = state
        .services
        .registration
        .register(&req.mobile, role, req.fields)
        .await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { id })))
}

async fn login_code_handler(
    State(state): SharedState,
    Path(collection): Path<String>,
    Json(req): Json<CodeRequest>,
) -> ApiResult<Json<PendingVerification>> {
    let role = role_of(&collection)?;
    let pending = state.services.login.request_code(&req.mobile, role).await?;
    Ok(Json(pending))
}

async fn login_verify_handler(
    State(state): SharedState,
    Path(collection): Path<String>,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<Json<PersonRecord>> {
    let role = role_of(&collection)?;
    let record = state
        .services
        .login
        .confirm(&req.verification_id, role, &req.code)
        .await?;
    Ok(Json(record))
}

async fn search_handler(
    State(state): SharedState,
    Path(collection): Path<String>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<PersonRecord>>> {
    let role = role_of(&collection)?;
    let records = state
        .services
        .matching
        .exact_crop_search(&params.crop, role)
        .await?;
    Ok(Json(records))
}

async fn popular_handler(
    State(state): SharedState,
    Path(collection): Path<String>,
    Query(params): Query<PopularParams>,
) -> ApiResult<Json<Vec<PersonRecord>>> {
    let role = role_of(&collection)?;
    let records = state
        .services
        .matching
        .popular_in_district(&params.district, role, params.limit)
        .await?;
    Ok(Json(records))
}

async fn inventory_handler(
    State(state): SharedState,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<Json<Inventory>> {
    let role = role_of(&collection)?;
    let id = RecordId::parse(&id)?;
    Ok(Json(state.services.inventory.load(role, &id).await?))
}

async fn quantity_handler(
    State(state): SharedState,
    Path((collection, id, index)): Path<(String, String, String)>,
    Json(req): Json<QuantityRequest>,
) -> ApiResult<Json<Inventory>> {
    let role = role_of(&collection)?;
    let id = RecordId::parse(&id)?;
    let index = index
        .parse::<usize>()
        .map_err(|_| CoreError::from(InputError::InvalidIndex(index.clone())))?;
    let raw = match req.value {
        Value::String(s) => s,
        other => other.to_string(),
    };
    let mut inventory = state.services.inventory.load(role, &id).await?;
    state
        .services
        .inventory
        .update_quantity(&mut inventory, index, &raw)
        .await?;
    Ok(Json(inventory))
}

async fn add_crop_handler(
    State(state): SharedState,
    Path((collection, id)): Path<(String, String)>,
    Json(req): Json<AddCropRequest>,
) -> ApiResult<(StatusCode, Json<Inventory>)> {
    let role = role_of(&collection)?;
    let id = RecordId::parse(&id)?;
    let mut inventory = state.services.inventory.load(role, &id).await?;
    state
        .services
        .inventory
        .add_crop(&mut inventory, &req.name)
        .await?;
    Ok((StatusCode::CREATED, Json(inventory)))
}

async fn profile_handler(
    State(state): SharedState,
    Path((collection, id)): Path<(String, String)>,
    Json(fields): Json<Map<String, Value>>,
) -> ApiResult<Json<PersonRecord>> {
    let role = role_of(&collection)?;
    let id = RecordId::parse(&id)?;
    state
        .services
        .profiles
        .update_profile(&id, role, fields)
        .await?;
    Ok(Json(state.services.directory.get(role, &id).await?))
}

/// Build the HTTP API router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/{collection}/register", post(register_handler))
        .route("/api/v1/{collection}/login/code", post(login_code_handler))
        .route("/api/v1/{collection}/login/verify", post(login_verify_handler))
        .route("/api/v1/{collection}/search", get(search_handler))
        .route("/api/v1/{collection}/popular", get(popular_handler))
        .route(
            "/api/v1/{collection}/records/{id}/inventory",
            get(inventory_handler),
        )
        .route(
            "/api/v1/{collection}/records/{id}/inventory/{index}",
            put(quantity_handler),
        )
        .route(
            "/api/v1/{collection}/records/{id}/crops",
            post(add_crop_handler),
        )
        .route("/api/v1/{collection}/records/{id}", patch(profile_handler))
        .with_state(state)
}
