// Budget Accounts API - HTTP surface
//
// Handlers are deliberately thin: each runs its operation's stage list, then
// does only the store call and response shaping. All validation and existence
// checking lives in the pipeline; all failure shaping lives in `ApiError`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Limits;
use crate::db::AccountStore;
use crate::entities::Account;
use crate::error::ApiError;
use crate::pipeline::{
    run_stages, RequestContext, CREATE_STAGES, FETCH_STAGES, UPDATE_STAGES,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn AccountStore>,
    limits: Limits,
}

impl AppState {
    pub fn new(store: Arc<dyn AccountStore>, limits: Limits) -> Self {
        AppState { store, limits }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/:id",
            get(fetch_account).put(update_account).delete(delete_account),
        )
        .fallback(unknown_route)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /accounts - every stored account; an empty store is an empty array
async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>, ApiError> {
    Ok(Json(state.store.get_all()?))
}

/// GET /accounts/:id - the account the resolver attached
async fn fetch_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Account>, ApiError> {
    let mut ctx = RequestContext::new().with_id(id);
    run_stages(FETCH_STAGES, state.store.as_ref(), &state.limits, &mut ctx)?;

    let account = ctx.account.take().ok_or_else(|| {
        ApiError::Internal("existence resolver passed without attaching an account".to_string())
    })?;
    Ok(Json(account))
}

/// POST /accounts - insert the validated draft, 201 with the stored record
async fn create_account(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let mut ctx = RequestContext::new().with_body(body);
    run_stages(CREATE_STAGES, state.store.as_ref(), &state.limits, &mut ctx)?;

    let draft = ctx.draft.take().ok_or_else(|| {
        ApiError::Internal("payload validator passed without attaching a draft".to_string())
    })?;
    let created = state.store.insert(&draft)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /accounts/:id - rewrite name/budget for the resolved account
async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Account>, ApiError> {
    let mut ctx = RequestContext::new().with_id(id).with_body(body);
    run_stages(UPDATE_STAGES, state.store.as_ref(), &state.limits, &mut ctx)?;

    let resolved = ctx.account.take().ok_or_else(|| {
        ApiError::Internal("existence resolver passed without attaching an account".to_string())
    })?;
    let draft = ctx.draft.take().ok_or_else(|| {
        ApiError::Internal("payload validator passed without attaching a draft".to_string())
    })?;

    // The resolver just saw this row; a vanished row here reads as not found
    let updated = state
        .store
        .update(resolved.id, &draft)?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(updated))
}

/// DELETE /accounts/:id - remove the row, answer with the pre-deletion snapshot
async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Account>, ApiError> {
    let mut ctx = RequestContext::new().with_id(id);
    run_stages(FETCH_STAGES, state.store.as_ref(), &state.limits, &mut ctx)?;

    let snapshot = ctx.account.take().ok_or_else(|| {
        ApiError::Internal("existence resolver passed without attaching an account".to_string())
    })?;
    state.store.delete(snapshot.id)?;
    Ok(Json(snapshot))
}

/// Any unmatched path
async fn unknown_route() -> ApiError {
    ApiError::NotFound
}

// ============================================================================
// TESTS
// ============================================================================
