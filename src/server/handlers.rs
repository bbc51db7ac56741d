//! Route handlers.
//!
//! Handlers parse the request, check the bearer token when one is required,
//! and run the blocking operation on tokio's blocking pool. Every failure is
//! turned into a response by `ApiError`.

use super::error::ApiError;
use super::state::AppState;
use crate::constants::APP_NAME;
use crate::errors::{AppError, AppResult, AuthError};
use crate::ops;
use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use chrono::{Local, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use zeroize::Zeroizing;

type ApiResult = Result<Json<Value>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub id: String,
    pub name: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub id: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub member_id: String,
    pub detail: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// Identifies the entries a read or delete applies to.
#[derive(Debug, Deserialize)]
pub struct EntryScope {
    pub date: String,
    pub member_id: String,
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Runs a blocking operation off the async worker threads.
async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}

/// Checks that the bearer token, when required, belongs to `member_id`.
fn authorize(state: &AppState, headers: &HeaderMap, member_id: &str) -> AppResult<()> {
    if !state.require_token {
        return Ok(());
    }

    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    let claims = state.tokens.verify(token, Utc::now())?;
    if claims.subject != member_id {
        return Err(AuthError::Forbidden(member_id.to_string()).into());
    }
    Ok(())
}

pub async fn root() -> Json<Value> {
    Json(json!({ "name": APP_NAME }))
}

pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult {
    let body = json_body(payload)?;
    let password = Zeroizing::new(body.password);

    let profile = run_blocking(move || {
        ops::signup(&state.db, &body.id, &body.name, &password, &body.email)
    })
    .await?;

    Ok(Json(json!({
        "success": "Signup complete",
        "user": profile,
    })))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult {
    let body = json_body(payload)?;
    let password = Zeroizing::new(body.password);

    let outcome = run_blocking(move || {
        ops::login(&state.db, &state.tokens, &body.id, &password, Utc::now())
    })
    .await?;

    Ok(Json(json!({
        "success": "Login succeeded",
        "user": outcome.user,
        "token": outcome.token.token,
        "expires_at": outcome.token.expires_at,
    })))
}

pub async fn write_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<WriteRequest>, JsonRejection>,
) -> ApiResult {
    let body = json_body(payload)?;
    authorize(&state, &headers, &body.member_id)?;

    let date = match body.date.as_deref() {
        Some(raw) if !raw.trim().is_empty() => ops::parse_entry_date(raw)?,
        _ => Local::now().date_naive(),
    };

    let entry = run_blocking(move || {
        ops::write_entry(
            &state.db,
            state.augmenter.as_ref(),
            &body.member_id,
            &body.detail,
            date,
        )
    })
    .await?;

    Ok(Json(json!({
        "success": "Diary entry saved",
        "received_text": entry.detail,
        "entry": entry,
    })))
}

pub async fn read_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<EntryScope>, QueryRejection>,
) -> ApiResult {
    let Query(scope) = query.map_err(|r| AppError::Validation(r.body_text()))?;
    authorize(&state, &headers, &scope.member_id)?;
    let date = ops::parse_entry_date(&scope.date)?;

    let entries =
        run_blocking(move || ops::read_entries(&state.db, &scope.member_id, date)).await?;

    Ok(Json(json!({ "entries": entries })))
}

pub async fn delete_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<EntryScope>, JsonRejection>,
) -> ApiResult {
    let scope = json_body(payload)?;
    authorize(&state, &headers, &scope.member_id)?;
    let date = ops::parse_entry_date(&scope.date)?;

    let deleted =
        run_blocking(move || ops::delete_entries(&state.db, &scope.member_id, date)).await?;

    Ok(Json(json!({
        "success": "Diary entries deleted",
        "deleted": deleted,
    })))
}
