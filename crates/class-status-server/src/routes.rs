//! HTTP handlers for the REST API.
//!
//! Handlers authenticate the caller, delegate to the `class-status` store and
//! resolver, and shape the result as JSON.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use class_status::{
    friend_statuses, import_image, parse_rows, resolve, FriendRequest, FriendStatus, Location,
    NewBlock, Notification, ScheduleBlock, Status, UserId,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::extract::Api;
use crate::state::AppState;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct FriendRequestBody {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct SettleBody {
    pub request_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct InviteBody {
    pub receiver_id: UserId,
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadBody {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserStatus {
    pub user_id: UserId,
    pub status: Status,
    pub is_free: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportedRows {
    pub msg: String,
    pub items: Vec<ScheduleBlock>,
}

fn msg(text: impl Into<String>) -> Json<Value> {
    Json(json!({ "msg": text.into() }))
}

// =============================================================================
// Health
// =============================================================================

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// =============================================================================
// Schedule
// =============================================================================

/// GET /schedule
pub async fn list_schedule(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> HandlerResult<Vec<ScheduleBlock>> {
    Ok(Json(state.store.blocks_for_user(me)))
}

/// POST /schedule
pub async fn add_block(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Api(Json(block)): Api<Json<NewBlock>>,
) -> Result<(StatusCode, Json<ScheduleBlock>), AppError> {
    let block = state.store.add_block(me, block)?;
    Ok((StatusCode::CREATED, Json(block)))
}

/// DELETE /schedule?id=N
pub async fn delete_block(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Api(Query(query)): Api<Query<DeleteQuery>>,
) -> HandlerResult<Value> {
    state.store.delete_block(me, query.id)?;
    Ok(msg("Deleted"))
}

/// POST /schedule/rows
///
/// Body is the raw text returned by the image-extraction service.
pub async fn import_rows(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Api(body): Api<String>,
) -> Result<(StatusCode, Json<ImportedRows>), AppError> {
    let rows = parse_rows(&body)?;
    let items = state.store.add_blocks(me, rows)?;
    Ok(imported(items))
}

/// POST /schedule/upload
///
/// Body is the raw schedule image. The configured extractor turns it into rows,
/// which are stored only if every row is valid.
pub async fn upload_schedule(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Api(image): Api<Bytes>,
) -> Result<(StatusCode, Json<ImportedRows>), AppError> {
    let extractor = state.extractor.clone().ok_or(AppError::ExtractorUnavailable)?;
    if image.is_empty() {
        return Err(AppError::BadRequest("No image in request body".to_string()));
    }
    info!(user_id = me, bytes = image.len(), "extracting schedule image");

    let store = state.store.clone();
    let items = tokio::task::spawn_blocking(move || {
        import_image(extractor.as_ref(), store.as_ref(), me, &image)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Extraction task failed: {e}")))??;
    Ok(imported(items))
}

fn imported(items: Vec<ScheduleBlock>) -> (StatusCode, Json<ImportedRows>) {
    (
        StatusCode::CREATED,
        Json(ImportedRows {
            msg: "Schedule parsed and added".to_string(),
            items,
        }),
    )
}

/// GET /schedule/{user_id}
pub async fn user_schedule(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Api(Path(user_id)): Api<Path<UserId>>,
) -> HandlerResult<Vec<ScheduleBlock>> {
    Ok(Json(state.store.visible_blocks(me, user_id)?))
}

// =============================================================================
// Status
// =============================================================================

/// GET /status/{user_id}
pub async fn user_status(
    State(state): State<AppState>,
    CurrentUser(_me): CurrentUser,
    Api(Path(user_id)): Api<Path<UserId>>,
) -> HandlerResult<UserStatus> {
    let verdict = resolve(state.store.as_ref(), user_id, state.clock.now())?;
    Ok(Json(UserStatus {
        user_id,
        status: verdict.status(),
        is_free: verdict.is_free,
    }))
}

/// GET /friends/status
pub async fn friends_status(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> HandlerResult<Vec<FriendStatus>> {
    let store = state.store.as_ref();
    let statuses = friend_statuses(store, store, store, me, state.clock.now())?;
    Ok(Json(statuses))
}

// =============================================================================
// Friends
// =============================================================================

/// POST /friends/request
pub async fn send_friend_request(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Api(Json(body)): Api<Json<FriendRequestBody>>,
) -> HandlerResult<Value> {
    state.store.send_request(me, &body.username)?;
    Ok(msg(format!("Friend request sent to {}", body.username)))
}

/// GET /friends/requests
pub async fn pending_friend_requests(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> HandlerResult<Vec<FriendRequest>> {
    Ok(Json(state.store.pending_requests(me)))
}

/// POST /friends/accept
pub async fn accept_friend_request(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Api(Json(body)): Api<Json<SettleBody>>,
) -> HandlerResult<Value> {
    state.store.accept_request(me, body.request_id)?;
    Ok(msg("Friend request accepted"))
}

/// POST /friends/reject
pub async fn reject_friend_request(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Api(Json(body)): Api<Json<SettleBody>>,
) -> HandlerResult<Value> {
    state.store.reject_request(me, body.request_id)?;
    Ok(msg("Friend request rejected"))
}

// =============================================================================
// Invites
// =============================================================================

/// POST /invite
pub async fn send_invite(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Api(Json(body)): Api<Json<InviteBody>>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    let location: Location = body.location.parse()?;
    let invite = state
        .store
        .send_invite(me, body.receiver_id, location, state.clock.now())?;
    Ok((StatusCode::CREATED, Json(invite)))
}

/// GET /notifications
pub async fn notifications(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
) -> HandlerResult<Vec<Notification>> {
    Ok(Json(state.store.unread_notifications(me)))
}

/// POST /notifications/read
pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Api(Json(body)): Api<Json<MarkReadBody>>,
) -> HandlerResult<Value> {
    state.store.mark_read(me, body.id)?;
    Ok(msg("Marked as read"))
}
