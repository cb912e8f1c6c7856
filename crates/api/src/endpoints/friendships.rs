//! Friendship endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use serde::Deserialize;
use tobaeki_common::AppResult;
use tobaeki_core::{Friend, LedgerStore};
use tobaeki_db::entities::{friend_request, friendship, user_block};
use validator::Validate;

use super::PageQuery;
use crate::{middleware::AppState, response::ApiResponse};

/// Send friend request body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFriendRequest {
    #[validate(range(min = 1))]
    pub requester_id: i64,

    #[validate(range(min = 1))]
    pub addressee_id: i64,
}

/// Block or unblock body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlockUserRequest {
    #[validate(range(min = 1))]
    pub blocker_id: i64,

    #[validate(range(min = 1))]
    pub blocked_id: i64,
}

/// Send a friend request.
async fn send_request<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Json(req): Json<CreateFriendRequest>,
) -> AppResult<ApiResponse<friend_request::Model>> {
    req.validate()?;

    let request = state
        .engine
        .friendships()
        .send_request(req.requester_id, req.addressee_id)
        .await?;
    Ok(ApiResponse::created(request))
}

/// Accept a friend request.
async fn accept_request<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(request_id): Path<i64>,
) -> AppResult<ApiResponse<friendship::Model>> {
    let friendship = state
        .engine
        .friendships()
        .accept_request(request_id)
        .await?;
    Ok(ApiResponse::created(friendship))
}

/// Decline or cancel a friend request.
async fn decline_request<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(request_id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state
        .engine
        .friendships()
        .decline_request(request_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Delete a friendship.
async fn delete_friendship<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(friendship_id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state
        .engine
        .friendships()
        .delete_friendship(friendship_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Block a user.
async fn block_user<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Json(req): Json<BlockUserRequest>,
) -> AppResult<ApiResponse<user_block::Model>> {
    req.validate()?;

    let block = state
        .engine
        .friendships()
        .block_user(req.blocker_id, req.blocked_id)
        .await?;
    Ok(ApiResponse::created(block))
}

/// Unblock a user.
async fn unblock_user<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Json(req): Json<BlockUserRequest>,
) -> AppResult<ApiResponse<()>> {
    req.validate()?;

    state
        .engine
        .friendships()
        .unblock_user(req.blocker_id, req.blocked_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Get users blocked by a user.
async fn list_blocked<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<user_block::Model>>> {
    query.validate()?;

    let blocks = state
        .engine
        .blocking()
        .list_blocked(user_id, query.to_page())
        .await?;
    Ok(ApiResponse::ok(blocks))
}

/// Get all friends of a user.
async fn list_friends<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<i64>,
) -> AppResult<ApiResponse<Vec<Friend>>> {
    let friends = state.engine.friendships().list_friends(user_id).await?;
    Ok(ApiResponse::ok(friends))
}

/// Get friend requests a user has sent.
async fn sent_requests<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<friend_request::Model>>> {
    query.validate()?;

    let requests = state
        .engine
        .friendships()
        .sent_requests(user_id, query.to_page())
        .await?;
    Ok(ApiResponse::ok(requests))
}

/// Get friend requests a user has received.
async fn received_requests<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<friend_request::Model>>> {
    query.validate()?;

    let requests = state
        .engine
        .friendships()
        .received_requests(user_id, query.to_page())
        .await?;
    Ok(ApiResponse::ok(requests))
}

/// Friendship and block routes.
pub fn router<S: LedgerStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/request", post(send_request::<S>))
        .route("/request/{requestId}/accept", post(accept_request::<S>))
        .route("/request/{requestId}/decline", delete(decline_request::<S>))
        .route("/{friendshipId}/delete", delete(delete_friendship::<S>))
        .route("/block", post(block_user::<S>))
        .route("/unblock", post(unblock_user::<S>))
        .route("/blocks/{userId}", get(list_blocked::<S>))
        .route("/user/{userId}", get(list_friends::<S>))
        .route("/requests/sent/{userId}", get(sent_requests::<S>))
        .route("/requests/received/{userId}", get(received_requests::<S>))
}
