//! Trip participation endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use serde::Deserialize;
use tobaeki_common::AppResult;
use tobaeki_core::LedgerStore;
use tobaeki_db::entities::{participant, participation_request};
use validator::Validate;

use super::PageQuery;
use crate::{middleware::AppState, response::ApiResponse};

/// Participation request body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateParticipationRequest {
    #[validate(range(min = 1))]
    pub post_id: i64,

    #[validate(range(min = 1))]
    pub requester_id: i64,
}

/// Ask to join a post.
async fn create_request<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Json(req): Json<CreateParticipationRequest>,
) -> AppResult<ApiResponse<participation_request::Model>> {
    req.validate()?;

    let request = state
        .engine
        .participation()
        .create_request(req.post_id, req.requester_id)
        .await?;
    Ok(ApiResponse::created(request))
}

/// Accept a participation request.
async fn accept_request<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(request_id): Path<i64>,
) -> AppResult<ApiResponse<participant::Model>> {
    let participant = state
        .engine
        .participation()
        .accept_request(request_id)
        .await?;
    Ok(ApiResponse::created(participant))
}

/// Decline or withdraw a participation request.
async fn decline_request<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(request_id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state
        .engine
        .participation()
        .decline_request(request_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Get the participants of a post.
async fn list_participants<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(post_id): Path<i64>,
) -> AppResult<ApiResponse<Vec<participant::Model>>> {
    let participants = state
        .engine
        .participation()
        .list_participants(post_id)
        .await?;
    Ok(ApiResponse::ok(participants))
}

/// Get the pending requests for a post.
async fn list_requests<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(post_id): Path<i64>,
) -> AppResult<ApiResponse<Vec<participation_request::Model>>> {
    let requests = state
        .engine
        .participation()
        .list_requests(post_id)
        .await?;
    Ok(ApiResponse::ok(requests))
}

/// Get the posts a user participates in.
async fn list_participations<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<participant::Model>>> {
    query.validate()?;

    let participations = state
        .engine
        .participation()
        .list_participations(user_id, query.to_page())
        .await?;
    Ok(ApiResponse::ok(participations))
}

/// Leave a post.
async fn cancel_participation<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(participant_id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state
        .engine
        .participation()
        .cancel_participation(participant_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Participation routes.
pub fn router<S: LedgerStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/request", post(create_request::<S>))
        .route("/request/{requestId}/accept", post(accept_request::<S>))
        .route("/request/{requestId}/decline", delete(decline_request::<S>))
        .route("/post/{postId}", get(list_participants::<S>))
        .route("/post/{postId}/requests", get(list_requests::<S>))
        .route("/user/{userId}", get(list_participations::<S>))
        .route("/{id}", delete(cancel_participation::<S>))
}
