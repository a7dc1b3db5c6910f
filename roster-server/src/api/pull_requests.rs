use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::dto::{
    CreatePullRequest, MergePullRequest, PullRequestResponse, ReassignRequest, ReassignResponse,
};
use super::{ApiErr, AppState};

pub(super) async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreatePullRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestResponse>), ApiErr> {
    let Json(req) = body?;
    let pr = state
        .service
        .create_pull_request(&req.pull_request_id, &req.pull_request_name, &req.author_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(PullRequestResponse { pr: pr.into() }),
    ))
}

pub(super) async fn merge(
    State(state): State<AppState>,
    body: Result<Json<MergePullRequest>, JsonRejection>,
) -> Result<Json<PullRequestResponse>, ApiErr> {
    let Json(req) = body?;
    let pr = state.service.merge_pull_request(&req.pull_request_id).await?;
    Ok(Json(PullRequestResponse { pr: pr.into() }))
}

pub(super) async fn reassign(
    State(state): State<AppState>,
    body: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<ReassignResponse>, ApiErr> {
    let Json(req) = body?;
    let (pr, replaced_by) = state
        .service
        .reassign_reviewer(&req.pull_request_id, &req.old_user_id)
        .await?;
    Ok(Json(ReassignResponse {
        pr: pr.into(),
        replaced_by,
    }))
}
