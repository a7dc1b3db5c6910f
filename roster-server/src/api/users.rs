use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;

use super::dto::{SetIsActiveRequest, UserQuery, UserResponse, UserReviewsResponse};
use super::{ApiErr, AppState};

pub(super) async fn set_is_active(
    State(state): State<AppState>,
    body: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiErr> {
    let Json(req) = body?;
    let user = state
        .service
        .set_user_active(&req.user_id, req.is_active)
        .await?;
    Ok(Json(UserResponse { user: user.into() }))
}

pub(super) async fn get_review(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<UserReviewsResponse>, ApiErr> {
    let Query(query) = query?;
    let reviews = state.service.get_user_reviews(&query.user_id).await?;
    Ok(Json(UserReviewsResponse {
        user_id: query.user_id,
        pull_requests: reviews.into_iter().map(Into::into).collect(),
    }))
}
