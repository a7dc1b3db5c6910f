use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::dto::{TeamDto, TeamQuery, TeamResponse};
use super::{ApiErr, AppState};

pub(super) async fn add_team(
    State(state): State<AppState>,
    body: Result<Json<TeamDto>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiErr> {
    let Json(team) = body?;
    let team = state.service.create_team(team.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(TeamResponse { team: team.into() }),
    ))
}

pub(super) async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<TeamDto>, ApiErr> {
    let Query(query) = query?;
    let team = state.service.get_team(&query.team_name).await?;
    Ok(Json(team.into()))
}
