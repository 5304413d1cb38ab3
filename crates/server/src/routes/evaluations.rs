use axum::{extract::Path, Json};
use chrono::Utc;
use shared::api::{
    error::ServerError,
    payloads::{
        CurrentWeekEvaluationResponse, EvaluationQuery, PredictionResponse, TeamStatusResponse,
        WeeklyEvaluationResponse,
    },
    response_errors::TeamError,
};
use tracing::instrument;

use super::{parse_id, ApiQuery};
use crate::{auth::AuthUser, db::DatabaseConnection, engine};

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn list_evaluations(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(team_id): Path<String>,
    ApiQuery(query): ApiQuery<EvaluationQuery>,
) -> Result<Json<Vec<WeeklyEvaluationResponse>>, ServerError> {
    let team_id = parse_id(&team_id, TeamError::NotFound)?;
    let evaluations = conn
        .interact(move |conn| engine::list_evaluations(conn, &auth.uid, &team_id, query.week))
        .await??;
    Ok(Json(evaluations))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn current_week(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(team_id): Path<String>,
) -> Result<Json<CurrentWeekEvaluationResponse>, ServerError> {
    let team_id = parse_id(&team_id, TeamError::NotFound)?;
    let week = conn
        .interact(move |conn| engine::current_week(conn, &auth.uid, &team_id, Utc::now()))
        .await??;
    Ok(Json(week))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn team_status(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(team_id): Path<String>,
) -> Result<Json<TeamStatusResponse>, ServerError> {
    let team_id = parse_id(&team_id, TeamError::NotFound)?;
    let status = conn
        .interact(move |conn| engine::team_status(conn, &auth.uid, &team_id))
        .await??;
    Ok(Json(status))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn my_prediction(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
) -> Result<Json<PredictionResponse>, ServerError> {
    let prediction = conn
        .interact(move |conn| engine::my_prediction(conn, &auth.uid, Utc::now()))
        .await??;
    Ok(Json(prediction))
}
