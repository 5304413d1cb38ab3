use axum::{extract::Path, http::StatusCode, Json};
use chrono::Utc;
use shared::{
    api::{
        error::ServerError,
        payloads::{
            ActivityListQuery, ActivityResponse, GymCheckinRequest, PositionRequest, SendGpsPointsRequest,
            SendGpsPointsResponse,
        },
        response_errors::{ActivityError, TeamError},
    },
    model::Activity,
};
use tracing::instrument;

use super::{parse_id, ApiJson, ApiQuery};
use crate::{auth::AuthUser, db::DatabaseConnection, engine};

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn start_running(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    ApiJson(request): ApiJson<PositionRequest>,
) -> Result<(StatusCode, Json<ActivityResponse>), ServerError> {
    let activity = conn
        .interact(move |conn| engine::start_running(conn, &auth.uid, request, Utc::now()))
        .await??;
    Ok((StatusCode::CREATED, Json(activity)))
}

#[instrument(skip_all, fields(uid = %auth.uid, points = request.points.len()))]
pub async fn send_gps_points(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(activity_id): Path<String>,
    ApiJson(request): ApiJson<SendGpsPointsRequest>,
) -> Result<Json<SendGpsPointsResponse>, ServerError> {
    let activity_id = parse_id(&activity_id, ActivityError::NotFound)?;
    let saved = conn
        .interact(move |conn| engine::send_gps_points(conn, &auth.uid, &activity_id, request, Utc::now()))
        .await??;
    Ok(Json(saved))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn finish_running(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(activity_id): Path<String>,
    ApiJson(request): ApiJson<PositionRequest>,
) -> Result<Json<ActivityResponse>, ServerError> {
    let activity_id = parse_id(&activity_id, ActivityError::NotFound)?;
    let activity = conn
        .interact(move |conn| engine::finish_running(conn, &auth.uid, &activity_id, request, Utc::now()))
        .await??;
    Ok(Json(activity))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn gym_checkin(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    ApiJson(request): ApiJson<GymCheckinRequest>,
) -> Result<(StatusCode, Json<Activity>), ServerError> {
    let activity = conn
        .interact(move |conn| engine::gym_checkin(conn, &auth.uid, request, Utc::now()))
        .await??;
    Ok((StatusCode::CREATED, Json(activity)))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn gym_checkout(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(activity_id): Path<String>,
    ApiJson(request): ApiJson<PositionRequest>,
) -> Result<Json<Activity>, ServerError> {
    let activity_id = parse_id(&activity_id, ActivityError::NotFound)?;
    let activity = conn
        .interact(move |conn| engine::gym_checkout(conn, &auth.uid, &activity_id, request, Utc::now()))
        .await??;
    Ok(Json(activity))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn get_activity(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(activity_id): Path<String>,
) -> Result<Json<ActivityResponse>, ServerError> {
    let activity_id = parse_id(&activity_id, ActivityError::NotFound)?;
    let activity = conn
        .interact(move |conn| engine::get_activity(conn, &auth.uid, &activity_id))
        .await??;
    Ok(Json(activity))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn list_my_activities(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    ApiQuery(query): ApiQuery<ActivityListQuery>,
) -> Result<Json<Vec<Activity>>, ServerError> {
    let activities = conn
        .interact(move |conn| engine::list_my_activities(conn, &auth.uid, query.limit))
        .await??;
    Ok(Json(activities))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn list_team_activities(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(team_id): Path<String>,
    ApiQuery(query): ApiQuery<ActivityListQuery>,
) -> Result<Json<Vec<Activity>>, ServerError> {
    let team_id = parse_id(&team_id, TeamError::NotFound)?;
    let activities = conn
        .interact(move |conn| engine::list_team_activities(conn, &auth.uid, &team_id, query.limit))
        .await??;
    Ok(Json(activities))
}
