use axum::{extract::Path, http::StatusCode, Json};
use chrono::Utc;
use shared::{
    api::{error::ServerError, payloads::CreateGymLocationRequest, response_errors::GymError},
    model::GymLocation,
};
use tracing::instrument;

use super::{parse_id, ApiJson};
use crate::{auth::AuthUser, db::DatabaseConnection, engine};

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn list_gym_locations(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
) -> Result<Json<Vec<GymLocation>>, ServerError> {
    let gyms = conn
        .interact(move |conn| engine::list_gym_locations(conn, &auth.uid))
        .await??;
    Ok(Json(gyms))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn create_gym_location(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    ApiJson(request): ApiJson<CreateGymLocationRequest>,
) -> Result<(StatusCode, Json<GymLocation>), ServerError> {
    let gym = conn
        .interact(move |conn| engine::create_gym_location(conn, &auth.uid, request, Utc::now()))
        .await??;
    Ok((StatusCode::CREATED, Json(gym)))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn delete_gym_location(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(gym_location_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let gym_location_id = parse_id(&gym_location_id, GymError::NotFound)?;
    conn.interact(move |conn| engine::delete_gym_location(conn, &auth.uid, &gym_location_id))
        .await??;
    Ok(StatusCode::NO_CONTENT)
}
