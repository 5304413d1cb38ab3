use axum::{http::StatusCode, Json};
use chrono::Utc;
use shared::{
    api::{
        error::ServerError,
        payloads::{CreateUserRequest, UpdateUserRequest},
    },
    model::User,
};
use tracing::instrument;

use super::ApiJson;
use crate::{auth::AuthUser, db::DatabaseConnection, engine};

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn create_me(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ServerError> {
    let user = conn
        .interact(move |conn| engine::create_me(conn, &auth.uid, request, Utc::now()))
        .await??;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn get_me(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
) -> Result<Json<User>, ServerError> {
    let user = conn.interact(move |conn| engine::get_me(conn, &auth.uid)).await??;
    Ok(Json(user))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn update_me(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>, ServerError> {
    let user = conn
        .interact(move |conn| engine::update_me(conn, &auth.uid, request, Utc::now()))
        .await??;
    Ok(Json(user))
}
