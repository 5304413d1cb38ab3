use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use shared::{
    api::{
        error::ServerError,
        payloads::{
            CreateTeamRequest, DisbandVoteResponse, GoalRequest, InviteCodeResponse, JoinTeamRequest,
            JoinTeamResponse, TeamResponse,
        },
        response_errors::TeamError,
    },
    model::Goal,
};
use tracing::instrument;

use super::{parse_id, ApiJson};
use crate::{auth::AuthUser, cli::Cli, db::DatabaseConnection, engine};

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn create_team(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    ApiJson(request): ApiJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ServerError> {
    let team = conn
        .interact(move |conn| engine::create_team(conn, &auth.uid, request, Utc::now()))
        .await??;
    Ok((StatusCode::CREATED, Json(team)))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn get_my_team(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
) -> Result<Json<TeamResponse>, ServerError> {
    let team = conn.interact(move |conn| engine::get_my_team(conn, &auth.uid)).await??;
    Ok(Json(team))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn get_team(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(team_id): Path<String>,
) -> Result<Json<TeamResponse>, ServerError> {
    let team_id = parse_id(&team_id, TeamError::NotFound)?;
    let team = conn
        .interact(move |conn| engine::get_team(conn, &auth.uid, &team_id))
        .await??;
    Ok(Json(team))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn create_invite_code(
    auth: AuthUser,
    State(args): State<Arc<Cli>>,
    DatabaseConnection(conn): DatabaseConnection,
    Path(team_id): Path<String>,
) -> Result<(StatusCode, Json<InviteCodeResponse>), ServerError> {
    let team_id = parse_id(&team_id, TeamError::NotFound)?;
    let ttl = args.invite_code_ttl();
    let invite = conn
        .interact(move |conn| {
            engine::create_invite_code(conn, &auth.uid, &team_id, ttl, Utc::now(), &mut rand::thread_rng())
        })
        .await??;
    Ok((StatusCode::CREATED, Json(invite)))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn join_team(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    ApiJson(request): ApiJson<JoinTeamRequest>,
) -> Result<Json<JoinTeamResponse>, ServerError> {
    let joined = conn
        .interact(move |conn| engine::join_team(conn, &auth.uid, &request.code, Utc::now()))
        .await??;
    Ok(Json(joined))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn create_goal(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(team_id): Path<String>,
    ApiJson(request): ApiJson<GoalRequest>,
) -> Result<(StatusCode, Json<Goal>), ServerError> {
    let team_id = parse_id(&team_id, TeamError::NotFound)?;
    let goal = conn
        .interact(move |conn| engine::create_goal(conn, &auth.uid, &team_id, request, Utc::now()))
        .await??;
    Ok((StatusCode::CREATED, Json(goal)))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn update_goal(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(team_id): Path<String>,
    ApiJson(request): ApiJson<GoalRequest>,
) -> Result<Json<Goal>, ServerError> {
    let team_id = parse_id(&team_id, TeamError::NotFound)?;
    let goal = conn
        .interact(move |conn| engine::update_goal(conn, &auth.uid, &team_id, request, Utc::now()))
        .await??;
    Ok(Json(goal))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn get_goal(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(team_id): Path<String>,
) -> Result<Json<Goal>, ServerError> {
    let team_id = parse_id(&team_id, TeamError::NotFound)?;
    let goal = conn
        .interact(move |conn| engine::get_goal(conn, &auth.uid, &team_id))
        .await??;
    Ok(Json(goal))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn vote_disband(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(team_id): Path<String>,
) -> Result<Json<DisbandVoteResponse>, ServerError> {
    let team_id = parse_id(&team_id, TeamError::NotFound)?;
    let votes = conn
        .interact(move |conn| engine::vote_disband(conn, &auth.uid, &team_id, Utc::now()))
        .await??;
    Ok(Json(votes))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn cancel_disband_vote(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(team_id): Path<String>,
) -> Result<Json<DisbandVoteResponse>, ServerError> {
    let team_id = parse_id(&team_id, TeamError::NotFound)?;
    let votes = conn
        .interact(move |conn| engine::cancel_disband_vote(conn, &auth.uid, &team_id))
        .await??;
    Ok(Json(votes))
}

#[instrument(skip_all, fields(uid = %auth.uid))]
pub async fn get_disband_votes(
    auth: AuthUser,
    DatabaseConnection(conn): DatabaseConnection,
    Path(team_id): Path<String>,
) -> Result<Json<DisbandVoteResponse>, ServerError> {
    let team_id = parse_id(&team_id, TeamError::NotFound)?;
    let votes = conn
        .interact(move |conn| engine::get_disband_votes(conn, &auth.uid, &team_id))
        .await??;
    Ok(Json(votes))
}
