use chrono::{DateTime, Utc};
use rusqlite::Connection;
use shared::{
    api::{
        error::ServerError,
        payloads::DisbandVoteResponse,
        response_errors::{TeamError, VoteError},
    },
    model::{DisbandVote, Model, Team, TeamMember, TeamStatus},
    types::Id,
};
use tracing::info;

use super::{require_member, require_team};
use crate::db::write_transaction;

fn require_live_team(conn: &Connection, team_id: &Id, uid: &str) -> Result<Team, ServerError> {
    let team = require_team(conn, team_id)?;
    if !team.status.is_live() {
        Err(TeamError::Closed {
            status: team.status.to_string(),
        })?;
    }
    require_member(conn, team_id, uid)?;
    Ok(team)
}

fn tally(conn: &Connection, team_id: &Id, disbanded: bool) -> Result<DisbandVoteResponse, rusqlite::Error> {
    let voted_users: Vec<String> = DisbandVote::fetch_by_team(conn, team_id)?
        .into_iter()
        .map(|v| v.user_id)
        .collect();
    Ok(DisbandVoteResponse {
        team_id: *team_id,
        total_count: TeamMember::count_by_team(conn, team_id)?,
        voted_count: voted_users.len() as i64,
        voted_users,
        disbanded,
    })
}

/// Releases every member and closes the team for good
pub(crate) fn disband(conn: &Connection, team_id: &Id, now: DateTime<Utc>) -> Result<(), rusqlite::Error> {
    Team::set_status(conn, team_id, TeamStatus::Disbanded, now)?;
    DisbandVote::delete_by_team(conn, team_id)?;
    TeamMember::delete_by_team(conn, team_id)?;
    Ok(())
}

/// Records the caller's vote. The team disbands once every member has voted.
pub fn vote_disband(
    conn: &mut Connection,
    uid: &str,
    team_id: &Id,
    now: DateTime<Utc>,
) -> Result<DisbandVoteResponse, ServerError> {
    let tx = write_transaction(conn)?;

    require_live_team(&tx, team_id, uid)?;
    if DisbandVote::fetch_maybe(&tx, team_id, uid)?.is_some() {
        Err(VoteError::AlreadyVoted)?;
    }

    DisbandVote {
        id: Id::new(),
        team_id: *team_id,
        user_id: uid.to_string(),
        created_at: now,
    }
    .create(&tx)?;

    let mut response = tally(&tx, team_id, false)?;
    if response.voted_count >= response.total_count {
        disband(&tx, team_id, now)?;
        response.disbanded = true;
        info!(team_id = %team_id, "Team disbanded by unanimous vote");
    }
    tx.commit()?;

    Ok(response)
}

pub fn cancel_disband_vote(
    conn: &mut Connection,
    uid: &str,
    team_id: &Id,
) -> Result<DisbandVoteResponse, ServerError> {
    let tx = write_transaction(conn)?;

    require_live_team(&tx, team_id, uid)?;
    if DisbandVote::delete(&tx, team_id, uid)? == 0 {
        Err(VoteError::NotFound)?;
    }

    let response = tally(&tx, team_id, false)?;
    tx.commit()?;

    Ok(response)
}

pub fn get_disband_votes(conn: &Connection, uid: &str, team_id: &Id) -> Result<DisbandVoteResponse, ServerError> {
    require_live_team(conn, team_id, uid)?;
    Ok(tally(conn, team_id, false)?)
}
