//! Team accountability operations.
//!
//! Everything here is synchronous and takes the connection it should run on plus the current
//! time, so handlers run it inside `Object::interact` and tests drive it with fixed clocks.
//! Multi-row writes happen inside [`write_transaction`](crate::db::write_transaction).

use std::collections::HashMap;

use rusqlite::Connection;
use shared::{
    api::{
        error::ServerError,
        payloads::{TeamMemberResponse, TeamResponse},
        response_errors::{ActivityError, TeamError},
    },
    geo::Coordinate,
    model::{Goal, Team, TeamMember, User},
    types::Id,
};

mod activity;
pub use activity::*;
mod evaluation;
pub use evaluation::*;
mod goal;
pub use goal::*;
mod gym;
pub use gym::*;
mod report;
pub use report::*;
mod team;
pub use team::*;
mod user;
pub use user::*;
mod vote;
pub use vote::*;

#[cfg(test)]
pub(crate) mod testing;

pub(crate) fn require_team(conn: &Connection, team_id: &Id) -> Result<Team, ServerError> {
    Ok(Team::fetch_maybe(conn, team_id)?.ok_or(TeamError::NotFound)?)
}

pub(crate) fn require_member(
    conn: &Connection,
    team_id: &Id,
    uid: &str,
) -> Result<TeamMember, ServerError> {
    Ok(TeamMember::fetch_membership(conn, team_id, uid)?.ok_or(TeamError::NotMember)?)
}

pub(crate) fn require_valid(coordinate: Coordinate) -> Result<Coordinate, ActivityError> {
    if coordinate.is_valid() {
        Ok(coordinate)
    } else {
        Err(ActivityError::InvalidCoordinates {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        })
    }
}

/// Display names for user ids, looked up once per id
pub(crate) struct UserNames<'c> {
    conn: &'c Connection,
    names: HashMap<String, String>,
}

impl<'c> UserNames<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            names: HashMap::new(),
        }
    }

    /// Profile name, or the id itself for users without a profile
    pub fn name(&mut self, uid: &str) -> Result<String, rusqlite::Error> {
        if let Some(name) = self.names.get(uid) {
            return Ok(name.clone());
        }
        let name = User::fetch_maybe(self.conn, uid)?
            .map(|u| u.name)
            .unwrap_or_else(|| uid.to_string());
        self.names.insert(uid.to_string(), name.clone());
        Ok(name)
    }
}

pub(crate) fn team_response(conn: &Connection, team: Team) -> Result<TeamResponse, ServerError> {
    let mut names = UserNames::new(conn);
    let members = TeamMember::fetch_by_team(conn, &team.id)?
        .into_iter()
        .map(|m| {
            Ok(TeamMemberResponse {
                name: names.name(&m.user_id)?,
                user_id: m.user_id,
                role: m.role,
                joined_at: m.joined_at,
            })
        })
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
    let goal = Goal::fetch_by_team(conn, &team.id)?;

    Ok(TeamResponse::new(team, members, goal))
}
