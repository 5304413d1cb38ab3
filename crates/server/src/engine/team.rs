use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rusqlite::Connection;
use shared::{
    api::{
        error::ServerError,
        payloads::{CreateTeamRequest, InviteCodeResponse, JoinTeamResponse, TeamResponse},
        response_errors::{InviteError, TeamError},
    },
    invite::{new_invite_code, normalize_invite_code},
    model::{
        ExerciseType, InviteCode, Model, Role, Strictness, Team, TeamMember, TeamStatus, User,
        MAX_TEAM_MEMBERS,
    },
    types::Id,
};
use tracing::{debug, info};

use super::{require_member, require_team, team_response};
use crate::db::write_transaction;

/// Fresh codes tried before giving up on finding one that isn't held by a live invite
pub const MAX_CODE_ATTEMPTS: usize = 16;

pub fn create_team(
    conn: &mut Connection,
    uid: &str,
    request: CreateTeamRequest,
    now: DateTime<Utc>,
) -> Result<TeamResponse, ServerError> {
    let name = request.name.trim();
    if name.is_empty() {
        Err(TeamError::Invalid {
            message: "Team name is required".to_string(),
        })?;
    }
    let exercise_type: ExerciseType = request.exercise_type.parse().map_err(|_| TeamError::Invalid {
        message: "exercise_type must be running or gym".to_string(),
    })?;
    let strictness = match request.strictness.trim() {
        "" => Strictness::default(),
        s => s.parse().map_err(|_| TeamError::Invalid {
            message: "strictness must be relaxed, normal or strict".to_string(),
        })?,
    };

    let tx = write_transaction(conn)?;

    if TeamMember::fetch_live_membership(&tx, uid)?.is_some() {
        Err(TeamError::AlreadyInTeam)?;
    }

    let team = Team::new(name.to_string(), exercise_type, strictness, now);
    team.create(&tx)?;
    TeamMember::new(team.id, uid.to_string(), Role::Leader, now).create(&tx)?;

    let response = team_response(&tx, team)?;
    tx.commit()?;

    info!(team_id = %response.id, "Team created");
    Ok(response)
}

pub fn create_invite_code<R: Rng>(
    conn: &mut Connection,
    uid: &str,
    team_id: &Id,
    ttl: Duration,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<InviteCodeResponse, ServerError> {
    let tx = write_transaction(conn)?;

    let team = require_team(&tx, team_id)?;
    require_member(&tx, team_id, uid)?;
    if team.status != TeamStatus::Forming {
        Err(TeamError::NotForming)?;
    }
    let current_member_count = TeamMember::count_by_team(&tx, team_id)?;
    if current_member_count >= MAX_TEAM_MEMBERS {
        Err(TeamError::Full {
            max: MAX_TEAM_MEMBERS,
        })?;
    }

    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = new_invite_code(rng);

        match InviteCode::fetch_maybe(&tx, &code)? {
            Some(existing) if !existing.is_expired(now) => {
                debug!("Invite code collided with a live code, retrying");
                continue;
            }
            // Expired codes give their slot back
            Some(_) => {
                InviteCode::delete(&tx, &code)?;
            }
            None => {}
        }

        let invite = InviteCode {
            code,
            team_id: team.id,
            created_by: uid.to_string(),
            expires_at: now + ttl,
            created_at: now,
        };
        invite.create(&tx)?;
        tx.commit()?;

        return Ok(InviteCodeResponse {
            code: invite.code,
            team_id: team.id,
            team_name: team.name,
            exercise_type: team.exercise_type,
            expires_at: invite.expires_at,
            current_member_count,
        });
    }

    Err(InviteError::Exhausted {
        attempts: MAX_CODE_ATTEMPTS,
    }
    .into())
}

pub fn join_team(
    conn: &mut Connection,
    uid: &str,
    code: &str,
    now: DateTime<Utc>,
) -> Result<JoinTeamResponse, ServerError> {
    let code = normalize_invite_code(code);
    let tx = write_transaction(conn)?;

    let invite = InviteCode::fetch_maybe(&tx, &code)?.ok_or(InviteError::CodeNotFound)?;
    if invite.is_expired(now) {
        Err(InviteError::CodeExpired)?;
    }
    if TeamMember::fetch_live_membership(&tx, uid)?.is_some() {
        Err(TeamError::AlreadyInTeam)?;
    }

    let team = require_team(&tx, &invite.team_id)?;
    let member_count = TeamMember::count_by_team(&tx, &team.id)?;
    if member_count >= MAX_TEAM_MEMBERS {
        Err(TeamError::Full {
            max: MAX_TEAM_MEMBERS,
        })?;
    }
    if team.status != TeamStatus::Forming {
        Err(TeamError::NotForming)?;
    }
    if !User::exists(&tx, uid)? {
        Err(InviteError::UserNotRegistered)?;
    }

    TeamMember::new(team.id, uid.to_string(), Role::Member, now).create(&tx)?;

    let team_ready = member_count + 1 == MAX_TEAM_MEMBERS;
    if team_ready && Team::activate(&tx, &team.id, now)? {
        info!(team_id = %team.id, "Team is full and has started week 1");
    }

    let team = require_team(&tx, &team.id)?;
    let team = team_response(&tx, team)?;
    tx.commit()?;

    Ok(JoinTeamResponse { team, team_ready })
}

/// The caller's forming or active team
pub fn get_my_team(conn: &Connection, uid: &str) -> Result<TeamResponse, ServerError> {
    let membership = TeamMember::fetch_live_membership(conn, uid)?.ok_or(TeamError::NoTeam)?;
    let team = require_team(conn, &membership.team_id)?;
    team_response(conn, team)
}

pub fn get_team(conn: &Connection, uid: &str, team_id: &Id) -> Result<TeamResponse, ServerError> {
    let team = require_team(conn, team_id)?;
    require_member(conn, team_id, uid)?;
    team_response(conn, team)
}

#[cfg(test)]
mod tests {
    use shared::api::error::ErrorKind;

    use super::*;
    use crate::engine::testing::*;

    fn team_request(name: &str, exercise_type: &str, strictness: &str) -> CreateTeamRequest {
        CreateTeamRequest {
            name: name.into(),
            exercise_type: exercise_type.into(),
            strictness: strictness.into(),
        }
    }

    #[test]
    fn create_team_makes_caller_leader() {
        let mut conn = open();
        let team = create_team(&mut conn, "alice", team_request("Runners", "running", ""), t0()).unwrap();

        assert_eq!(team.status, TeamStatus::Forming);
        assert_eq!(team.strictness, Strictness::Normal);
        assert_eq!((team.max_hp, team.current_hp, team.current_week), (100, 100, 0));
        assert_eq!(team.members.len(), 1);
        assert_eq!(team.members[0].role, Role::Leader);
        // No profile yet, so the id stands in for the name
        assert_eq!(team.members[0].name, "alice");
    }

    #[test]
    fn create_team_validates_input() {
        let mut conn = open();
        let e = create_team(&mut conn, "alice", team_request("  ", "running", ""), t0()).unwrap_err();
        assert_eq!(e.kind, ErrorKind::InvalidInput);
        let e = create_team(&mut conn, "alice", team_request("A", "swimming", ""), t0()).unwrap_err();
        assert_eq!(e.kind, ErrorKind::InvalidInput);
        let e = create_team(&mut conn, "alice", team_request("A", "gym", "brutal"), t0()).unwrap_err();
        assert_eq!(e.kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn one_live_team_per_user() {
        let mut conn = open();
        create_team(&mut conn, "alice", team_request("A", "gym", "strict"), t0()).unwrap();
        let e = create_team(&mut conn, "alice", team_request("B", "gym", ""), t0()).unwrap_err();
        assert_eq!(e.code, "already_in_team");
    }

    #[test]
    fn invite_requires_membership() {
        let mut conn = open();
        let team_id = forming_team(&mut conn, "running", "normal");
        let e = create_invite_code(&mut conn, "stranger", &team_id, Duration::hours(24), t0(), &mut rng())
            .unwrap_err();
        assert_eq!(e.kind, ErrorKind::Forbidden);
    }

    #[test]
    fn invite_response_describes_team() {
        let mut conn = open();
        let team_id = forming_team(&mut conn, "running", "normal");
        let invite = create_invite_code(&mut conn, LEADER, &team_id, Duration::hours(24), t0(), &mut rng())
            .unwrap();

        assert_eq!(invite.code.len(), 6);
        assert_eq!(invite.team_name, "Early birds");
        assert_eq!(invite.current_member_count, 1);
        assert_eq!(invite.expires_at, t0() + Duration::hours(24));
    }

    #[test]
    fn colliding_live_code_is_not_reused() {
        let mut conn = open();
        let team_id = forming_team(&mut conn, "running", "normal");
        let first = create_invite_code(&mut conn, LEADER, &team_id, Duration::hours(24), t0(), &mut rng())
            .unwrap();
        // Same seed, so the first draw collides with the live code
        let second = create_invite_code(&mut conn, LEADER, &team_id, Duration::hours(24), t0(), &mut rng())
            .unwrap();
        assert_ne!(first.code, second.code);

        // Once expired, the same draw may take the slot over
        let later = t0() + Duration::hours(25);
        let third = create_invite_code(&mut conn, LEADER, &team_id, Duration::hours(24), later, &mut rng())
            .unwrap();
        assert_eq!(third.code, first.code);
        assert_eq!(InviteCode::fetch_maybe(&conn, &first.code).unwrap().unwrap().expires_at, later + Duration::hours(24));
    }

    #[test]
    fn expired_code_is_gone() {
        let mut conn = open();
        let team_id = forming_team(&mut conn, "running", "normal");
        register(&mut conn, MEMBER_B);
        let invite = create_invite_code(&mut conn, LEADER, &team_id, Duration::hours(24), t0(), &mut rng())
            .unwrap();

        let e = join_team(&mut conn, MEMBER_B, &invite.code, t0() + Duration::hours(25)).unwrap_err();
        assert_eq!(e.kind, ErrorKind::Gone);
        assert_eq!(e.code, "code_expired");

        let e = join_team(&mut conn, MEMBER_B, "ZZZZZZ", t0()).unwrap_err();
        assert_eq!(e.kind, ErrorKind::NotFound);
    }

    #[test]
    fn join_accepts_lowercase_code() {
        let mut conn = open();
        let team_id = forming_team(&mut conn, "running", "normal");
        register(&mut conn, MEMBER_B);
        let invite = create_invite_code(&mut conn, LEADER, &team_id, Duration::hours(24), t0(), &mut rng())
            .unwrap();

        let joined = join_team(&mut conn, MEMBER_B, &format!(" {} ", invite.code.to_lowercase()), t0()).unwrap();
        assert!(!joined.team_ready);
        assert_eq!(joined.team.members.len(), 2);
        assert_eq!(joined.team.members[1].name, "member-b name");
    }

    #[test]
    fn join_requires_profile() {
        let mut conn = open();
        let team_id = forming_team(&mut conn, "running", "normal");
        let invite = create_invite_code(&mut conn, LEADER, &team_id, Duration::hours(24), t0(), &mut rng())
            .unwrap();

        let e = join_team(&mut conn, "ghost", &invite.code, t0()).unwrap_err();
        assert_eq!(e.code, "user_not_registered");
        assert_eq!(e.kind, ErrorKind::Unprocessable);
    }

    #[test]
    fn third_member_activates_team_and_fourth_is_refused() {
        let mut conn = open();
        let team_id = forming_team(&mut conn, "gym", "relaxed");
        for uid in [MEMBER_B, MEMBER_C, "member-d"] {
            register(&mut conn, uid);
        }
        let invite = create_invite_code(&mut conn, LEADER, &team_id, Duration::hours(24), t0(), &mut rng())
            .unwrap();

        assert!(!join_team(&mut conn, MEMBER_B, &invite.code, t0()).unwrap().team_ready);
        let joined = join_team(&mut conn, MEMBER_C, &invite.code, t0() + Duration::minutes(5)).unwrap();
        assert!(joined.team_ready);
        assert_eq!(joined.team.status, TeamStatus::Active);
        assert_eq!(joined.team.current_week, 1);
        assert_eq!(joined.team.started_at, Some(t0() + Duration::minutes(5)));

        let e = join_team(&mut conn, "member-d", &invite.code, t0() + Duration::minutes(6)).unwrap_err();
        assert_eq!(e.code, "team_full");
        assert_eq!(TeamMember::count_by_team(&conn, &team_id).unwrap(), 3);
    }

    #[test]
    fn member_of_live_team_cannot_join_another() {
        let mut conn = open();
        let team_id = forming_team(&mut conn, "gym", "relaxed");
        register(&mut conn, MEMBER_B);
        create_team(&mut conn, MEMBER_B, team_request("Other", "gym", ""), t0()).unwrap();
        let invite = create_invite_code(&mut conn, LEADER, &team_id, Duration::hours(24), t0(), &mut rng())
            .unwrap();

        let e = join_team(&mut conn, MEMBER_B, &invite.code, t0()).unwrap_err();
        assert_eq!(e.kind, ErrorKind::Conflict);
    }

    #[test]
    fn team_reads_check_membership() {
        let mut conn = open();
        let team_id = forming_team(&mut conn, "running", "normal");

        assert_eq!(get_my_team(&conn, LEADER).unwrap().id, team_id);
        assert_eq!(get_my_team(&conn, "stranger").unwrap_err().code, "no_team");
        assert_eq!(get_team(&conn, "stranger", &team_id).unwrap_err().kind, ErrorKind::Forbidden);
        assert_eq!(get_team(&conn, LEADER, &Id::new()).unwrap_err().kind, ErrorKind::NotFound);
    }
}
