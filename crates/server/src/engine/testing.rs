use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{rngs::StdRng, SeedableRng};
use rusqlite::Connection;
use shared::{
    api::payloads::{CreateTeamRequest, CreateUserRequest, GoalRequest},
    model::{Team, TeamStatus},
    types::Id,
};

use super::*;
use crate::db;

pub const LEADER: &str = "leader";
pub const MEMBER_B: &str = "member-b";
pub const MEMBER_C: &str = "member-c";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()
}

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

pub fn open() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::migrate(&mut conn).unwrap();
    conn
}

pub fn register(conn: &mut Connection, uid: &str) {
    create_me(
        conn,
        uid,
        CreateUserRequest {
            name: format!("{uid} name"),
            age: 30,
            gender: None,
            weight: None,
            chronotype: None,
        },
        t0(),
    )
    .unwrap();
}

pub fn forming_team(conn: &mut Connection, exercise_type: &str, strictness: &str) -> Id {
    register(conn, LEADER);
    let team = create_team(
        conn,
        LEADER,
        CreateTeamRequest {
            name: "Early birds".into(),
            exercise_type: exercise_type.into(),
            strictness: strictness.into(),
        },
        t0() - Duration::hours(1),
    )
    .unwrap();
    team.id
}

pub fn join(conn: &mut Connection, team_id: &Id, uid: &str, now: DateTime<Utc>) -> bool {
    let invite = create_invite_code(conn, LEADER, team_id, Duration::hours(24), now, &mut rng()).unwrap();
    join_team(conn, uid, &invite.code, now).unwrap().team_ready
}

/// Three registered members, activated by the last join at [`t0`], with the given goal
pub fn active_team(conn: &mut Connection, exercise_type: &str, strictness: &str, goal: GoalRequest) -> Team {
    let team_id = forming_team(conn, exercise_type, strictness);
    register(conn, MEMBER_B);
    register(conn, MEMBER_C);
    join(conn, &team_id, MEMBER_B, t0() - Duration::minutes(30));
    assert!(join(conn, &team_id, MEMBER_C, t0()));
    create_goal(conn, LEADER, &team_id, goal, t0()).unwrap();

    let team = Team::fetch_maybe(conn, &team_id).unwrap().unwrap();
    assert_eq!(team.status, TeamStatus::Active);
    team
}

pub fn running_goal(km: f64) -> GoalRequest {
    GoalRequest {
        target_distance_km: Some(km),
        ..Default::default()
    }
}

/// Registers a gym with the default 100 m radius
pub fn gym_at(conn: &mut Connection, uid: &str, latitude: f64, longitude: f64) -> Id {
    create_gym_location(
        conn,
        uid,
        shared::api::payloads::CreateGymLocationRequest {
            name: "Corner gym".into(),
            latitude,
            longitude,
            radius_m: shared::api::payloads::DEFAULT_GYM_RADIUS_M,
        },
        t0() - Duration::days(1),
    )
    .unwrap()
    .id
}
