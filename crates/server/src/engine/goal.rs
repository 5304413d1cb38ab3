use chrono::{DateTime, Utc};
use rusqlite::Connection;
use shared::{
    api::{
        error::ServerError,
        payloads::GoalRequest,
        response_errors::{GoalError, TeamError},
    },
    model::{ExerciseType, Goal, Model, Role, Team, TeamMember, MAX_TEAM_MEMBERS},
    types::Id,
};
use tracing::info;

use super::{require_member, require_team};
use crate::db::write_transaction;

/// Targets that apply to the team's exercise type. Fields for the other type are dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Targets {
    distance_km: Option<f64>,
    visits_per_week: Option<i64>,
    min_duration_min: Option<i64>,
}

fn invalid(message: &str) -> GoalError {
    GoalError::Invalid {
        message: message.to_string(),
    }
}

fn validate_targets(exercise_type: ExerciseType, request: &GoalRequest) -> Result<Targets, GoalError> {
    match exercise_type {
        ExerciseType::Running => match request.target_distance_km {
            Some(km) if km.is_finite() && km > 0.0 => Ok(Targets {
                distance_km: Some(km),
                visits_per_week: None,
                min_duration_min: None,
            }),
            _ => Err(invalid("target_distance_km must be greater than 0 for running teams")),
        },
        ExerciseType::Gym => {
            let visits = match request.target_visits_per_week {
                Some(visits) if visits > 0 => visits,
                _ => return Err(invalid("target_visits_per_week must be greater than 0 for gym teams")),
            };
            if request.target_min_duration_min.is_some_and(|min| min <= 0) {
                return Err(invalid("target_min_duration_min must be greater than 0"));
            }
            Ok(Targets {
                distance_km: None,
                visits_per_week: Some(visits),
                min_duration_min: request.target_min_duration_min,
            })
        }
    }
}

fn require_leader(conn: &Connection, team_id: &Id, uid: &str) -> Result<Team, ServerError> {
    let team = require_team(conn, team_id)?;
    let member = require_member(conn, team_id, uid)?;
    if member.role != Role::Leader {
        Err(TeamError::NotLeader)?;
    }
    Ok(team)
}

/// Sets the team's goal and starts week 1 if the team hasn't started yet
pub fn create_goal(
    conn: &mut Connection,
    uid: &str,
    team_id: &Id,
    request: GoalRequest,
    now: DateTime<Utc>,
) -> Result<Goal, ServerError> {
    let tx = write_transaction(conn)?;

    let team = require_leader(&tx, team_id, uid)?;
    if TeamMember::count_by_team(&tx, team_id)? != MAX_TEAM_MEMBERS {
        Err(TeamError::NotReady {
            max: MAX_TEAM_MEMBERS,
        })?;
    }
    if Goal::fetch_by_team(&tx, team_id)?.is_some() {
        Err(GoalError::AlreadyExists)?;
    }
    let targets = validate_targets(team.exercise_type, &request)?;

    let goal = Goal {
        id: Id::new(),
        team_id: team.id,
        exercise_type: team.exercise_type,
        target_distance_km: targets.distance_km,
        target_visits_per_week: targets.visits_per_week,
        target_min_duration_min: targets.min_duration_min,
        created_at: now,
        updated_at: now,
    };
    goal.create(&tx)?;

    if Team::activate(&tx, team_id, now)? {
        info!(team_id = %team_id, "Goal set, team has started week 1");
    }
    tx.commit()?;

    Ok(goal)
}

pub fn update_goal(
    conn: &mut Connection,
    uid: &str,
    team_id: &Id,
    request: GoalRequest,
    now: DateTime<Utc>,
) -> Result<Goal, ServerError> {
    let tx = write_transaction(conn)?;

    let team = require_leader(&tx, team_id, uid)?;
    let mut goal = Goal::fetch_by_team(&tx, team_id)?.ok_or(GoalError::NotFound)?;
    let targets = validate_targets(team.exercise_type, &request)?;

    goal.target_distance_km = targets.distance_km;
    goal.target_visits_per_week = targets.visits_per_week;
    goal.target_min_duration_min = targets.min_duration_min;
    goal.updated_at = now;
    goal.update(&tx)?;
    tx.commit()?;

    Ok(goal)
}

pub fn get_goal(conn: &Connection, uid: &str, team_id: &Id) -> Result<Goal, ServerError> {
    require_team(conn, team_id)?;
    require_member(conn, team_id, uid)?;
    Ok(Goal::fetch_by_team(conn, team_id)?.ok_or(GoalError::NotFound)?)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use shared::{api::error::ErrorKind, model::TeamStatus};

    use super::*;
    use crate::engine::testing::*;

    fn gym_goal(visits: i64, min_duration: Option<i64>) -> GoalRequest {
        GoalRequest {
            target_visits_per_week: Some(visits),
            target_min_duration_min: min_duration,
            ..Default::default()
        }
    }

    #[test]
    fn goal_needs_a_full_team_and_the_leader() {
        let mut conn = open();
        let team_id = forming_team(&mut conn, "running", "normal");

        let e = create_goal(&mut conn, LEADER, &team_id, running_goal(10.0), t0()).unwrap_err();
        assert_eq!(e.code, "team_not_ready");

        register(&mut conn, MEMBER_B);
        join(&mut conn, &team_id, MEMBER_B, t0());
        let e = create_goal(&mut conn, MEMBER_B, &team_id, running_goal(10.0), t0()).unwrap_err();
        assert_eq!(e.kind, ErrorKind::Forbidden);
        assert_eq!(e.code, "not_leader");
    }

    #[test]
    fn goal_validation_follows_exercise_type() {
        assert!(validate_targets(ExerciseType::Running, &running_goal(0.0)).is_err());
        assert!(validate_targets(ExerciseType::Running, &gym_goal(3, None)).is_err());
        assert!(validate_targets(ExerciseType::Gym, &gym_goal(0, None)).is_err());
        assert!(validate_targets(ExerciseType::Gym, &gym_goal(3, Some(0))).is_err());

        let targets = validate_targets(
            ExerciseType::Gym,
            &GoalRequest {
                target_distance_km: Some(5.0),
                target_visits_per_week: Some(3),
                target_min_duration_min: Some(30),
            },
        )
        .unwrap();
        assert_eq!(targets.distance_km, None);
        assert_eq!(targets.visits_per_week, Some(3));
        assert_eq!(targets.min_duration_min, Some(30));
    }

    #[test]
    fn goal_on_started_team_keeps_start_time() {
        let mut conn = open();
        let team = active_team(&mut conn, "running", "normal", running_goal(15.0));
        assert_eq!(team.started_at, Some(t0()));
        assert_eq!(team.current_week, 1);

        let e = create_goal(&mut conn, LEADER, &team.id, running_goal(20.0), t0() + Duration::hours(2))
            .unwrap_err();
        assert_eq!(e.kind, ErrorKind::Conflict);

        let team = Team::fetch_maybe(&conn, &team.id).unwrap().unwrap();
        assert_eq!(team.status, TeamStatus::Active);
        assert_eq!(team.started_at, Some(t0()));
    }

    #[test]
    fn activation_happens_once() {
        let mut conn = open();
        let team = active_team(&mut conn, "gym", "normal", gym_goal(3, None));
        assert!(!Team::activate(&conn, &team.id, t0() + Duration::days(1)).unwrap());
        let team = Team::fetch_maybe(&conn, &team.id).unwrap().unwrap();
        assert_eq!(team.started_at, Some(t0()));
    }

    #[test]
    fn update_replaces_targets() {
        let mut conn = open();
        let team = active_team(&mut conn, "gym", "normal", gym_goal(3, Some(30)));

        let goal = update_goal(&mut conn, LEADER, &team.id, gym_goal(4, None), t0() + Duration::days(1)).unwrap();
        assert_eq!(goal.target_visits_per_week, Some(4));
        assert_eq!(goal.target_min_duration_min, None);

        let fetched = get_goal(&conn, MEMBER_C, &team.id).unwrap();
        assert_eq!(fetched, goal);
        assert_eq!(get_goal(&conn, "stranger", &team.id).unwrap_err().kind, ErrorKind::Forbidden);
    }

    #[test]
    fn update_without_goal_is_not_found() {
        let mut conn = open();
        let team_id = forming_team(&mut conn, "running", "normal");
        let e = update_goal(&mut conn, LEADER, &team_id, running_goal(5.0), t0()).unwrap_err();
        assert_eq!(e.code, "goal_not_found");
    }
}
