use chrono::{DateTime, Utc};
use rusqlite::Connection;
use shared::{
    api::{
        error::ServerError,
        payloads::{CreateGymLocationRequest, GymCheckinRequest, PositionRequest},
        response_errors::{ActivityError, GymError},
    },
    geo::Coordinate,
    model::{Activity, ExerciseType, GymLocation, Model, TeamMember, TeamStatus},
    types::Id,
};
use tracing::info;

use super::{activity::{insert_activity, require_open_activity}, require_team, require_valid};
use crate::db::write_transaction;

pub const MIN_GYM_RADIUS_M: i64 = 50;
pub const MAX_GYM_RADIUS_M: i64 = 500;

fn invalid(message: &str) -> GymError {
    GymError::Invalid {
        message: message.to_string(),
    }
}

pub fn create_gym_location(
    conn: &mut Connection,
    uid: &str,
    request: CreateGymLocationRequest,
    now: DateTime<Utc>,
) -> Result<GymLocation, ServerError> {
    let name = request.name.trim();
    if name.is_empty() {
        Err(invalid("name is required"))?;
    }
    let position = require_valid(request.coordinate())?;
    if !(MIN_GYM_RADIUS_M..=MAX_GYM_RADIUS_M).contains(&request.radius_m) {
        Err(invalid("radius_m must be between 50 and 500"))?;
    }

    let gym = GymLocation {
        id: Id::new(),
        user_id: uid.to_string(),
        name: name.to_string(),
        latitude: position.latitude,
        longitude: position.longitude,
        radius_m: request.radius_m,
        created_at: now,
        updated_at: now,
    };
    gym.create(conn)?;

    Ok(gym)
}

pub fn list_gym_locations(conn: &Connection, uid: &str) -> Result<Vec<GymLocation>, ServerError> {
    Ok(GymLocation::fetch_by_user(conn, uid)?)
}

pub fn delete_gym_location(conn: &mut Connection, uid: &str, id: &Id) -> Result<(), ServerError> {
    let gym = GymLocation::fetch_maybe(conn, id)?.ok_or(GymError::NotFound)?;
    if gym.user_id != uid {
        Err(GymError::NotOwner)?;
    }
    GymLocation::delete(conn, id)?;
    Ok(())
}

/// Opens a gym visit when the caller is inside the gym's geofence
pub fn gym_checkin(
    conn: &mut Connection,
    uid: &str,
    request: GymCheckinRequest,
    now: DateTime<Utc>,
) -> Result<Activity, ServerError> {
    let position = require_valid(Coordinate::new(request.latitude, request.longitude))?;
    let tx = write_transaction(conn)?;

    let gym = GymLocation::fetch_maybe(&tx, &request.gym_location_id)?.ok_or(GymError::NotFound)?;

    let team_id = match TeamMember::fetch_live_membership(&tx, uid)? {
        Some(membership) => {
            let team = require_team(&tx, &membership.team_id)?;
            if team.status != TeamStatus::Active || team.exercise_type != ExerciseType::Gym {
                Err(ActivityError::TeamNotEligible)?;
            }
            Some(team.id)
        }
        None => None,
    };

    if Activity::fetch_in_progress(&tx, uid)?.is_some() {
        Err(ActivityError::AlreadyInProgress)?;
    }

    if !gym.covers(&position) {
        Err(GymError::TooFar {
            distance_m: gym.coordinate().distance_km(&position) * 1000.0,
            radius_m: gym.radius_m,
        })?;
    }

    let mut activity = Activity::start(uid.to_string(), team_id, ExerciseType::Gym, now);
    activity.gym_location_id = Some(gym.id);
    activity.auto_detected = request.auto_detected;
    insert_activity(&tx, &activity)?;
    tx.commit()?;

    info!(activity_id = %activity.id, gym_location_id = %gym.id, "Checked in");
    Ok(activity)
}

pub fn gym_checkout(
    conn: &mut Connection,
    uid: &str,
    activity_id: &Id,
    position: PositionRequest,
    now: DateTime<Utc>,
) -> Result<Activity, ServerError> {
    require_valid(position.coordinate())?;
    let tx = write_transaction(conn)?;

    let activity = require_open_activity(&tx, uid, activity_id, ExerciseType::Gym)?;
    let duration_min = activity.minutes_until(now).max(0);
    if !Activity::complete(&tx, activity_id, now, duration_min, 0.0)? {
        Err(ActivityError::NotInProgress)?;
    }

    let activity = Activity::fetch_maybe(&tx, activity_id)?.ok_or(ActivityError::NotFound)?;
    tx.commit()?;

    info!(activity_id = %activity.id, duration_min, "Checked out");
    Ok(activity)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use shared::{
        api::{error::ErrorKind, payloads::GoalRequest},
        model::ActivityStatus,
    };

    use super::*;
    use crate::engine::{start_running, testing::*};

    // 0.001 degrees of latitude is about 111 m
    const GYM: (f64, f64) = (35.0, 139.7);

    fn checkin(gym_location_id: Id, latitude: f64) -> GymCheckinRequest {
        GymCheckinRequest {
            gym_location_id,
            latitude,
            longitude: GYM.1,
            auto_detected: true,
        }
    }

    fn here() -> PositionRequest {
        PositionRequest {
            latitude: GYM.0,
            longitude: GYM.1,
        }
    }

    fn gym_team(conn: &mut Connection) -> shared::model::Team {
        active_team(
            conn,
            "gym",
            "normal",
            GoalRequest {
                target_visits_per_week: Some(3),
                ..Default::default()
            },
        )
    }

    #[test]
    fn gym_location_validation() {
        let mut conn = open();
        let mut request = CreateGymLocationRequest {
            name: "Gym".into(),
            latitude: GYM.0,
            longitude: GYM.1,
            radius_m: 49,
        };
        assert_eq!(create_gym_location(&mut conn, "alice", request.clone(), t0()).unwrap_err().kind, ErrorKind::InvalidInput);
        request.radius_m = 500;
        request.longitude = 181.0;
        assert_eq!(create_gym_location(&mut conn, "alice", request.clone(), t0()).unwrap_err().kind, ErrorKind::InvalidInput);
        request.longitude = GYM.1;
        create_gym_location(&mut conn, "alice", request, t0()).unwrap();
        assert_eq!(list_gym_locations(&conn, "alice").unwrap().len(), 1);
    }

    #[test]
    fn only_owner_deletes_gym_location() {
        let mut conn = open();
        let gym = gym_at(&mut conn, "alice", GYM.0, GYM.1);
        assert_eq!(delete_gym_location(&mut conn, "bob", &gym).unwrap_err().kind, ErrorKind::Forbidden);
        delete_gym_location(&mut conn, "alice", &gym).unwrap();
        assert_eq!(delete_gym_location(&mut conn, "alice", &gym).unwrap_err().kind, ErrorKind::NotFound);
    }

    #[test]
    fn checkin_outside_geofence_is_too_far() {
        let mut conn = open();
        let gym = gym_at(&mut conn, "alice", GYM.0, GYM.1);

        // About 150 m north of a 100 m geofence
        let e = gym_checkin(&mut conn, "alice", checkin(gym, GYM.0 + 0.00135), t0()).unwrap_err();
        assert_eq!(e.kind, ErrorKind::Unprocessable);
        assert_eq!(e.code, "too_far_from_gym");
        assert!(Activity::fetch_in_progress(&conn, "alice").unwrap().is_none());
    }

    #[test]
    fn checkin_and_checkout_without_team() {
        let mut conn = open();
        let gym = gym_at(&mut conn, "alice", GYM.0, GYM.1);

        let visit = gym_checkin(&mut conn, "alice", checkin(gym, GYM.0 + 0.0005), t0()).unwrap();
        assert_eq!(visit.team_id, None);
        assert_eq!(visit.gym_location_id, Some(gym));
        assert!(visit.auto_detected);

        let e = gym_checkin(&mut conn, "alice", checkin(gym, GYM.0), t0()).unwrap_err();
        assert_eq!(e.kind, ErrorKind::Conflict);
        let e = start_running(&mut conn, "alice", here(), t0()).unwrap_err();
        assert_eq!(e.kind, ErrorKind::Conflict);

        let done = gym_checkout(&mut conn, "alice", &visit.id, here(), t0() + Duration::seconds(45 * 60 + 50)).unwrap();
        assert_eq!(done.status, ActivityStatus::Completed);
        assert_eq!(done.duration_min, 45);
        assert_eq!(done.distance_km, 0.0);

        let e = gym_checkout(&mut conn, "alice", &visit.id, here(), t0() + Duration::hours(1)).unwrap_err();
        assert_eq!(e.kind, ErrorKind::Unprocessable);
    }

    #[test]
    fn checkin_requires_eligible_team() {
        let mut conn = open();
        forming_team(&mut conn, "running", "normal");
        let gym = gym_at(&mut conn, LEADER, GYM.0, GYM.1);

        let e = gym_checkin(&mut conn, LEADER, checkin(gym, GYM.0), t0()).unwrap_err();
        assert_eq!(e.code, "team_not_eligible");

        let e = gym_checkin(&mut conn, LEADER, checkin(Id::new(), GYM.0), t0()).unwrap_err();
        assert_eq!(e.code, "gym_location_not_found");
    }

    #[test]
    fn checkin_for_gym_team_is_attached() {
        let mut conn = open();
        let team = gym_team(&mut conn);
        let gym = gym_at(&mut conn, MEMBER_C, GYM.0, GYM.1);

        let visit = gym_checkin(&mut conn, MEMBER_C, checkin(gym, GYM.0), t0() + Duration::hours(3)).unwrap();
        assert_eq!(visit.team_id, Some(team.id));

        let e = gym_checkout(&mut conn, LEADER, &visit.id, here(), t0() + Duration::hours(4)).unwrap_err();
        assert_eq!(e.kind, ErrorKind::Forbidden);
    }
}
