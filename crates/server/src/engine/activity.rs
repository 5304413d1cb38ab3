use chrono::{DateTime, Utc};
use rusqlite::Connection;
use shared::{
    api::{
        error::ServerError,
        payloads::{ActivityResponse, PositionRequest, SendGpsPointsRequest, SendGpsPointsResponse},
        response_errors::ActivityError,
    },
    geo::Coordinate,
    model::{
        is_unique_violation, Activity, ExerciseType, GpsPoint, GymLocation, Model, TeamMember, TeamStatus,
    },
    tracking::{track_distance_km, DistanceAccumulator, TrackPoint, MAX_ACCURACY_METERS},
    types::Id,
};
use tracing::{debug, info};

use super::{require_member, require_team, require_valid};
use crate::db::write_transaction;

pub const DEFAULT_ACTIVITY_LIMIT: u64 = 50;
pub const MAX_ACTIVITY_LIMIT: u64 = 200;

fn limit_or_default(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).clamp(1, MAX_ACTIVITY_LIMIT)
}

/// The caller's own in-progress activity of the given type
pub(crate) fn require_open_activity(
    conn: &Connection,
    uid: &str,
    activity_id: &Id,
    exercise_type: ExerciseType,
) -> Result<Activity, ServerError> {
    let activity = Activity::fetch_maybe(conn, activity_id)?.ok_or(ActivityError::NotFound)?;
    if activity.user_id != uid {
        Err(ActivityError::NotOwner)?;
    }
    if activity.exercise_type != exercise_type {
        Err(ActivityError::WrongType {
            expected: exercise_type.to_string(),
        })?;
    }
    if !activity.is_in_progress() {
        Err(ActivityError::NotInProgress)?;
    }
    Ok(activity)
}

/// Inserts a new in-progress activity, turning a lost race on the one-open-activity index into
/// the same conflict the pre-check reports
pub(crate) fn insert_activity(conn: &Connection, activity: &Activity) -> Result<(), ServerError> {
    if Activity::fetch_in_progress(conn, &activity.user_id)?.is_some() {
        Err(ActivityError::AlreadyInProgress)?;
    }
    activity.create(conn).map_err(|e| -> ServerError {
        if is_unique_violation(&e) {
            ActivityError::AlreadyInProgress.into()
        } else {
            e.into()
        }
    })
}

fn anchor_point(activity_id: Id, position: Coordinate, now: DateTime<Utc>) -> GpsPoint {
    GpsPoint {
        id: Id::new(),
        activity_id,
        client_id: None,
        latitude: position.latitude,
        longitude: position.longitude,
        accuracy: 0.0,
        timestamp: now,
    }
}

pub fn start_running(
    conn: &mut Connection,
    uid: &str,
    position: PositionRequest,
    now: DateTime<Utc>,
) -> Result<ActivityResponse, ServerError> {
    let position = require_valid(position.coordinate())?;
    let tx = write_transaction(conn)?;

    // Only runs made for an active running team count towards its goal
    let team_id = match TeamMember::fetch_live_membership(&tx, uid)? {
        Some(membership) => {
            let team = require_team(&tx, &membership.team_id)?;
            (team.status == TeamStatus::Active && team.exercise_type == ExerciseType::Running)
                .then_some(team.id)
        }
        None => None,
    };

    let activity = Activity::start(uid.to_string(), team_id, ExerciseType::Running, now);
    insert_activity(&tx, &activity)?;
    let point = anchor_point(activity.id, position, now);
    point.create(&tx)?;
    tx.commit()?;

    info!(activity_id = %activity.id, "Run started");
    Ok(ActivityResponse {
        activity,
        gps_points: vec![point],
        gym_location_name: None,
    })
}

/// Stores a batch of points and adds the distance they cover to the run
pub fn send_gps_points(
    conn: &mut Connection,
    uid: &str,
    activity_id: &Id,
    request: SendGpsPointsRequest,
    now: DateTime<Utc>,
) -> Result<SendGpsPointsResponse, ServerError> {
    let tx = write_transaction(conn)?;

    require_open_activity(&tx, uid, activity_id, ExerciseType::Running)?;

    let previous = GpsPoint::fetch_last_usable(&tx, activity_id, MAX_ACCURACY_METERS)?.map(|p| p.coordinate());
    let mut accumulator = DistanceAccumulator::resume_from(previous);
    let mut saved_count = 0;

    for point in request.points {
        let Ok(timestamp) = DateTime::parse_from_rfc3339(&point.timestamp) else {
            debug!(timestamp = %point.timestamp, "Skipping point with unparsable timestamp");
            continue;
        };
        if let Some(client_id) = &point.client_id {
            if GpsPoint::client_id_exists(&tx, client_id)? {
                continue;
            }
        }
        let coordinate = Coordinate::new(point.latitude, point.longitude);
        if !coordinate.is_valid() {
            debug!(?coordinate, "Skipping point with invalid coordinates");
            continue;
        }

        GpsPoint {
            id: Id::new(),
            activity_id: *activity_id,
            client_id: point.client_id,
            latitude: point.latitude,
            longitude: point.longitude,
            accuracy: point.accuracy,
            timestamp: timestamp.with_timezone(&Utc),
        }
        .create(&tx)?;
        saved_count += 1;
        accumulator.push(coordinate, point.accuracy);
    }

    if accumulator.total_km() > 0.0 {
        Activity::add_distance(&tx, activity_id, accumulator.total_km(), now)?;
    }
    let current_distance_km = Activity::fetch_maybe(&tx, activity_id)?
        .ok_or(ActivityError::NotFound)?
        .distance_km;
    tx.commit()?;

    Ok(SendGpsPointsResponse {
        saved_count,
        current_distance_km,
    })
}

/// Closes the run, recomputing its distance over the whole track
pub fn finish_running(
    conn: &mut Connection,
    uid: &str,
    activity_id: &Id,
    position: PositionRequest,
    now: DateTime<Utc>,
) -> Result<ActivityResponse, ServerError> {
    let position = require_valid(position.coordinate())?;
    let tx = write_transaction(conn)?;

    let activity = require_open_activity(&tx, uid, activity_id, ExerciseType::Running)?;
    anchor_point(activity.id, position, now).create(&tx)?;

    let gps_points = GpsPoint::fetch_by_activity(&tx, activity_id)?;
    let distance_km = track_distance_km(&gps_points);
    let duration_min = activity.minutes_until(now).max(0);
    if !Activity::complete(&tx, activity_id, now, duration_min, distance_km)? {
        Err(ActivityError::NotInProgress)?;
    }

    let activity = Activity::fetch_maybe(&tx, activity_id)?.ok_or(ActivityError::NotFound)?;
    tx.commit()?;

    info!(activity_id = %activity.id, distance_km, duration_min, "Run finished");
    Ok(ActivityResponse {
        activity,
        gps_points,
        gym_location_name: None,
    })
}

/// Visible to the owner and to members of the team it was logged for
pub fn get_activity(conn: &Connection, uid: &str, activity_id: &Id) -> Result<ActivityResponse, ServerError> {
    let activity = Activity::fetch_maybe(conn, activity_id)?.ok_or(ActivityError::NotFound)?;
    if activity.user_id != uid {
        let teammate = match &activity.team_id {
            Some(team_id) => TeamMember::fetch_membership(conn, team_id, uid)?.is_some(),
            None => false,
        };
        if !teammate {
            Err(ActivityError::NotOwner)?;
        }
    }

    let gps_points = match activity.exercise_type {
        ExerciseType::Running => GpsPoint::fetch_by_activity(conn, activity_id)?,
        ExerciseType::Gym => Vec::new(),
    };
    let gym_location_name = match &activity.gym_location_id {
        Some(id) => GymLocation::fetch_maybe(conn, id)?.map(|g| g.name),
        None => None,
    };

    Ok(ActivityResponse {
        activity,
        gps_points,
        gym_location_name,
    })
}

/// Newest first
pub fn list_my_activities(conn: &Connection, uid: &str, limit: Option<u64>) -> Result<Vec<Activity>, ServerError> {
    Ok(Activity::fetch_by_user(conn, uid, limit_or_default(limit))?)
}

pub fn list_team_activities(
    conn: &Connection,
    uid: &str,
    team_id: &Id,
    limit: Option<u64>,
) -> Result<Vec<Activity>, ServerError> {
    require_team(conn, team_id)?;
    require_member(conn, team_id, uid)?;
    Ok(Activity::fetch_by_team(conn, team_id, limit_or_default(limit))?)
}
