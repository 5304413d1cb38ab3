use chrono::{DateTime, Utc};
use rusqlite::Connection;
use shared::{
    api::{
        error::ServerError,
        payloads::{
            CurrentWeekEvaluationResponse, CurrentWeekMemberProgress, MemberProgress, PredictionResponse,
            TeamStatusResponse, WeekActivitySummary,
        },
        response_errors::TeamError,
    },
    model::{Activity, ExerciseType, Goal, Team, TeamMember, WeeklyEvaluation},
    report::{analysis_start, hp_history, predict, ANALYSIS_PERIOD_WEEKS},
    scoring::{on_track, progress_percent, WeekTotals},
    types::Id,
    week::WeekWindow,
};

use super::{require_member, require_team, UserNames};

fn current_window(team: &Team) -> Option<WeekWindow> {
    team.started_at
        .and_then(|started_at| WeekWindow::new(started_at, team.current_week))
}

fn member_week(
    conn: &Connection,
    team: &Team,
    window: &WeekWindow,
    goal: Option<&Goal>,
    member: &TeamMember,
) -> Result<(Vec<Activity>, WeekTotals, f64), rusqlite::Error> {
    let activities = Activity::fetch_countable(conn, &member.user_id, &team.id, window.start, window.end)?;
    let totals = WeekTotals::tally(&activities, goal.and_then(|g| g.target_min_duration_min));
    let percent = progress_percent(team.exercise_type, goal, &totals, member.effective_multiplier());
    Ok((activities, totals, percent))
}

/// Live progress of every member through the week being played
pub fn current_week(
    conn: &Connection,
    uid: &str,
    team_id: &Id,
    now: DateTime<Utc>,
) -> Result<CurrentWeekEvaluationResponse, ServerError> {
    let team = require_team(conn, team_id)?;
    require_member(conn, team_id, uid)?;

    let Some(window) = current_window(&team) else {
        return Ok(CurrentWeekEvaluationResponse {
            team_id: team.id,
            week_number: 0,
            week_start: None,
            week_end: None,
            days_remaining: 0,
            members: Vec::new(),
        });
    };

    let goal = Goal::fetch_by_team(conn, team_id)?;
    let days_remaining = window.days_remaining(now);
    let mut names = UserNames::new(conn);
    let mut members = Vec::new();

    for member in TeamMember::fetch_by_team(conn, team_id)? {
        let (activities, totals, percent) = member_week(conn, &team, &window, goal.as_ref(), &member)?;
        members.push(CurrentWeekMemberProgress {
            user_name: names.name(&member.user_id)?,
            total_distance_km: totals.total_distance_km,
            total_visits: totals.total_visits,
            qualified_visits: totals.qualified_visits,
            total_duration_min: totals.total_duration_min,
            target_progress_percent: percent,
            on_track: on_track(percent, days_remaining),
            target_multiplier: member.effective_multiplier(),
            activities_this_week: activities
                .iter()
                .map(|a| WeekActivitySummary {
                    id: a.id,
                    date: a.started_at.date_naive(),
                    distance_km: a.distance_km,
                    duration_min: a.duration_min,
                })
                .collect(),
            user_id: member.user_id,
        });
    }

    Ok(CurrentWeekEvaluationResponse {
        team_id: team.id,
        week_number: window.week_number,
        week_start: Some(window.start),
        week_end: Some(window.display_end()),
        days_remaining,
        members,
    })
}

/// Stored HP and status with the replayed history and this week's progress
pub fn team_status(conn: &Connection, uid: &str, team_id: &Id) -> Result<TeamStatusResponse, ServerError> {
    let team = require_team(conn, team_id)?;
    require_member(conn, team_id, uid)?;

    let mut names = UserNames::new(conn);
    let evaluations = WeeklyEvaluation::fetch_by_team(conn, team_id, None)?;
    let named = evaluations
        .iter()
        .map(|e| Ok((e, names.name(&e.user_id)?)))
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
    let history = hp_history(named, team.max_hp);

    let goal = Goal::fetch_by_team(conn, team_id)?;
    let window = current_window(&team);
    let mut members_progress = Vec::new();

    for member in TeamMember::fetch_by_team(conn, team_id)? {
        let user_name = names.name(&member.user_id)?;
        let progress = match &window {
            Some(window) => {
                let (_, totals, percent) = member_week(conn, &team, window, goal.as_ref(), &member)?;
                let (distance, visits) = match team.exercise_type {
                    ExerciseType::Running => (Some(totals.total_distance_km), None),
                    ExerciseType::Gym => (None, Some(totals.total_visits)),
                };
                MemberProgress {
                    user_id: member.user_id,
                    user_name,
                    current_week_distance_km: distance,
                    current_week_visits: visits,
                    current_week_duration_min: Some(totals.total_duration_min),
                    target_progress_percent: percent,
                }
            }
            None => MemberProgress {
                user_id: member.user_id,
                user_name,
                current_week_distance_km: None,
                current_week_visits: None,
                current_week_duration_min: None,
                target_progress_percent: 0.0,
            },
        };
        members_progress.push(progress);
    }

    Ok(TeamStatusResponse {
        team_id: team.id,
        status: team.status,
        current_hp: team.current_hp,
        max_hp: team.max_hp,
        current_week: team.current_week,
        started_at: team.started_at,
        hp_history: history,
        members_progress,
    })
}

/// Weekdays on which the caller tends to skip workouts
pub fn my_prediction(conn: &Connection, uid: &str, now: DateTime<Utc>) -> Result<PredictionResponse, ServerError> {
    let membership = TeamMember::fetch_live_membership(conn, uid)?.ok_or(TeamError::NoTeam)?;
    let team = require_team(conn, &membership.team_id)?;
    if team.started_at.is_none() {
        Err(TeamError::NotActive)?;
    }

    let activities = Activity::fetch_completed_since(conn, uid, analysis_start(now))?;
    let prediction = predict(activities.iter().map(|a| a.started_at), now);

    Ok(PredictionResponse {
        user_id: uid.to_string(),
        analysis_period_weeks: ANALYSIS_PERIOD_WEEKS,
        daily_stats: prediction.daily_stats,
        danger_days: prediction.danger_days,
        recommendation: prediction.recommendation,
    })
}
