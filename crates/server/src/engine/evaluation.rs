use chrono::{DateTime, Utc};
use rusqlite::Connection;
use shared::{
    api::{
        error::ServerError,
        payloads::{EvaluationRunResponse, WeeklyEvaluationResponse},
        response_errors::GoalError,
    },
    model::{
        is_unique_violation, Activity, Goal, Model, Team, TeamMember, TeamStatus, WeeklyEvaluation,
    },
    scoring::{apply_hp_delta, score_week, WeekTotals},
    types::Id,
    week::WeekWindow,
};
use tracing::{error, info, instrument, warn};

use super::{require_member, require_team, vote::disband, UserNames};
use crate::db::write_transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekOutcome {
    /// Not active, not started, or the current week is still running
    NotDue,
    /// Someone else already wrote this week's evaluations
    AlreadyEvaluated,
    Evaluated { disbanded: bool },
}

/// Evaluates every elapsed week of every active team.
///
/// Each team week commits on its own, so one failing team doesn't hold up the rest.
#[instrument(skip(conn))]
pub fn run_weekly_evaluation(conn: &mut Connection, now: DateTime<Utc>) -> Result<EvaluationRunResponse, ServerError> {
    let teams = Team::fetch_by_status(conn, TeamStatus::Active)?;
    let mut summary = EvaluationRunResponse::default();

    for team in teams {
        let mut evaluated = false;
        // Catch up on every week that elapsed since the last run
        loop {
            match evaluate_team_week(conn, &team.id, now) {
                Ok(WeekOutcome::Evaluated { disbanded }) => {
                    evaluated = true;
                    if disbanded {
                        summary.disbanded_teams += 1;
                        break;
                    }
                }
                Ok(WeekOutcome::NotDue) | Ok(WeekOutcome::AlreadyEvaluated) => break,
                Err(e) => {
                    error!(team_id = %team.id, "Weekly evaluation failed: {e}");
                    summary.failed_teams += 1;
                    break;
                }
            }
        }
        if evaluated {
            summary.evaluated_teams += 1;
        }
    }

    info!(
        evaluated = summary.evaluated_teams,
        disbanded = summary.disbanded_teams,
        failed = summary.failed_teams,
        "Weekly evaluation run finished"
    );
    Ok(summary)
}

/// Scores the team's current week if it has elapsed, in one transaction
pub fn evaluate_team_week(conn: &mut Connection, team_id: &Id, now: DateTime<Utc>) -> Result<WeekOutcome, ServerError> {
    let tx = write_transaction(conn)?;

    let team = require_team(&tx, team_id)?;
    if team.status != TeamStatus::Active {
        return Ok(WeekOutcome::NotDue);
    }
    let Some(window) = team
        .started_at
        .and_then(|started_at| WeekWindow::new(started_at, team.current_week))
    else {
        return Ok(WeekOutcome::NotDue);
    };
    if !window.has_elapsed(now) {
        return Ok(WeekOutcome::NotDue);
    }
    if WeeklyEvaluation::exists_for_week(&tx, team_id, window.week_number)? {
        return Ok(WeekOutcome::AlreadyEvaluated);
    }

    let goal = Goal::fetch_by_team(&tx, team_id)?.ok_or(GoalError::NotFound)?;
    let members = TeamMember::fetch_by_team(&tx, team_id)?;
    let totals = members
        .iter()
        .map(|member| {
            let activities = Activity::fetch_countable(&tx, &member.user_id, team_id, window.start, window.end)?;
            Ok(WeekTotals::tally(&activities, goal.target_min_duration_min))
        })
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    let score = score_week(team.strictness, team.exercise_type, &goal, totals);

    for (member, member_score) in members.iter().zip(&score.members) {
        let evaluation = WeeklyEvaluation {
            id: Id::new(),
            team_id: team.id,
            user_id: member.user_id.clone(),
            week_number: window.week_number,
            target_met: member_score.target_met,
            total_distance_km: member_score.totals.total_distance_km,
            total_visits: member_score.totals.total_visits,
            total_duration_min: member_score.totals.total_duration_min,
            hp_change: member_score.hp_change,
            evaluated_at: now,
            created_at: now,
        };
        match evaluation.create(&tx) {
            Ok(()) => {}
            // A concurrent run got there first. Dropping the transaction rolls back our rows.
            Err(e) if is_unique_violation(&e) => {
                warn!(team_id = %team.id, week = window.week_number, "Week was evaluated concurrently");
                return Ok(WeekOutcome::AlreadyEvaluated);
            }
            Err(e) => Err(e)?,
        }
    }

    let current_hp = apply_hp_delta(team.current_hp, score.hp_delta, team.max_hp);
    let disbanded = current_hp <= 0;
    let status = if disbanded {
        TeamStatus::Disbanded
    } else {
        team.status
    };
    Team::record_week(&tx, team_id, current_hp, window.week_number + 1, status, now)?;
    if disbanded {
        disband(&tx, team_id, now)?;
    }
    tx.commit()?;

    info!(
        team_id = %team.id,
        week = window.week_number,
        hp_delta = score.hp_delta,
        current_hp,
        all_met = score.all_met,
        "Week evaluated"
    );
    if disbanded {
        info!(team_id = %team.id, "Team ran out of HP and disbanded");
    }

    Ok(WeekOutcome::Evaluated { disbanded })
}

/// Member-only. Ordered by week, then user id.
pub fn list_evaluations(
    conn: &Connection,
    uid: &str,
    team_id: &Id,
    week: Option<i64>,
) -> Result<Vec<WeeklyEvaluationResponse>, ServerError> {
    require_team(conn, team_id)?;
    require_member(conn, team_id, uid)?;

    let mut names = UserNames::new(conn);
    let evaluations = WeeklyEvaluation::fetch_by_team(conn, team_id, week)?
        .into_iter()
        .map(|evaluation| {
            Ok(WeeklyEvaluationResponse {
                user_name: names.name(&evaluation.user_id)?,
                evaluation,
            })
        })
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    Ok(evaluations)
}
