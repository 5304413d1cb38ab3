use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    model::{TeamStatus, WeeklyEvaluation},
    types::Id,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationQuery {
    #[serde(default)]
    pub week: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyEvaluationResponse {
    #[serde(flatten)]
    pub evaluation: WeeklyEvaluation,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HpChangeEntry {
    pub user_id: String,
    pub user_name: String,
    pub hp_change: i64,
    pub target_met: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekHpHistory {
    pub week: i64,
    pub hp_start: i64,
    pub hp_end: i64,
    pub changes: Vec<HpChangeEntry>,
}

/// Progress line on the team status view. Only the fields for the team's exercise are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProgress {
    pub user_id: String,
    pub user_name: String,
    pub current_week_distance_km: Option<f64>,
    pub current_week_visits: Option<i64>,
    pub current_week_duration_min: Option<i64>,
    pub target_progress_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStatusResponse {
    pub team_id: Id,
    pub status: TeamStatus,
    pub current_hp: i64,
    pub max_hp: i64,
    pub current_week: i64,
    pub started_at: Option<DateTime<Utc>>,
    pub hp_history: Vec<WeekHpHistory>,
    pub members_progress: Vec<MemberProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekActivitySummary {
    pub id: Id,
    pub date: NaiveDate,
    pub distance_km: f64,
    pub duration_min: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeekMemberProgress {
    pub user_id: String,
    pub user_name: String,
    pub total_distance_km: f64,
    pub total_visits: i64,
    pub qualified_visits: i64,
    pub total_duration_min: i64,
    pub target_progress_percent: f64,
    pub on_track: bool,
    pub target_multiplier: f64,
    pub activities_this_week: Vec<WeekActivitySummary>,
}

/// Live view of the week being played. Week 0 with no window until the team starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeekEvaluationResponse {
    pub team_id: Id,
    pub week_number: i64,
    pub week_start: Option<DateTime<Utc>>,
    pub week_end: Option<DateTime<Utc>>,
    pub days_remaining: i64,
    pub members: Vec<CurrentWeekMemberProgress>,
}

/// Result of one run of the weekly evaluation job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRunResponse {
    pub evaluated_teams: usize,
    pub disbanded_teams: usize,
    pub failed_teams: usize,
}
