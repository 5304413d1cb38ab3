use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    model::{ExerciseType, Goal, Role, Strictness, Team, TeamStatus},
    types::Id,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub exercise_type: String,
    /// Empty means normal
    #[serde(default)]
    pub strictness: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberResponse {
    pub user_id: String,
    /// Profile name, falling back to the user id when there is no profile
    pub name: String,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamResponse {
    pub id: Id,
    pub name: String,
    pub exercise_type: ExerciseType,
    pub strictness: Strictness,
    pub status: TeamStatus,
    pub max_hp: i64,
    pub current_hp: i64,
    pub current_week: i64,
    pub started_at: Option<DateTime<Utc>>,
    pub members: Vec<TeamMemberResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamResponse {
    pub fn new(team: Team, members: Vec<TeamMemberResponse>, goal: Option<Goal>) -> Self {
        Self {
            id: team.id,
            name: team.name,
            exercise_type: team.exercise_type,
            strictness: team.strictness,
            status: team.status,
            max_hp: team.max_hp,
            current_hp: team.current_hp,
            current_week: team.current_week,
            started_at: team.started_at,
            members,
            goal,
            created_at: team.created_at,
            updated_at: team.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteCodeResponse {
    pub code: String,
    pub team_id: Id,
    pub team_name: String,
    pub exercise_type: ExerciseType,
    pub expires_at: DateTime<Utc>,
    pub current_member_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinTeamRequest {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinTeamResponse {
    pub team: TeamResponse,
    /// True when this join filled the team and started week 1
    pub team_ready: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalRequest {
    #[serde(default)]
    pub target_distance_km: Option<f64>,
    #[serde(default)]
    pub target_visits_per_week: Option<i64>,
    #[serde(default)]
    pub target_min_duration_min: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisbandVoteResponse {
    pub team_id: Id,
    pub total_count: i64,
    pub voted_count: i64,
    pub voted_users: Vec<String>,
    pub disbanded: bool,
}
