use const_format::concatcp;

pub mod error;
pub mod payloads;
pub mod response_errors;

pub const API_BASE_PATH: &str = "/api/";
pub const CRON_BASE_PATH: &str = "/cron/";

/// Shared secret the scheduler sends with cron triggers
pub const CRON_SECRET_HEADER: &str = "X-Cron-Secret";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Object {
    Ping,
    Me,
    Teams,
    MyTeam,
    Team,
    TeamInvite,
    JoinTeam,
    TeamGoal,
    TeamDisband,
    TeamStatus,
    TeamEvaluations,
    TeamCurrentWeek,
    TeamActivities,
    StartRunning,
    ActivityGps,
    FinishRunning,
    GymCheckin,
    GymCheckout,
    MyActivities,
    Activity,
    GymLocations,
    GymLocation,
    MyPrediction,
}

impl Object {
    pub const fn path(&self) -> &str {
        use Object::*;
        match self {
            Ping => concatcp!(API_BASE_PATH, "ping"),
            Me => concatcp!(API_BASE_PATH, "users/me"),
            Teams => concatcp!(API_BASE_PATH, "teams"),
            MyTeam => concatcp!(API_BASE_PATH, "teams/me"),
            Team => concatcp!(API_BASE_PATH, "teams/:team_id"),
            TeamInvite => concatcp!(API_BASE_PATH, "teams/:team_id/invite"),
            JoinTeam => concatcp!(API_BASE_PATH, "teams/join"),
            TeamGoal => concatcp!(API_BASE_PATH, "teams/:team_id/goal"),
            TeamDisband => concatcp!(API_BASE_PATH, "teams/:team_id/disband"),
            TeamStatus => concatcp!(API_BASE_PATH, "teams/:team_id/status"),
            TeamEvaluations => concatcp!(API_BASE_PATH, "teams/:team_id/evaluations"),
            TeamCurrentWeek => concatcp!(API_BASE_PATH, "teams/:team_id/evaluations/current"),
            TeamActivities => concatcp!(API_BASE_PATH, "teams/:team_id/activities"),
            StartRunning => concatcp!(API_BASE_PATH, "activities/running/start"),
            ActivityGps => concatcp!(API_BASE_PATH, "activities/:activity_id/gps"),
            FinishRunning => concatcp!(API_BASE_PATH, "activities/:activity_id/finish"),
            GymCheckin => concatcp!(API_BASE_PATH, "activities/gym/checkin"),
            GymCheckout => concatcp!(API_BASE_PATH, "activities/:activity_id/checkout"),
            MyActivities => concatcp!(API_BASE_PATH, "activities/me"),
            Activity => concatcp!(API_BASE_PATH, "activities/:activity_id"),
            GymLocations => concatcp!(API_BASE_PATH, "gym-locations"),
            GymLocation => concatcp!(API_BASE_PATH, "gym-locations/:gym_location_id"),
            MyPrediction => concatcp!(API_BASE_PATH, "predictions/me"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cron {
    WeeklyEvaluation,
}

impl Cron {
    pub const fn path(&self) -> &str {
        use Cron::*;
        match self {
            WeeklyEvaluation => concatcp!(CRON_BASE_PATH, "weekly-evaluation"),
        }
    }
}
