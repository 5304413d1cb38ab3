use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStat {
    /// 0 is Sunday
    pub day_of_week: i64,
    pub day_name: String,
    pub success_rate: f64,
    pub activity_count: i64,
    pub is_danger: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub user_id: String,
    pub analysis_period_weeks: i64,
    pub daily_stats: Vec<DailyStat>,
    pub danger_days: Vec<String>,
    pub recommendation: String,
}
