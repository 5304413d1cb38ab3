use chrono::{DateTime, Utc};

use crate::{feature_model_derives, feature_model_imports, types::Id};

feature_model_imports!();

feature_model_derives!(
    "weekly_evaluation",
    "../../../server/migrations/009-weekly_evaluation/up.sql",
    /// One member's result for one evaluated week. Unique per (team, user, week).
    pub struct WeeklyEvaluation {
        pub id: Id,
        pub team_id: Id,
        pub user_id: String,
        pub week_number: i64,
        pub target_met: bool,
        pub total_distance_km: f64,
        pub total_visits: i64,
        pub total_duration_min: i64,
        /// Final HP contribution, all-met bonus included
        pub hp_change: i64,
        pub evaluated_at: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
    }
);

#[cfg(feature = "backend")]
impl WeeklyEvaluation {
    pub fn exists_for_week(conn: &Connection, team_id: &Id, week_number: i64) -> Result<bool, rusqlite::Error> {
        let (sql, values) = Query::select()
            .expr(Func::count(Expr::col(WeeklyEvaluationIden::Id)))
            .from(WeeklyEvaluationIden::Table)
            .and_where(Expr::col(WeeklyEvaluationIden::TeamId).eq(team_id))
            .and_where(Expr::col(WeeklyEvaluationIden::WeekNumber).eq(week_number))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let count: i64 = stmt.query_row(&*values.as_params(), |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Evaluations of a team ordered by week then member, optionally restricted to one week
    pub fn fetch_by_team(
        conn: &Connection,
        team_id: &Id,
        week_number: Option<i64>,
    ) -> Result<Vec<WeeklyEvaluation>, rusqlite::Error> {
        let mut query = Self::select_star();
        query.and_where(Expr::col(WeeklyEvaluationIden::TeamId).eq(team_id));
        if let Some(week_number) = week_number {
            query.and_where(Expr::col(WeeklyEvaluationIden::WeekNumber).eq(week_number));
        }
        let (sql, values) = query
            .order_by(WeeklyEvaluationIden::WeekNumber, Order::Asc)
            .order_by(WeeklyEvaluationIden::UserId, Order::Asc)
            .order_by(WeeklyEvaluationIden::Id, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), WeeklyEvaluation::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }
}
