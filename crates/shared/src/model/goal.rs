use chrono::{DateTime, Utc};

use super::ExerciseType;
use crate::{feature_model_derives, feature_model_imports, types::Id};

feature_model_imports!();

feature_model_derives!(
    "goal",
    "../../../server/migrations/005-goal/up.sql",
    /// Weekly target shared by every member of a team. A team has at most one.
    pub struct Goal {
        pub id: Id,
        pub team_id: Id,
        pub exercise_type: ExerciseType,
        pub target_distance_km: Option<f64>,
        pub target_visits_per_week: Option<i64>,
        /// Minimum minutes for a gym visit to count as qualified
        pub target_min_duration_min: Option<i64>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
);

#[cfg(feature = "backend")]
impl Goal {
    pub fn fetch_by_team(conn: &Connection, team_id: &Id) -> Result<Option<Goal>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(GoalIden::TeamId).eq(team_id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), Goal::from_row)
            .optional()?;
        Ok(res)
    }

    pub fn update(&self, conn: &Connection) -> Result<(), rusqlite::Error> {
        let (sql, values) = Query::update()
            .table(GoalIden::Table)
            .values([
                (GoalIden::TargetDistanceKm, self.target_distance_km.into()),
                (GoalIden::TargetVisitsPerWeek, self.target_visits_per_week.into()),
                (GoalIden::TargetMinDurationMin, self.target_min_duration_min.into()),
                (GoalIden::UpdatedAt, self.updated_at.into()),
            ])
            .and_where(Expr::col(GoalIden::Id).eq(&self.id))
            .build_rusqlite(SqliteQueryBuilder);

        conn.execute(&sql, &*values.as_params())?;
        Ok(())
    }
}
