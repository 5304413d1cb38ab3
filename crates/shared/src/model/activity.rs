use chrono::{DateTime, Utc};

use super::{ActivityStatus, ExerciseType, ReviewStatus};
use crate::{feature_model_derives, feature_model_imports, types::Id};

feature_model_imports!();

feature_model_derives!(
    "activity",
    "../../../server/migrations/007-activity/up.sql",
    /// A run or a gym visit. At most one per user is in progress at a time.
    pub struct Activity {
        pub id: Id,
        pub user_id: String,
        pub team_id: Option<Id>,
        pub exercise_type: ExerciseType,
        pub status: ActivityStatus,
        pub review_status: Option<ReviewStatus>,
        pub started_at: DateTime<Utc>,
        pub ended_at: Option<DateTime<Utc>>,
        pub distance_km: f64,
        pub gym_location_id: Option<Id>,
        pub auto_detected: bool,
        pub duration_min: i64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
);

impl Activity {
    pub fn start(
        user_id: String,
        team_id: Option<Id>,
        exercise_type: ExerciseType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Id::new(),
            user_id,
            team_id,
            exercise_type,
            status: ActivityStatus::InProgress,
            review_status: None,
            started_at: now,
            ended_at: None,
            distance_km: 0.0,
            gym_location_id: None,
            auto_detected: false,
            duration_min: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == ActivityStatus::InProgress
    }

    /// Whole minutes between start and `ended_at`, truncated
    pub fn minutes_until(&self, ended_at: DateTime<Utc>) -> i64 {
        (ended_at - self.started_at).num_minutes()
    }
}

#[cfg(feature = "backend")]
impl Activity {
    pub fn fetch_maybe(conn: &Connection, id: &Id) -> Result<Option<Activity>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ActivityIden::Id).eq(id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), Activity::from_row)
            .optional()?;
        Ok(res)
    }

    pub fn fetch_in_progress(conn: &Connection, user_id: &str) -> Result<Option<Activity>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ActivityIden::UserId).eq(user_id))
            .and_where(Expr::col(ActivityIden::Status).eq(ActivityStatus::InProgress))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), Activity::from_row)
            .optional()?;
        Ok(res)
    }

    /// Completed, non-rejected activities of a member for a team that started in `[start, end)`
    pub fn fetch_countable(
        conn: &Connection,
        user_id: &str,
        team_id: &Id,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Activity>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ActivityIden::UserId).eq(user_id))
            .and_where(Expr::col(ActivityIden::TeamId).eq(team_id))
            .and_where(Expr::col(ActivityIden::Status).eq(ActivityStatus::Completed))
            .and_where(Expr::col(ActivityIden::StartedAt).gte(start))
            .and_where(Expr::col(ActivityIden::StartedAt).lt(end))
            .and_where(
                Expr::col(ActivityIden::ReviewStatus)
                    .is_null()
                    .or(Expr::col(ActivityIden::ReviewStatus).ne(ReviewStatus::Rejected)),
            )
            .order_by(ActivityIden::StartedAt, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), Activity::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    /// Completed activities of a user, any team, started at or after `since`
    pub fn fetch_completed_since(
        conn: &Connection,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Activity>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ActivityIden::UserId).eq(user_id))
            .and_where(Expr::col(ActivityIden::Status).eq(ActivityStatus::Completed))
            .and_where(Expr::col(ActivityIden::StartedAt).gte(since))
            .order_by(ActivityIden::StartedAt, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), Activity::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn fetch_by_user(conn: &Connection, user_id: &str, limit: u64) -> Result<Vec<Activity>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ActivityIden::UserId).eq(user_id))
            .order_by(ActivityIden::StartedAt, Order::Desc)
            .limit(limit)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), Activity::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn fetch_by_team(conn: &Connection, team_id: &Id, limit: u64) -> Result<Vec<Activity>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ActivityIden::TeamId).eq(team_id))
            .order_by(ActivityIden::StartedAt, Order::Desc)
            .limit(limit)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), Activity::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    /// Adds to the running distance without reading it first
    pub fn add_distance(conn: &Connection, id: &Id, km: f64, now: DateTime<Utc>) -> Result<(), rusqlite::Error> {
        let (sql, values) = Query::update()
            .table(ActivityIden::Table)
            .values([
                (ActivityIden::DistanceKm, Expr::col(ActivityIden::DistanceKm).add(km)),
                (ActivityIden::UpdatedAt, now.into()),
            ])
            .and_where(Expr::col(ActivityIden::Id).eq(id))
            .build_rusqlite(SqliteQueryBuilder);

        conn.execute(&sql, &*values.as_params())?;
        Ok(())
    }

    /// Marks an in-progress activity completed. Returns false if it was already finished.
    pub fn complete(
        conn: &Connection,
        id: &Id,
        ended_at: DateTime<Utc>,
        duration_min: i64,
        distance_km: f64,
    ) -> Result<bool, rusqlite::Error> {
        let (sql, values) = Query::update()
            .table(ActivityIden::Table)
            .values([
                (ActivityIden::Status, ActivityStatus::Completed.into()),
                (ActivityIden::EndedAt, ended_at.into()),
                (ActivityIden::DurationMin, duration_min.into()),
                (ActivityIden::DistanceKm, distance_km.into()),
                (ActivityIden::UpdatedAt, ended_at.into()),
            ])
            .and_where(Expr::col(ActivityIden::Id).eq(id))
            .and_where(Expr::col(ActivityIden::Status).eq(ActivityStatus::InProgress))
            .build_rusqlite(SqliteQueryBuilder);

        Ok(conn.execute(&sql, &*values.as_params())? == 1)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn duration_truncates_to_whole_minutes() {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 7, 0, 0).unwrap();
        let activity = Activity::start("u1".into(), None, ExerciseType::Gym, start);
        assert_eq!(activity.minutes_until(start + Duration::seconds(59 * 60 + 59)), 59);
        assert_eq!(activity.minutes_until(start + Duration::minutes(60)), 60);
        assert!(activity.is_in_progress());
    }
}
