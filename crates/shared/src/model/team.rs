use chrono::{DateTime, Utc};

use super::{ExerciseType, Strictness, TeamStatus};
use crate::{feature_model_derives, feature_model_imports, types::Id};

feature_model_imports!();

pub const MAX_TEAM_MEMBERS: i64 = 3;
pub const MAX_HP: i64 = 100;

feature_model_derives!(
    "team",
    "../../../server/migrations/002-team/up.sql",
    pub struct Team {
        pub id: Id,
        pub name: String,
        pub exercise_type: ExerciseType,
        pub strictness: Strictness,
        pub status: TeamStatus,
        pub max_hp: i64,
        pub current_hp: i64,
        /// 1-based index of the week being played. 0 until the team is activated.
        pub current_week: i64,
        pub started_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
);

impl Team {
    pub fn new(name: String, exercise_type: ExerciseType, strictness: Strictness, now: DateTime<Utc>) -> Self {
        Self {
            id: Id::new(),
            name,
            exercise_type,
            strictness,
            status: TeamStatus::Forming,
            max_hp: MAX_HP,
            current_hp: MAX_HP,
            current_week: 0,
            started_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(feature = "backend")]
impl Team {
    pub fn fetch_maybe(conn: &Connection, id: &Id) -> Result<Option<Team>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(TeamIden::Id).eq(id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), Team::from_row)
            .optional()?;
        Ok(res)
    }

    pub fn fetch_by_status(conn: &Connection, status: TeamStatus) -> Result<Vec<Team>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(TeamIden::Status).eq(status))
            .order_by(TeamIden::CreatedAt, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), Team::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    /// Moves a forming team into week 1. Only the first call has any effect.
    ///
    /// Returns whether this call did the activation.
    pub fn activate(conn: &Connection, id: &Id, now: DateTime<Utc>) -> Result<bool, rusqlite::Error> {
        let (sql, values) = Query::update()
            .table(TeamIden::Table)
            .values([
                (TeamIden::Status, TeamStatus::Active.into()),
                (TeamIden::StartedAt, now.into()),
                (TeamIden::CurrentWeek, 1.into()),
                (TeamIden::UpdatedAt, now.into()),
            ])
            .and_where(Expr::col(TeamIden::Id).eq(id))
            .and_where(Expr::col(TeamIden::Status).eq(TeamStatus::Forming))
            .and_where(Expr::col(TeamIden::StartedAt).is_null())
            .build_rusqlite(SqliteQueryBuilder);

        Ok(conn.execute(&sql, &*values.as_params())? == 1)
    }

    /// Writes the outcome of a weekly evaluation
    pub fn record_week(
        conn: &Connection,
        id: &Id,
        current_hp: i64,
        current_week: i64,
        status: TeamStatus,
        now: DateTime<Utc>,
    ) -> Result<(), rusqlite::Error> {
        let (sql, values) = Query::update()
            .table(TeamIden::Table)
            .values([
                (TeamIden::CurrentHp, current_hp.into()),
                (TeamIden::CurrentWeek, current_week.into()),
                (TeamIden::Status, status.into()),
                (TeamIden::UpdatedAt, now.into()),
            ])
            .and_where(Expr::col(TeamIden::Id).eq(id))
            .build_rusqlite(SqliteQueryBuilder);

        conn.execute(&sql, &*values.as_params())?;
        Ok(())
    }

    pub fn set_status(conn: &Connection, id: &Id, status: TeamStatus, now: DateTime<Utc>) -> Result<(), rusqlite::Error> {
        let (sql, values) = Query::update()
            .table(TeamIden::Table)
            .values([
                (TeamIden::Status, status.into()),
                (TeamIden::UpdatedAt, now.into()),
            ])
            .and_where(Expr::col(TeamIden::Id).eq(id))
            .build_rusqlite(SqliteQueryBuilder);

        conn.execute(&sql, &*values.as_params())?;
        Ok(())
    }
}
