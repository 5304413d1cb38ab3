use chrono::{DateTime, Utc};

use super::Role;
#[cfg(feature = "backend")]
use super::{TeamIden, TeamStatus};
use crate::{feature_model_derives, feature_model_imports, types::Id};

feature_model_imports!();

feature_model_derives!(
    "team_member",
    "../../../server/migrations/003-team_member/up.sql",
    pub struct TeamMember {
        pub id: Id,
        pub team_id: Id,
        pub user_id: String,
        pub role: Role,
        pub joined_at: DateTime<Utc>,
        /// Scales the member's weekly target. Values <= 0 are treated as 1.0.
        pub target_multiplier: f64,
    }
);

impl TeamMember {
    pub fn new(team_id: Id, user_id: String, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            id: Id::new(),
            team_id,
            user_id,
            role,
            joined_at: now,
            target_multiplier: 1.0,
        }
    }

    pub fn effective_multiplier(&self) -> f64 {
        if self.target_multiplier > 0.0 {
            self.target_multiplier
        } else {
            1.0
        }
    }
}

#[cfg(feature = "backend")]
impl TeamMember {
    pub fn fetch_by_team(conn: &Connection, team_id: &Id) -> Result<Vec<TeamMember>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(TeamMemberIden::TeamId).eq(team_id))
            .order_by(TeamMemberIden::JoinedAt, Order::Asc)
            .order_by(TeamMemberIden::Id, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), TeamMember::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn fetch_membership(
        conn: &Connection,
        team_id: &Id,
        user_id: &str,
    ) -> Result<Option<TeamMember>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(TeamMemberIden::TeamId).eq(team_id))
            .and_where(Expr::col(TeamMemberIden::UserId).eq(user_id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), TeamMember::from_row)
            .optional()?;
        Ok(res)
    }

    /// Membership of the user in a team that is still forming or active
    pub fn fetch_live_membership(conn: &Connection, user_id: &str) -> Result<Option<TeamMember>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(TeamMemberIden::UserId).eq(user_id))
            .and_where(
                Expr::col(TeamMemberIden::TeamId).in_subquery(
                    Query::select()
                        .column(TeamIden::Id)
                        .from(TeamIden::Table)
                        .and_where(Expr::col(TeamIden::Status).is_in(TeamStatus::LIVE))
                        .to_owned(),
                ),
            )
            .order_by(TeamMemberIden::JoinedAt, Order::Desc)
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), TeamMember::from_row)
            .optional()?;
        Ok(res)
    }

    pub fn count_by_team(conn: &Connection, team_id: &Id) -> Result<i64, rusqlite::Error> {
        let (sql, values) = Query::select()
            .expr(Func::count(Expr::col(TeamMemberIden::Id)))
            .from(TeamMemberIden::Table)
            .and_where(Expr::col(TeamMemberIden::TeamId).eq(team_id))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.query_row(&*values.as_params(), |row| row.get(0))?;
        Ok(res)
    }

    pub fn delete_by_team(conn: &Connection, team_id: &Id) -> Result<usize, rusqlite::Error> {
        let (sql, values) = Query::delete()
            .from_table(TeamMemberIden::Table)
            .and_where(Expr::col(TeamMemberIden::TeamId).eq(team_id))
            .build_rusqlite(SqliteQueryBuilder);

        conn.execute(&sql, &*values.as_params())
    }
}
