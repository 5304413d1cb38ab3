use chrono::{DateTime, Utc};

use crate::{feature_model_derives, feature_model_imports, types::Id};

feature_model_imports!();

feature_model_derives!(
    "disband_vote",
    "../../../server/migrations/010-disband_vote/up.sql",
    pub struct DisbandVote {
        pub id: Id,
        pub team_id: Id,
        pub user_id: String,
        pub created_at: DateTime<Utc>,
    }
);

#[cfg(feature = "backend")]
impl DisbandVote {
    pub fn fetch_by_team(conn: &Connection, team_id: &Id) -> Result<Vec<DisbandVote>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(DisbandVoteIden::TeamId).eq(team_id))
            .order_by(DisbandVoteIden::CreatedAt, Order::Asc)
            .order_by(DisbandVoteIden::Id, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), DisbandVote::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn fetch_maybe(
        conn: &Connection,
        team_id: &Id,
        user_id: &str,
    ) -> Result<Option<DisbandVote>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(DisbandVoteIden::TeamId).eq(team_id))
            .and_where(Expr::col(DisbandVoteIden::UserId).eq(user_id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), DisbandVote::from_row)
            .optional()?;
        Ok(res)
    }

    pub fn delete(conn: &Connection, team_id: &Id, user_id: &str) -> Result<usize, rusqlite::Error> {
        let (sql, values) = Query::delete()
            .from_table(DisbandVoteIden::Table)
            .and_where(Expr::col(DisbandVoteIden::TeamId).eq(team_id))
            .and_where(Expr::col(DisbandVoteIden::UserId).eq(user_id))
            .build_rusqlite(SqliteQueryBuilder);

        conn.execute(&sql, &*values.as_params())
    }

    pub fn delete_by_team(conn: &Connection, team_id: &Id) -> Result<usize, rusqlite::Error> {
        let (sql, values) = Query::delete()
            .from_table(DisbandVoteIden::Table)
            .and_where(Expr::col(DisbandVoteIden::TeamId).eq(team_id))
            .build_rusqlite(SqliteQueryBuilder);

        conn.execute(&sql, &*values.as_params())
    }
}
