use chrono::{DateTime, Utc};

use crate::{feature_model_derives, feature_model_imports, types::Id};

feature_model_imports!();

feature_model_derives!(
    "invite_code",
    "../../../server/migrations/004-invite_code/up.sql",
    pub struct InviteCode {
        pub code: String,
        pub team_id: Id,
        pub created_by: String,
        pub expires_at: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
    }
);

impl InviteCode {
    /// A code is usable up to and including its expiry instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(feature = "backend")]
impl InviteCode {
    pub fn fetch_maybe(conn: &Connection, code: &str) -> Result<Option<InviteCode>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(InviteCodeIden::Code).eq(code))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), InviteCode::from_row)
            .optional()?;
        Ok(res)
    }

    pub fn delete(conn: &Connection, code: &str) -> Result<usize, rusqlite::Error> {
        let (sql, values) = Query::delete()
            .from_table(InviteCodeIden::Table)
            .and_where(Expr::col(InviteCodeIden::Code).eq(code))
            .build_rusqlite(SqliteQueryBuilder);

        conn.execute(&sql, &*values.as_params())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn expiry_is_inclusive() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let code = InviteCode {
            code: "ABC123".into(),
            team_id: Id::new(),
            created_by: "leader".into(),
            expires_at: created + Duration::hours(24),
            created_at: created,
        };
        assert!(!code.is_expired(created + Duration::hours(24)));
        assert!(code.is_expired(created + Duration::hours(25)));
    }
}
