use chrono::{DateTime, Utc};

use super::{Chronotype, Gender};
use crate::{feature_model_derives, feature_model_imports};

feature_model_imports!();

feature_model_derives!(
    "user",
    "../../../server/migrations/001-user/up.sql",
    /// Profile of a person known to the identity provider. `id` is the provider's subject.
    pub struct User {
        pub id: String,
        pub name: String,
        pub age: i64,
        pub gender: Gender,
        pub weight: i64,
        pub chronotype: Chronotype,
        pub avatar_url: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
);

#[cfg(feature = "backend")]
impl User {
    pub fn fetch_maybe(conn: &Connection, id: &str) -> Result<Option<User>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(UserIden::Id).eq(id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), User::from_row)
            .optional()?;
        Ok(res)
    }

    pub fn exists(conn: &Connection, id: &str) -> Result<bool, rusqlite::Error> {
        Ok(Self::fetch_maybe(conn, id)?.is_some())
    }

    pub fn update(&self, conn: &Connection) -> Result<(), rusqlite::Error> {
        let (sql, values) = Query::update()
            .table(UserIden::Table)
            .values([
                (UserIden::Name, self.name.clone().into()),
                (UserIden::Age, self.age.into()),
                (UserIden::Gender, self.gender.into()),
                (UserIden::Weight, self.weight.into()),
                (UserIden::Chronotype, self.chronotype.into()),
                (UserIden::AvatarUrl, self.avatar_url.clone().into()),
                (UserIden::UpdatedAt, self.updated_at.into()),
            ])
            .and_where(Expr::col(UserIden::Id).eq(&self.id))
            .build_rusqlite(SqliteQueryBuilder);

        conn.execute(&sql, &*values.as_params())?;
        Ok(())
    }
}
