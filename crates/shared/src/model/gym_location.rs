use chrono::{DateTime, Utc};

use crate::{feature_model_derives, feature_model_imports, geo::Coordinate, types::Id};

feature_model_imports!();

feature_model_derives!(
    "gym_location",
    "../../../server/migrations/006-gym_location/up.sql",
    pub struct GymLocation {
        pub id: Id,
        pub user_id: String,
        pub name: String,
        pub latitude: f64,
        pub longitude: f64,
        pub radius_m: i64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
);

impl GymLocation {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Whether `position` lies within the check-in radius, boundary included
    pub fn covers(&self, position: &Coordinate) -> bool {
        self.coordinate().distance_km(position) * 1000.0 <= self.radius_m as f64
    }
}

#[cfg(feature = "backend")]
impl GymLocation {
    pub fn fetch_maybe(conn: &Connection, id: &Id) -> Result<Option<GymLocation>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(GymLocationIden::Id).eq(id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), GymLocation::from_row)
            .optional()?;
        Ok(res)
    }

    pub fn fetch_by_user(conn: &Connection, user_id: &str) -> Result<Vec<GymLocation>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(GymLocationIden::UserId).eq(user_id))
            .order_by(GymLocationIden::CreatedAt, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), GymLocation::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn delete(conn: &Connection, id: &Id) -> Result<usize, rusqlite::Error> {
        let (sql, values) = Query::delete()
            .from_table(GymLocationIden::Table)
            .and_where(Expr::col(GymLocationIden::Id).eq(id))
            .build_rusqlite(SqliteQueryBuilder);

        conn.execute(&sql, &*values.as_params())
    }
}
