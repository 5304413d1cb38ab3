use chrono::{DateTime, Utc};

use crate::{feature_model_derives, feature_model_imports, geo::Coordinate, tracking::TrackPoint, types::Id};

feature_model_imports!();

feature_model_derives!(
    "gps_point",
    "../../../server/migrations/008-gps_point/up.sql",
    pub struct GpsPoint {
        pub id: Id,
        pub activity_id: Id,
        /// Device supplied token used to drop resent points
        pub client_id: Option<String>,
        pub latitude: f64,
        pub longitude: f64,
        /// Reported horizontal accuracy in meters
        pub accuracy: f64,
        pub timestamp: DateTime<Utc>,
    }
);

impl TrackPoint for GpsPoint {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    fn accuracy(&self) -> f64 {
        self.accuracy
    }
}

#[cfg(feature = "backend")]
impl GpsPoint {
    pub fn fetch_by_activity(conn: &Connection, activity_id: &Id) -> Result<Vec<GpsPoint>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(GpsPointIden::ActivityId).eq(activity_id))
            .order_by(GpsPointIden::Timestamp, Order::Asc)
            .order_by(GpsPointIden::Id, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), GpsPoint::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    /// Latest point of the activity whose accuracy is good enough to measure from
    pub fn fetch_last_usable(
        conn: &Connection,
        activity_id: &Id,
        max_accuracy: f64,
    ) -> Result<Option<GpsPoint>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(GpsPointIden::ActivityId).eq(activity_id))
            .and_where(Expr::col(GpsPointIden::Accuracy).lte(max_accuracy))
            .order_by(GpsPointIden::Timestamp, Order::Desc)
            .order_by(GpsPointIden::Id, Order::Desc)
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), GpsPoint::from_row)
            .optional()?;
        Ok(res)
    }

    pub fn client_id_exists(conn: &Connection, client_id: &str) -> Result<bool, rusqlite::Error> {
        let (sql, values) = Query::select()
            .expr(Func::count(Expr::col(GpsPointIden::Id)))
            .from(GpsPointIden::Table)
            .and_where(Expr::col(GpsPointIden::ClientId).eq(client_id))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let count: i64 = stmt.query_row(&*values.as_params(), |row| row.get(0))?;
        Ok(count > 0)
    }
}
