use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use deadpool_sqlite::{Object, Pool};
use shared::api::error::ServerError;
use tracing::warn;

/// A pooled SQLite connection checked out for the length of one request. Work on it goes through
/// [`Object::interact`] so the blocking rusqlite calls stay off the async executor.
#[derive(Debug)]
pub struct DatabaseConnection(pub Object);

#[async_trait]
impl<S> FromRequestParts<S> for DatabaseConnection
where
    S: Send + Sync,
    Pool: FromRef<S>,
{
    type Rejection = ServerError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = Pool::from_ref(state);
        match pool.get().await {
            Ok(conn) => Ok(DatabaseConnection(conn)),
            Err(e) => {
                let status = pool.status();
                warn!(
                    size = status.size,
                    available = status.available,
                    "Couldn't check out a database connection: {e}"
                );
                Err(e.into())
            }
        }
    }
}
