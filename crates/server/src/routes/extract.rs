use axum::extract::{FromRequest, FromRequestParts};
use shared::{api::error::ServerError, types::Id};

/// JSON body whose rejection renders as a [`ServerError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejection renders as a [`ServerError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ServerError))]
pub struct ApiQuery<T>(pub T);

/// Path parameter holding an id. A malformed id can't name anything, so it is reported with the
/// caller's not found error.
pub fn parse_id<E: Into<ServerError>>(raw: &str, not_found: E) -> Result<Id, ServerError> {
    Id::parse(raw).map_err(|_| not_found.into())
}
