use std::{fmt, ops::Deref, str::FromStr};

use serde::{Deserialize, Serialize};
pub use uuid::Error as IdError;
#[cfg(feature = "backend")]
use rusqlite::{
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
    ToSql,
};

/// Time ordered identifier for rows the service creates itself.
///
/// Users are keyed by the identity provider's subject instead, which is a plain `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Id(uuid::Uuid);

impl Id {
    pub fn new() -> Self {
        uuid::Uuid::now_v7().into()
    }

    pub fn parse(value: &str) -> Result<Self, IdError> {
        uuid::Uuid::parse_str(value).map(|v| v.into())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<uuid::Uuid> for Id {
    fn from(value: uuid::Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for Id {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Deref for Id {
    type Target = uuid::Uuid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(feature = "backend")]
impl ToSql for Id {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Owned(self.to_string().into()))
    }
}

#[cfg(feature = "backend")]
impl FromSql for Id {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        uuid::Uuid::from_str(value.as_str()?)
            .map(Id::from)
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(feature = "backend")]
impl From<&Id> for sea_query::Value {
    fn from(value: &Id) -> Self {
        value.to_string().into()
    }
}

#[cfg(feature = "backend")]
impl From<Id> for sea_query::Value {
    fn from(value: Id) -> Self {
        value.to_string().into()
    }
}

#[cfg(feature = "backend")]
impl sea_query::Nullable for Id {
    fn null() -> sea_query::Value {
        sea_query::Value::String(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_sort_by_creation() {
        let first = Id::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = Id::new();
        assert!(first < second);
    }

    #[test]
    fn parse_matches_display() {
        let id = Id::new();
        assert_eq!(Id::parse(&id.to_string()).unwrap(), id);
        assert!(Id::parse("not-an-id").is_err());
    }
}
