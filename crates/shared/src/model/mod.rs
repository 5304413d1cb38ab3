#[cfg(feature = "backend")]
use sea_query::{Iden, Query, SelectStatement};

mod macros;

mod enums;
pub use enums::*;

mod activity;
pub use activity::*;
mod disband_vote;
pub use disband_vote::*;
mod goal;
pub use goal::*;
mod gps_point;
pub use gps_point::*;
mod gym_location;
pub use gym_location::*;
mod invite_code;
pub use invite_code::*;
mod team;
pub use team::*;
mod team_member;
pub use team_member::*;
mod user;
pub use user::*;
mod weekly_evaluation;
pub use weekly_evaluation::*;

/// Column listing for the row structs so queries don't have to repeat every field.
#[cfg(feature = "backend")]
pub trait Model: exemplar::Model + Sized {
    type Iden: Iden + 'static;

    fn table_iden() -> Self::Iden;
    fn column_idens() -> Vec<Self::Iden>;

    fn create(&self, conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
        exemplar::Model::insert(self, conn)
    }

    fn select_star() -> SelectStatement {
        Query::select()
            .columns(Self::column_idens())
            .from(Self::table_iden())
            .to_owned()
    }
}

/// Returns true when the error is sqlite rejecting a duplicate key.
#[cfg(feature = "backend")]
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}
