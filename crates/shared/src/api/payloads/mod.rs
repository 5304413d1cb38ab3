mod activity;
pub use activity::*;
mod evaluation;
pub use evaluation::*;
mod gym;
pub use gym::*;
mod prediction;
pub use prediction::*;
mod team;
pub use team::*;
mod user;
pub use user::*;
