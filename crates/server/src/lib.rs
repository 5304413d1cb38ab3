pub mod auth;
pub mod cli;
pub mod db;
pub mod engine;
pub mod routes;

mod state;
pub use state::*;
