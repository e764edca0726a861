//! SQLite connection for Gridline

mod connection;
mod convert;

pub use connection::SqliteConnection;
