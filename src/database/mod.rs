pub mod connection;
pub mod leagues;
pub mod matches;
pub mod players;
pub mod setup;

pub use connection::{DbConn, DbPool, create_memory_pool, create_pool, get_connection};
