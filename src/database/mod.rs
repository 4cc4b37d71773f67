//! Connection pool and migration helpers.

mod pool;

pub use pool::{Database, DatabaseError};
