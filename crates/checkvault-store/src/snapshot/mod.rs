//! Snapshot executor
//!
//! Produces one consistent, self-contained copy of the store per tick. The
//! store is reached through `StoreConnector` so the executor does not care
//! whether it is talking to SQLite or to a test double.

pub mod connector;
pub mod executor;

pub use connector::{SqliteConnector, StoreConnection, StoreConnector};
pub use executor::{allocate_name, execute_snapshot};
