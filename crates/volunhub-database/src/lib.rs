//! # volunhub-database
//!
//! PostgreSQL data layer for VolunHub: the connection/transaction gateway,
//! the embedded migration runner, and one repository per store.
//!
//! Every operation that writes to more than one table runs inside
//! [`Database::with_transaction`] and either commits all of its writes or
//! none of them.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::Database;
pub use store::DataStore;
