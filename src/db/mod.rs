// src/db/mod.rs
//
// Database module
//
// Provides:
// - Connection pooling
// - Schema migrations
// - Async bridge and scoped transactions

pub mod connection;
pub mod migrations;
pub mod transaction;

pub use connection::{
    create_connection_pool, ensure_active, get_connection, run_blocking, ConnectionPool,
    PooledConn,
};

pub use migrations::initialize_database;

pub use transaction::{within_transaction, TxOutcome};
