//! Record store implementations for Sparks.
//!
//! - [`PgRecordStore`]: PostgreSQL via sqlx
//! - [`InMemoryRecordStore`]: process-local, for tests

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRecordStore;
pub use postgres::PgRecordStore;
