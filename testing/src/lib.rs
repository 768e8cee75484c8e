//! Shared test fixtures for the Sparks workspace.
//!
//! - A single PostgreSQL testcontainer per test process, lazily started and
//!   skipped when Docker is unavailable
//! - Unique-name helpers for isolating tests that share that database
//! - Sample records and completion payloads

mod fixtures;

pub use fixtures::*;
