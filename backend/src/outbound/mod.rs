//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostGIS-backed repositories using Diesel ORM
//! - **memory**: a process-local store honouring the same keys and delete
//!   rules, used when no database is configured and by integration tests
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod memory;
pub mod persistence;
