//! PostGIS persistence adapters built on Diesel.
//!
//! Repositories translate between Diesel rows and domain records and map
//! store failures onto the port error enums. Row structs (`models.rs`), the
//! table definitions (`schema.rs`) and the EWKB geometry binding
//! (`postgis.rs`) stay private to this module.
//!
//! ```ignore
//! use pprcollecte::outbound::persistence::{DbPool, DieselPisteRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/pprcollecte")).await?;
//! let pistes = DieselPisteRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_admin_repository;
mod diesel_error_mapping;
mod diesel_feature_repository;
mod diesel_piste_repository;
mod diesel_reference_lookup;
mod migrations;
mod models;
mod pool;
mod postgis;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_admin_repository::DieselAdminRepository;
pub use diesel_feature_repository::DieselFeatureRepository;
pub use diesel_piste_repository::DieselPisteRepository;
pub use diesel_reference_lookup::DieselReferenceLookup;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
