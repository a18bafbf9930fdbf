//! Ports at the edge of the hexagon.
//!
//! Driven ports (repositories, reference lookups) are implemented by
//! outbound adapters; driving ports are implemented by domain services and
//! called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;
pub use macros::StoreFailure;

mod account_repository;
mod accounts_command;
mod accounts_query;
mod admin_repository;
mod communes_command;
mod communes_query;
mod feature_repository;
mod features_command;
mod features_query;
mod login_service;
mod piste_repository;
mod pistes_command;
mod pistes_query;
mod reference_lookup;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use accounts_command::MockAccountsCommand;
pub use accounts_command::AccountsCommand;
#[cfg(test)]
pub use accounts_query::MockAccountsQuery;
pub use accounts_query::{AccountsListRequest, AccountsQuery};
#[cfg(test)]
pub use admin_repository::MockAdminRepository;
pub use admin_repository::{AdminRepository, AdminRepositoryError};
#[cfg(test)]
pub use communes_command::MockCommunesCommand;
pub use communes_command::CommunesCommand;
#[cfg(test)]
pub use communes_query::MockCommunesQuery;
pub use communes_query::CommunesQuery;
#[cfg(test)]
pub use feature_repository::MockFeatureRepository;
pub use feature_repository::{FeatureRepository, FeatureRepositoryError};
#[cfg(test)]
pub use features_command::MockFeaturesCommand;
pub use features_command::FeaturesCommand;
#[cfg(test)]
pub use features_query::MockFeaturesQuery;
pub use features_query::{FeaturesListRequest, FeaturesQuery};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use piste_repository::MockPisteRepository;
pub use piste_repository::{PisteQuery, PisteRepository, PisteRepositoryError};
#[cfg(test)]
pub use pistes_command::MockPistesCommand;
pub use pistes_command::PistesCommand;
#[cfg(test)]
pub use pistes_query::MockPistesQuery;
pub use pistes_query::PistesQuery;
#[cfg(test)]
pub use reference_lookup::MockReferenceLookup;
pub use reference_lookup::{ReferenceLookup, ReferenceLookupError, ReferenceTarget};
