//! Port for the administrative hierarchy.

use async_trait::async_trait;

use crate::domain::{AdminScope, CommuneSummary, NewCommune};

use super::{StoreFailure, define_port_error};

define_port_error! {
    /// Errors raised by administrative hierarchy adapters.
    pub enum AdminRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "administrative repository connection failed: {message}",
        /// A statement failed.
        Query { message: String } =>
            "administrative repository query failed: {message}",
        /// A foreign key points at nothing.
        MissingReference { field: String } =>
            "commune {field} references a missing record",
    }
}

impl From<AdminRepositoryError> for StoreFailure {
    fn from(err: AdminRepositoryError) -> Self {
        match err {
            AdminRepositoryError::Connection { message } => Self::Unavailable(message),
            AdminRepositoryError::Query { message } => Self::Query(message),
            AdminRepositoryError::MissingReference { field } => Self::MissingReference(field),
        }
    }
}

/// Read access to regions, prefectures and communes, plus commune creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Communes satisfying every filter in `scope`, with parent names,
    /// ordered by name then identifier.
    async fn communes(&self, scope: &AdminScope)
    -> Result<Vec<CommuneSummary>, AdminRepositoryError>;

    /// Insert a commune and return it with its parent names.
    async fn insert_commune(
        &self,
        commune: &NewCommune,
    ) -> Result<CommuneSummary, AdminRepositoryError>;
}
