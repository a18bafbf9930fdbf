//! Port for infrastructure feature persistence.

use async_trait::async_trait;

use crate::domain::{Feature, FeatureKind, FeatureQuery, NewFeature};

use super::{StoreFailure, define_port_error};

define_port_error! {
    /// Errors raised by feature repository adapters.
    pub enum FeatureRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "feature repository connection failed: {message}",
        /// A statement failed.
        Query { message: String } =>
            "feature repository query failed: {message}",
        /// A foreign key points at nothing.
        MissingReference { field: String } =>
            "feature {field} references a missing record",
        /// A stored row could not be decoded.
        Corrupt { message: String } =>
            "stored feature is unreadable: {message}",
    }
}

impl From<FeatureRepositoryError> for StoreFailure {
    fn from(err: FeatureRepositoryError) -> Self {
        match err {
            FeatureRepositoryError::Connection { message } => Self::Unavailable(message),
            FeatureRepositoryError::Query { message }
            | FeatureRepositoryError::Corrupt { message } => Self::Query(message),
            FeatureRepositoryError::MissingReference { field } => Self::MissingReference(field),
        }
    }
}

/// Storage for every feature subtype, discriminated by [`FeatureKind`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeatureRepository: Send + Sync {
    /// Features of `kind` matching `query`, ordered by identifier.
    async fn list(
        &self,
        kind: FeatureKind,
        query: &FeatureQuery,
    ) -> Result<Vec<Feature>, FeatureRepositoryError>;

    /// Feature of `kind` by identifier.
    async fn find(&self, kind: FeatureKind, id: i32)
    -> Result<Option<Feature>, FeatureRepositoryError>;

    /// Insert in one statement and return the stored feature.
    async fn insert(&self, feature: &NewFeature) -> Result<Feature, FeatureRepositoryError>;

    /// Overwrite every mutable column. `None` when the row no longer exists.
    async fn update(&self, feature: &Feature) -> Result<Option<Feature>, FeatureRepositoryError>;

    /// Delete by identifier; `false` when nothing of `kind` was deleted.
    async fn delete(&self, kind: FeatureKind, id: i32) -> Result<bool, FeatureRepositoryError>;
}
