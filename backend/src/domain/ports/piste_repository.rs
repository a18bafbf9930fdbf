//! Port for road segment persistence.

use async_trait::async_trait;

use crate::domain::{NewPiste, Piste};

use super::{StoreFailure, define_port_error};

define_port_error! {
    /// Errors raised by piste repository adapters.
    pub enum PisteRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "piste repository connection failed: {message}",
        /// A statement failed.
        Query { message: String } =>
            "piste repository query failed: {message}",
        /// A unique column already holds the submitted value.
        Duplicate { field: String } =>
            "a piste with this {field} already exists",
        /// A foreign key points at nothing.
        MissingReference { field: String } =>
            "piste {field} references a missing record",
    }
}

impl From<PisteRepositoryError> for StoreFailure {
    fn from(err: PisteRepositoryError) -> Self {
        match err {
            PisteRepositoryError::Connection { message } => Self::Unavailable(message),
            PisteRepositoryError::Query { message } => Self::Query(message),
            PisteRepositoryError::Duplicate { field } => Self::Duplicate(field),
            PisteRepositoryError::MissingReference { field } => Self::MissingReference(field),
        }
    }
}

/// Filters for listing road segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PisteQuery {
    /// Only segments in one of these communes; `None` lists everything.
    pub commune_ids: Option<Vec<i32>>,
}

/// Road segment storage. Geometry is stored and returned in UTM 28N.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PisteRepository: Send + Sync {
    /// Segments matching `query`, ordered by identifier.
    async fn list(&self, query: &PisteQuery) -> Result<Vec<Piste>, PisteRepositoryError>;

    /// Segment by identifier.
    async fn find(&self, id: i32) -> Result<Option<Piste>, PisteRepositoryError>;

    /// Insert in one statement and return the stored segment.
    async fn insert(&self, piste: &NewPiste) -> Result<Piste, PisteRepositoryError>;

    /// Overwrite the attribute columns and `updated_at`; geometry is left
    /// untouched. `None` when the row no longer exists.
    async fn update(&self, piste: &Piste) -> Result<Option<Piste>, PisteRepositoryError>;

    /// Delete by identifier; features referencing its code lose the link.
    async fn delete(&self, id: i32) -> Result<bool, PisteRepositoryError>;
}
