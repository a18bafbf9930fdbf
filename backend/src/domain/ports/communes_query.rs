//! Driving port for commune search.

use async_trait::async_trait;

use crate::domain::{AdminFilter, CommuneSummary, Error};

/// Commune search use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunesQuery: Send + Sync {
    /// Communes in `scope` with parent names, ordered by name then id.
    async fn search(&self, scope: AdminFilter) -> Result<Vec<CommuneSummary>, Error>;
}
