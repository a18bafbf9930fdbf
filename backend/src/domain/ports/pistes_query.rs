//! Driving port for reading road segments.

use async_trait::async_trait;

use crate::domain::{AdminFilter, Error, Piste};

/// Road segment read use-cases. Geometry comes back in the display system.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PistesQuery: Send + Sync {
    /// Segments in `scope`, ordered by identifier.
    async fn list(&self, scope: AdminFilter) -> Result<Vec<Piste>, Error>;

    /// One segment.
    async fn get(&self, id: i32) -> Result<Piste, Error>;
}
