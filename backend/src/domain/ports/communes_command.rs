//! Driving port for commune creation.

use async_trait::async_trait;

use crate::domain::{CommuneSummary, Error, NewCommune};

/// Commune creation use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunesCommand: Send + Sync {
    /// Create a commune under an existing prefecture.
    async fn create(&self, commune: NewCommune) -> Result<CommuneSummary, Error>;
}
