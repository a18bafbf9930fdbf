//! Driving port for reading accounts.

use async_trait::async_trait;

use crate::domain::{AccountProfile, AdminFilter, Error, Role};

/// Filters accepted when listing accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountsListRequest {
    /// Only accounts with this role.
    pub role: Option<Role>,
    /// Administrative scope of the owning commune.
    pub scope: AdminFilter,
}

/// Account read use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsQuery: Send + Sync {
    /// Profiles matching `request`, ordered by identifier.
    async fn list(&self, request: AccountsListRequest) -> Result<Vec<AccountProfile>, Error>;
}
