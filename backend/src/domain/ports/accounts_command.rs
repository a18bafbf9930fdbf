//! Driving port for account administration.

use async_trait::async_trait;

use crate::domain::{AccountDraft, AccountPatch, AccountProfile, Error};

/// Account write use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsCommand: Send + Sync {
    /// Create an account, hashing its password.
    async fn create(&self, draft: AccountDraft) -> Result<AccountProfile, Error>;

    /// Apply a partial update.
    async fn update(&self, id: i32, patch: AccountPatch) -> Result<AccountProfile, Error>;

    /// Delete an account.
    async fn delete(&self, id: i32) -> Result<(), Error>;
}
