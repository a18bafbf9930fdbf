//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::{Account, AccountQuery, NewAccount};

use super::{StoreFailure, define_port_error};

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "account repository connection failed: {message}",
        /// A statement failed.
        Query { message: String } =>
            "account repository query failed: {message}",
        /// A unique column already holds the submitted value.
        Duplicate { field: String } =>
            "an account with this {field} already exists",
        /// A foreign key points at nothing.
        MissingReference { field: String } =>
            "account {field} references a missing record",
    }
}

impl From<AccountRepositoryError> for StoreFailure {
    fn from(err: AccountRepositoryError) -> Self {
        match err {
            AccountRepositoryError::Connection { message } => Self::Unavailable(message),
            AccountRepositoryError::Query { message } => Self::Query(message),
            AccountRepositoryError::Duplicate { field } => Self::Duplicate(field),
            AccountRepositoryError::MissingReference { field } => Self::MissingReference(field),
        }
    }
}

/// Account storage. Unique `mail` is enforced by the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Accounts matching `query`, ordered by identifier.
    async fn list(&self, query: &AccountQuery) -> Result<Vec<Account>, AccountRepositoryError>;

    /// Account by identifier.
    async fn find_by_id(&self, id: i32) -> Result<Option<Account>, AccountRepositoryError>;

    /// Account by exact mail.
    async fn find_by_mail(&self, mail: &str) -> Result<Option<Account>, AccountRepositoryError>;

    /// Insert and return the stored account.
    ///
    /// Fails with [`AccountRepositoryError::Duplicate`] when `mail` is taken.
    async fn insert(&self, account: &NewAccount) -> Result<Account, AccountRepositoryError>;

    /// Overwrite every mutable column. `None` when the row no longer exists.
    async fn update(&self, account: &Account) -> Result<Option<Account>, AccountRepositoryError>;

    /// Delete by identifier; `false` when nothing was deleted.
    async fn delete(&self, id: i32) -> Result<bool, AccountRepositoryError>;
}
