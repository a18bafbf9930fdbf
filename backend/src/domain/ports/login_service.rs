//! Driving port for credential checks.
//!
//! Inbound adapters authenticate through this trait so handler tests can
//! substitute a double instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{AccountProfile, Error, LoginCredentials};

/// Authentication use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Return the account profile when `credentials` match.
    ///
    /// Unknown mail is [`crate::domain::ErrorCode::NotFound`]; a password
    /// mismatch is [`crate::domain::ErrorCode::Unauthorized`].
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AccountProfile, Error>;
}
