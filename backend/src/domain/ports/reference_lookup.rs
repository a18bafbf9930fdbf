//! Port answering "does this referenced record exist?".
//!
//! Writes check their non-null references through this port so a dangling
//! value is reported against the field that carried it. Foreign keys in the
//! store enforce the same rule.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by reference lookups.
    pub enum ReferenceLookupError {
        /// The store could not be reached.
        Connection { message: String } =>
            "reference lookup connection failed: {message}",
        /// A statement failed.
        Query { message: String } =>
            "reference lookup failed: {message}",
    }
}

/// Kinds of record a write may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceTarget {
    /// A commune by identifier.
    Commune,
    /// A prefecture by identifier.
    Prefecture,
    /// An account by identifier.
    Account,
    /// A road segment by its `code_piste`.
    PisteCode,
}

/// Existence checks for referenced records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    /// Whether a `target` record keyed by `key` exists.
    async fn exists(&self, target: ReferenceTarget, key: i32) -> Result<bool, ReferenceLookupError>;
}
