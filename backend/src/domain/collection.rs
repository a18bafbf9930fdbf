//! Plumbing shared by the record collection services.
//!
//! Listing resolves administrative filters to a set of commune ids; writing
//! verifies each non-null reference before anything reaches the store.

use serde_json::json;
use tracing::debug;

use super::fields::{dangling_reference, duplicate_value, invalid_field};
use super::ports::{
    AdminRepository, ReferenceLookup, ReferenceLookupError, ReferenceTarget, StoreFailure,
};
use super::{AdminFilter, Error};

/// Map a repository failure onto an API error.
pub(crate) fn store_error(context: &str, failure: impl Into<StoreFailure>) -> Error {
    match failure.into() {
        StoreFailure::Unavailable(message) => {
            Error::service_unavailable(format!("{context} unavailable: {message}"))
        }
        StoreFailure::Query(message) => Error::internal(format!("{context} error: {message}")),
        StoreFailure::Duplicate(field) => duplicate_value(&field),
        StoreFailure::MissingReference(field) => Error::invalid_request(format!(
            "{field} does not reference an existing record"
        ))
        .with_details(json!({ "field": field, "code": "dangling_reference" })),
    }
}

fn lookup_error(err: ReferenceLookupError) -> Error {
    match err {
        ReferenceLookupError::Connection { message } => {
            Error::service_unavailable(format!("reference lookup unavailable: {message}"))
        }
        ReferenceLookupError::Query { message } => {
            Error::internal(format!("reference lookup error: {message}"))
        }
    }
}

/// Communes selected by `filter`, or `None` when no filter applies.
pub(crate) async fn scoped_communes(
    admin: &dyn AdminRepository,
    filter: AdminFilter,
) -> Result<Option<Vec<i32>>, Error> {
    let scope = filter.resolve()?;
    if scope.is_unscoped() {
        return Ok(None);
    }
    let communes = admin
        .communes(&scope)
        .await
        .map_err(|err| store_error("administrative repository", err))?;
    debug!(?scope, matched = communes.len(), "resolved administrative scope");
    Ok(Some(communes.into_iter().map(|c| c.id).collect()))
}

/// Fail with a dangling-reference error unless `key` exists.
pub(crate) async fn ensure_reference(
    lookup: &dyn ReferenceLookup,
    target: ReferenceTarget,
    field: &str,
    key: Option<i32>,
) -> Result<(), Error> {
    let Some(key) = key else {
        return Ok(());
    };
    if key <= 0 {
        return Err(invalid_field(field, "invalid_id", format!("{field} must be a positive integer")));
    }
    if lookup.exists(target, key).await.map_err(lookup_error)? {
        Ok(())
    } else {
        Err(dangling_reference(field, i64::from(key)))
    }
}
