//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed records collected in the field (road
//! segments, infrastructure features, accounts, the administrative
//! hierarchy), the geometry pipeline that normalises their coordinates, and
//! the services that implement the driving ports.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - [`geometry`] — reference systems, builder and projector.
//! - [`ports`] — driving and driven port traits.

pub mod error;
pub mod geometry;
pub mod ports;

mod account;
mod account_service;
mod admin;
mod auth;
mod collection;
mod commune_service;
mod feature;
mod feature_service;
mod fields;
mod piste;
mod piste_service;
mod trace_id;

#[cfg(test)]
mod test_fixtures;

pub use self::account::{
    Account, AccountDraft, AccountInput, AccountPatch, AccountProfile, AccountQuery,
    AccountValidationError, Email, NewAccount, Role,
};
pub use self::account_service::AccountService;
pub use self::admin::{AdminFilter, AdminScope, CommuneSummary, NewCommune, sort_communes};
pub use self::auth::{LoginCredentials, LoginValidationError, PasswordHash};
pub use self::commune_service::CommuneService;
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::feature::{
    AttributeField, AttributeType, Feature, FeatureChanges, FeatureKind, FeatureQuery,
    FeatureRecordMapper, FeatureSchema, GeometrySource, NewFeature, SourceCoordinates,
    UnknownFeatureKind,
};
pub use self::feature_service::FeatureService;
pub use self::fields::Presence;
pub use self::piste::{NewPiste, Piste, PisteAttributes, PisteChanges};
pub use self::piste_service::PisteService;
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use pprcollecte::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such piste"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
