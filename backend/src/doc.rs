//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint of the inbound layer (accounts, communes,
//!   pistes, infrastructure subtypes, health)
//! - **Schemas**: wrappers such as [`ErrorSchema`] and
//!   [`AccountProfileSchema`] that describe domain types without coupling
//!   them to utoipa
//!
//! The generated specification is served by Swagger UI in debug builds and
//! printed by `cargo run --bin openapi-dump`.

use crate::inbound::http::communes::CommuneRequest;
use crate::inbound::http::schemas::{
    AccountProfileSchema, CommuneSummarySchema, ErrorCodeSchema, ErrorSchema,
    FeatureCollectionSchema, GeoJsonFeatureSchema, SurveyRecordSchema,
};
use crate::inbound::http::users::{AccountRequest, LoginRequest};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "pprcollecte API",
        description = "Field collection of rural road segments and the infrastructure surveyed along them."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::list_login_accounts,
        crate::inbound::http::users::list_accounts,
        crate::inbound::http::users::create_account,
        crate::inbound::http::users::update_account,
        crate::inbound::http::users::delete_account,
        crate::inbound::http::communes::search_communes,
        crate::inbound::http::communes::create_commune,
        crate::inbound::http::pistes::list_pistes,
        crate::inbound::http::pistes::create_piste,
        crate::inbound::http::pistes::get_piste,
        crate::inbound::http::pistes::update_piste,
        crate::inbound::http::pistes::delete_piste,
        crate::inbound::http::features::list_features,
        crate::inbound::http::features::create_feature,
        crate::inbound::http::features::get_feature,
        crate::inbound::http::features::update_feature,
        crate::inbound::http::features::delete_feature,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        AccountProfileSchema,
        AccountRequest,
        CommuneRequest,
        CommuneSummarySchema,
        ErrorCodeSchema,
        ErrorSchema,
        FeatureCollectionSchema,
        GeoJsonFeatureSchema,
        LoginRequest,
        SurveyRecordSchema,
    )),
    tags(
        (name = "users", description = "Accounts and login"),
        (name = "communes", description = "Administrative hierarchy"),
        (name = "pistes", description = "Surveyed road segments"),
        (name = "features", description = "Infrastructure recorded along the segments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
