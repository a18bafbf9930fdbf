//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Credentials did not match.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The database could not be reached.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "missing required field: mail")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Field-level details such as `{"field": "mail", "code": "duplicate"}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::AccountProfile`].
#[derive(ToSchema)]
#[schema(as = crate::domain::AccountProfile)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AccountProfileSchema {
    #[schema(example = 4)]
    id: i32,
    #[schema(example = "Camara")]
    nom: String,
    #[schema(example = "Aissatou")]
    prenom: String,
    #[schema(example = "a.camara@pprcollecte.gn")]
    mail: String,
    /// One of `user`, `admin`, `super_admin`.
    #[schema(example = "user")]
    role: String,
    communes_rurales_id: Option<i32>,
}

/// OpenAPI schema for [`crate::domain::CommuneSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::CommuneSummary)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CommuneSummarySchema {
    id: i32,
    #[schema(example = "Bambaya")]
    nom: String,
    prefecture_id: Option<i32>,
    prefecture_nom: Option<String>,
    region_id: Option<i32>,
    region_nom: Option<String>,
}

/// A GeoJSON `Feature` carrying an `srid` foreign member.
#[derive(ToSchema)]
#[schema(as = GeoJsonFeature)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct GeoJsonFeatureSchema {
    #[schema(example = "Feature")]
    r#type: String,
    id: i32,
    /// EPSG code of the coordinates: 32628 on piste creation, 4326 otherwise.
    #[schema(example = 4326)]
    srid: i32,
    #[schema(value_type = Object)]
    geometry: serde_json::Value,
    #[schema(value_type = Object)]
    properties: serde_json::Value,
}

/// A GeoJSON `FeatureCollection`.
#[derive(ToSchema)]
#[schema(as = GeoJsonFeatureCollection)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FeatureCollectionSchema {
    #[schema(example = "FeatureCollection")]
    r#type: String,
    features: Vec<GeoJsonFeatureSchema>,
}

/// Free-form survey record.
///
/// Pistes take a GeoJSON `geom` line and an optional `srid`; infrastructure
/// subtypes take their own coordinate fields. Other keys are attributes.
#[derive(ToSchema)]
#[schema(as = SurveyRecord)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SurveyRecordSchema {
    #[schema(value_type = Option<Object>)]
    geom: Option<serde_json::Value>,
    #[schema(example = 4326)]
    srid: Option<i32>,
    code_piste: Option<i32>,
    login_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_schema_has_expected_name() {
        let schema_json = schema_to_json::<ErrorSchema>();
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("trace_id"));
    }

    #[test]
    fn error_code_schema_lists_every_code() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn account_schema_never_exposes_password() {
        let schema_json = schema_to_json::<AccountProfileSchema>();
        assert!(schema_json.contains("communes_rurales_id"));
        assert!(!schema_json.contains("mdp"));
    }

    #[test]
    fn feature_schema_documents_srid() {
        let schema_json = schema_to_json::<GeoJsonFeatureSchema>();
        assert!(schema_json.contains("srid"));
    }
}
