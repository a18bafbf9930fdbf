//! Infrastructure feature handlers, one route family for every subtype.
//!
//! ```text
//! POST /api/ponts {"x_pont":-13.2,"y_pont":10.1,"code_piste":12,"nom":"Pont de Kaba"}
//! GET /api/bacs?region_id=1&code_piste=12
//! ```
//!
//! The `{subtype}` segment is the subtype slug; unknown slugs are 404.
//! These routes must be registered after every fixed path under `/api`.

use actix_web::{HttpResponse, delete, get, post, put, web};
use geojson::{Feature as GeoJsonFeature, FeatureCollection};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::domain::ports::FeaturesListRequest;
use crate::domain::AdminFilter;
use crate::inbound::http::ApiResult;
use crate::inbound::http::collections::{infrastructure_collection, infrastructure_feature};
use crate::inbound::http::schemas::{
    ErrorSchema, FeatureCollectionSchema, GeoJsonFeatureSchema, SurveyRecordSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{object_body, parse_feature_kind};

/// Query parameters for `GET /api/{subtype}`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeatureListParams {
    /// Only features on road segments of this commune.
    pub communes_rurales_id: Option<i32>,
    /// Only features on road segments of this prefecture.
    pub prefecture_id: Option<i32>,
    /// Only features on road segments of this region.
    pub region_id: Option<i32>,
    /// Only features on this road segment.
    pub code_piste: Option<i32>,
}

impl From<FeatureListParams> for FeaturesListRequest {
    fn from(params: FeatureListParams) -> Self {
        Self {
            scope: AdminFilter::default()
                .with_commune(params.communes_rurales_id)
                .with_prefecture(params.prefecture_id)
                .with_region(params.region_id),
            code_piste: params.code_piste,
        }
    }
}

/// Features of one subtype.
#[utoipa::path(
    get,
    path = "/api/{subtype}",
    params(
        ("subtype" = String, Path, description = "Subtype slug, e.g. `ponts` or `bacs`"),
        FeatureListParams
    ),
    responses(
        (status = 200, description = "Features in WGS 84", body = FeatureCollectionSchema),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 404, description = "Unknown subtype", body = ErrorSchema)
    ),
    tags = ["infrastructures"],
    operation_id = "listFeatures"
)]
#[get("/{subtype}")]
pub async fn list_features(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    params: web::Query<FeatureListParams>,
) -> ApiResult<web::Json<FeatureCollection>> {
    let kind = parse_feature_kind(&path)?;
    let features = state
        .features_query
        .list(kind, FeaturesListRequest::from(params.into_inner()))
        .await?;
    Ok(web::Json(infrastructure_collection(&features)))
}

/// Record a feature from its source coordinates and attributes.
#[utoipa::path(
    post,
    path = "/api/{subtype}",
    params(("subtype" = String, Path, description = "Subtype slug")),
    request_body = SurveyRecordSchema,
    responses(
        (status = 201, description = "Feature recorded", body = GeoJsonFeatureSchema),
        (status = 400, description = "Invalid coordinates, attribute or reference", body = ErrorSchema),
        (status = 404, description = "Unknown subtype", body = ErrorSchema)
    ),
    tags = ["infrastructures"],
    operation_id = "createFeature"
)]
#[post("/{subtype}")]
pub async fn create_feature(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let kind = parse_feature_kind(&path)?;
    let feature = state
        .features
        .create(kind, object_body(payload.into_inner())?)
        .await?;
    info!(kind = %kind, feature_id = feature.id, "feature recorded");
    Ok(HttpResponse::Created().json(infrastructure_feature(&feature)))
}

/// One feature.
#[utoipa::path(
    get,
    path = "/api/{subtype}/{id}",
    params(
        ("subtype" = String, Path, description = "Subtype slug"),
        ("id" = i32, Path, description = "Feature identifier")
    ),
    responses(
        (status = 200, description = "Feature", body = GeoJsonFeatureSchema),
        (status = 404, description = "Unknown subtype or feature", body = ErrorSchema)
    ),
    tags = ["infrastructures"],
    operation_id = "getFeature"
)]
#[get("/{subtype}/{id}")]
pub async fn get_feature(
    state: web::Data<HttpState>,
    path: web::Path<(String, i32)>,
) -> ApiResult<web::Json<GeoJsonFeature>> {
    let (slug, id) = path.into_inner();
    let kind = parse_feature_kind(&slug)?;
    let feature = state.features_query.get(kind, id).await?;
    Ok(web::Json(infrastructure_feature(&feature)))
}

/// Update a feature. Geometry is rebuilt only from a complete coordinate set.
#[utoipa::path(
    put,
    path = "/api/{subtype}/{id}",
    params(
        ("subtype" = String, Path, description = "Subtype slug"),
        ("id" = i32, Path, description = "Feature identifier")
    ),
    request_body = SurveyRecordSchema,
    responses(
        (status = 200, description = "Feature updated", body = GeoJsonFeatureSchema),
        (status = 400, description = "Invalid coordinates, attribute or reference", body = ErrorSchema),
        (status = 404, description = "Unknown subtype or feature", body = ErrorSchema)
    ),
    tags = ["infrastructures"],
    operation_id = "updateFeature"
)]
#[put("/{subtype}/{id}")]
pub async fn update_feature(
    state: web::Data<HttpState>,
    path: web::Path<(String, i32)>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<GeoJsonFeature>> {
    let (slug, id) = path.into_inner();
    let kind = parse_feature_kind(&slug)?;
    let feature = state
        .features
        .update(kind, id, object_body(payload.into_inner())?)
        .await?;
    Ok(web::Json(infrastructure_feature(&feature)))
}

/// Delete a feature.
#[utoipa::path(
    delete,
    path = "/api/{subtype}/{id}",
    params(
        ("subtype" = String, Path, description = "Subtype slug"),
        ("id" = i32, Path, description = "Feature identifier")
    ),
    responses(
        (status = 200, description = "Feature deleted"),
        (status = 404, description = "Unknown subtype or feature", body = ErrorSchema)
    ),
    tags = ["infrastructures"],
    operation_id = "deleteFeature"
)]
#[delete("/{subtype}/{id}")]
pub async fn delete_feature(
    state: web::Data<HttpState>,
    path: web::Path<(String, i32)>,
) -> ApiResult<HttpResponse> {
    let (slug, id) = path.into_inner();
    let kind = parse_feature_kind(&slug)?;
    state.features.delete(kind, id).await?;
    info!(kind = %kind, feature_id = id, "feature deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": format!("{kind} {id} deleted") })))
}
