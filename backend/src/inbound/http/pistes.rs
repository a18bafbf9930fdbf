//! Road segment handlers.
//!
//! ```text
//! POST /api/pistes {"geom":{"type":"LineString","coordinates":[...]},"srid":4326,"code_piste":12}
//! GET /api/pistes?communes_rurales_id=3
//! ```
//!
//! Creation answers with the stored UTM 28N geometry; every read and the
//! update answer in WGS 84.

use actix_web::{HttpResponse, delete, get, post, put, web};
use geojson::{Feature as GeoJsonFeature, FeatureCollection};
use serde_json::{Value, json};
use tracing::info;

use crate::domain::AdminFilter;
use crate::inbound::http::ApiResult;
use crate::inbound::http::collections::{piste_collection, piste_feature};
use crate::inbound::http::schemas::{
    ErrorSchema, FeatureCollectionSchema, GeoJsonFeatureSchema, SurveyRecordSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ScopeParams, object_body};

/// Road segments in an administrative scope.
#[utoipa::path(
    get,
    path = "/api/pistes",
    params(ScopeParams),
    responses(
        (status = 200, description = "Road segments in WGS 84", body = FeatureCollectionSchema),
        (status = 400, description = "Invalid filter", body = ErrorSchema)
    ),
    tags = ["pistes"],
    operation_id = "listPistes"
)]
#[get("/pistes")]
pub async fn list_pistes(
    state: web::Data<HttpState>,
    params: web::Query<ScopeParams>,
) -> ApiResult<web::Json<FeatureCollection>> {
    let pistes = state
        .pistes_query
        .list(AdminFilter::from(params.into_inner()))
        .await?;
    Ok(web::Json(piste_collection(&pistes)?))
}

/// Record a road segment from a GeoJSON line.
#[utoipa::path(
    post,
    path = "/api/pistes",
    request_body = SurveyRecordSchema,
    responses(
        (status = 201, description = "Stored segment in UTM 28N", body = GeoJsonFeatureSchema),
        (status = 400, description = "Invalid geometry, attribute or reference", body = ErrorSchema)
    ),
    tags = ["pistes"],
    operation_id = "createPiste"
)]
#[post("/pistes")]
pub async fn create_piste(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let piste = state.pistes.create(object_body(payload.into_inner())?).await?;
    info!(piste_id = piste.id, code_piste = ?piste.attributes.code_piste, "piste recorded");
    Ok(HttpResponse::Created().json(piste_feature(&piste)?))
}

/// One road segment.
#[utoipa::path(
    get,
    path = "/api/pistes/{id}",
    params(("id" = i32, Path, description = "Road segment identifier")),
    responses(
        (status = 200, description = "Road segment in WGS 84", body = GeoJsonFeatureSchema),
        (status = 404, description = "Unknown segment", body = ErrorSchema)
    ),
    tags = ["pistes"],
    operation_id = "getPiste"
)]
#[get("/pistes/{id}")]
pub async fn get_piste(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<GeoJsonFeature>> {
    let piste = state.pistes_query.get(path.into_inner()).await?;
    Ok(web::Json(piste_feature(&piste)?))
}

/// Update survey attributes. Geometry keys in the body are ignored.
#[utoipa::path(
    put,
    path = "/api/pistes/{id}",
    params(("id" = i32, Path, description = "Road segment identifier")),
    request_body = SurveyRecordSchema,
    responses(
        (status = 200, description = "Updated segment in WGS 84", body = GeoJsonFeatureSchema),
        (status = 400, description = "Invalid attribute or reference", body = ErrorSchema),
        (status = 404, description = "Unknown segment", body = ErrorSchema)
    ),
    tags = ["pistes"],
    operation_id = "updatePiste"
)]
#[put("/pistes/{id}")]
pub async fn update_piste(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<GeoJsonFeature>> {
    let piste = state
        .pistes
        .update(path.into_inner(), object_body(payload.into_inner())?)
        .await?;
    Ok(web::Json(piste_feature(&piste)?))
}

/// Delete a road segment. Features on it lose their `code_piste`.
#[utoipa::path(
    delete,
    path = "/api/pistes/{id}",
    params(("id" = i32, Path, description = "Road segment identifier")),
    responses(
        (status = 200, description = "Segment deleted"),
        (status = 404, description = "Unknown segment", body = ErrorSchema)
    ),
    tags = ["pistes"],
    operation_id = "deletePiste"
)]
#[delete("/pistes/{id}")]
pub async fn delete_piste(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    state.pistes.delete(id).await?;
    info!(piste_id = id, "piste deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": format!("piste {id} deleted") })))
}
