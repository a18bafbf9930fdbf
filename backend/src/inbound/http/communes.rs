//! Commune search and creation.
//!
//! ```text
//! GET /api/communes?q=bam
//! POST /api/communes {"nom":"Bamba","prefectures_id":2}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{AdminFilter, CommuneSummary, NewCommune};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{CommuneSummarySchema, ErrorSchema};
use crate::inbound::http::state::HttpState;

/// Query parameters for `GET /api/communes`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommuneSearchParams {
    /// Case-insensitive fragment of the commune name.
    pub q: Option<String>,
    /// Only communes of this prefecture.
    pub prefecture_id: Option<i32>,
    /// Only communes of this region.
    pub region_id: Option<i32>,
}

impl From<CommuneSearchParams> for AdminFilter {
    fn from(params: CommuneSearchParams) -> Self {
        Self::default()
            .with_name(params.q)
            .with_prefecture(params.prefecture_id)
            .with_region(params.region_id)
    }
}

/// Body for `POST /api/communes`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CommuneRequest {
    #[schema(example = "Bamba")]
    pub nom: Option<String>,
    #[schema(example = 2)]
    pub prefectures_id: Option<i32>,
}

/// Communes with their prefecture and region names, sorted by name.
#[utoipa::path(
    get,
    path = "/api/communes",
    params(CommuneSearchParams),
    responses(
        (status = 200, description = "Matching communes", body = [CommuneSummarySchema]),
        (status = 400, description = "Invalid filter", body = ErrorSchema)
    ),
    tags = ["communes"],
    operation_id = "searchCommunes"
)]
#[get("/communes")]
pub async fn search_communes(
    state: web::Data<HttpState>,
    params: web::Query<CommuneSearchParams>,
) -> ApiResult<web::Json<Vec<CommuneSummary>>> {
    let communes = state
        .communes_query
        .search(AdminFilter::from(params.into_inner()))
        .await?;
    Ok(web::Json(communes))
}

/// Create a commune under an existing prefecture.
#[utoipa::path(
    post,
    path = "/api/communes",
    request_body = CommuneRequest,
    responses(
        (status = 201, description = "Commune created", body = CommuneSummarySchema),
        (status = 400, description = "Invalid name or unknown prefecture", body = ErrorSchema)
    ),
    tags = ["communes"],
    operation_id = "createCommune"
)]
#[post("/communes")]
pub async fn create_commune(
    state: web::Data<HttpState>,
    payload: web::Json<CommuneRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let commune = NewCommune::try_from_parts(request.nom.as_deref(), request.prefectures_id)?;
    let created = state.communes.create(commune).await?;
    info!(commune_id = created.id, prefecture_id = ?created.prefecture_id, "commune created");
    Ok(HttpResponse::Created().json(created))
}
