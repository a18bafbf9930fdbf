//! Login and account administration handlers.
//!
//! ```text
//! POST /api/login {"mail":"agent@pprcollecte.gn","mdp":"secret"}
//! GET /api/users?role=admin&region_id=1
//! PUT /api/users/4 {"communes_rurales_id":null}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::ports::AccountsListRequest;
use crate::domain::{
    AccountDraft, AccountInput, AccountPatch, AccountProfile, AdminFilter, Error,
    LoginCredentials, Presence, Role,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{AccountProfileSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::presence;

/// Login request body for `POST /api/login`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "agent@pprcollecte.gn")]
    pub mail: Option<String>,
    #[schema(example = "secret")]
    pub mdp: Option<String>,
}

impl TryFrom<&LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: &LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(value.mail.as_deref(), value.mdp.as_deref()).map_err(Error::from)
    }
}

/// Account body for `POST /api/users` and `PUT /api/users/{id}`.
///
/// On update every field is optional; `communes_rurales_id: null` detaches
/// the account from its commune while an absent key leaves it unchanged.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AccountRequest {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub mail: Option<String>,
    pub mdp: Option<String>,
    #[schema(example = "user")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "presence")]
    #[schema(value_type = Option<i32>)]
    pub communes_rurales_id: Presence<i32>,
}

impl AccountRequest {
    fn input(&self) -> AccountInput<'_> {
        AccountInput {
            nom: self.nom.as_deref(),
            prenom: self.prenom.as_deref(),
            mail: self.mail.as_deref(),
            mdp: self.mdp.as_deref(),
            role: self.role.as_deref(),
            communes_rurales_id: self.communes_rurales_id,
        }
    }
}

/// Query parameters for `GET /api/users`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccountListParams {
    /// Only accounts with this role.
    pub role: Option<String>,
    /// Only accounts of communes in this region.
    pub region_id: Option<i32>,
    /// Only accounts of communes in this prefecture.
    pub prefecture_id: Option<i32>,
    /// Only accounts of this commune.
    pub commune_id: Option<i32>,
}

impl TryFrom<AccountListParams> for AccountsListRequest {
    type Error = Error;

    fn try_from(params: AccountListParams) -> Result<Self, Self::Error> {
        let role = params
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::parse::<Role>)
            .transpose()?;
        Ok(Self {
            role,
            scope: AdminFilter::default()
                .with_commune(params.commune_id)
                .with_prefecture(params.prefecture_id)
                .with_region(params.region_id),
        })
    }
}

/// Check credentials and return the account profile.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials match", body = AccountProfileSchema),
        (status = 400, description = "Missing mail or password", body = ErrorSchema),
        (status = 401, description = "Wrong password", body = ErrorSchema),
        (status = 404, description = "Unknown mail", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AccountProfile>> {
    let credentials = LoginCredentials::try_from(&payload.into_inner())?;
    let profile = state.login.authenticate(&credentials).await?;
    Ok(web::Json(profile))
}

/// Every account, for the mobile client's offline login cache.
#[utoipa::path(
    get,
    path = "/api/login",
    responses(
        (status = 200, description = "Accounts", body = [AccountProfileSchema]),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "listLoginAccounts"
)]
#[get("/login")]
pub async fn list_login_accounts(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<AccountProfile>>> {
    let accounts = state
        .accounts_query
        .list(AccountsListRequest::default())
        .await?;
    Ok(web::Json(accounts))
}

/// Accounts filtered by role and administrative scope.
#[utoipa::path(
    get,
    path = "/api/users",
    params(AccountListParams),
    responses(
        (status = 200, description = "Accounts", body = [AccountProfileSchema]),
        (status = 400, description = "Invalid filter", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "listAccounts"
)]
#[get("/users")]
pub async fn list_accounts(
    state: web::Data<HttpState>,
    params: web::Query<AccountListParams>,
) -> ApiResult<web::Json<Vec<AccountProfile>>> {
    let request = AccountsListRequest::try_from(params.into_inner())?;
    let accounts = state.accounts_query.list(request).await?;
    Ok(web::Json(accounts))
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = AccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountProfileSchema),
        (status = 400, description = "Invalid or duplicate field", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "createAccount"
)]
#[post("/users")]
pub async fn create_account(
    state: web::Data<HttpState>,
    payload: web::Json<AccountRequest>,
) -> ApiResult<HttpResponse> {
    let draft = AccountDraft::try_from_input(&payload.input())?;
    let profile = state.accounts.create(draft).await?;
    info!(account_id = profile.id, role = %profile.role, "account created");
    Ok(HttpResponse::Created().json(profile))
}

/// Partially update an account.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "Account identifier")),
    request_body = AccountRequest,
    responses(
        (status = 200, description = "Account updated", body = AccountProfileSchema),
        (status = 400, description = "Invalid or duplicate field", body = ErrorSchema),
        (status = 404, description = "Unknown account", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "updateAccount"
)]
#[put("/users/{id}")]
pub async fn update_account(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<AccountRequest>,
) -> ApiResult<web::Json<AccountProfile>> {
    let patch = AccountPatch::try_from_input(&payload.input())?;
    let profile = state.accounts.update(path.into_inner(), patch).await?;
    Ok(web::Json(profile))
}

/// Delete an account. Road segments and features it recorded are kept.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "Account identifier")),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 404, description = "Unknown account", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "deleteAccount"
)]
#[delete("/users/{id}")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    state.accounts.delete(id).await?;
    info!(account_id = id, "account deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": format!("account {id} deleted") })))
}
