//! HTTP inbound adapter exposing REST endpoints.

pub mod collections;
pub mod communes;
pub mod error;
pub mod features;
pub mod health;
pub mod pistes;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Mount every survey endpoint under `/api`.
///
/// Fixed paths go first: the subtype routes match any single segment.
/// Trailing slashes are the caller's concern; wrap the app in
/// `NormalizePath::trim()` to accept both spellings.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use actix_web::middleware::NormalizePath;
/// use pprcollecte::inbound::http::configure_api;
///
/// let _app = App::new().wrap(NormalizePath::trim()).configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(
            web::scope("/api")
                .service(users::login)
                .service(users::list_login_accounts)
                .service(users::list_accounts)
                .service(users::create_account)
                .service(users::update_account)
                .service(users::delete_account)
                .service(communes::search_communes)
                .service(communes::create_commune)
                .service(pistes::list_pistes)
                .service(pistes::create_piste)
                .service(pistes::get_piste)
                .service(pistes::update_piste)
                .service(pistes::delete_piste)
                .service(features::list_features)
                .service(features::create_feature)
                .service(features::get_feature)
                .service(features::update_feature)
                .service(features::delete_feature),
        );
}
