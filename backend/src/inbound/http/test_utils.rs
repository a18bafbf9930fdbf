//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::NormalizePath;
use actix_web::{App, test as actix_test, web};
use serde_json::Value;

use crate::domain::ports::{
    MockAccountsCommand, MockAccountsQuery, MockCommunesCommand, MockCommunesQuery,
    MockFeaturesCommand, MockFeaturesQuery, MockLoginService, MockPistesCommand,
    MockPistesQuery,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Mock doubles for every driving port; unset expectations panic when hit.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub accounts: MockAccountsCommand,
    pub accounts_query: MockAccountsQuery,
    pub pistes: MockPistesCommand,
    pub pistes_query: MockPistesQuery,
    pub features: MockFeaturesCommand,
    pub features_query: MockFeaturesQuery,
    pub communes: MockCommunesCommand,
    pub communes_query: MockCommunesQuery,
}

impl MockPorts {
    /// Freeze the doubles into handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            accounts: Arc::new(self.accounts),
            accounts_query: Arc::new(self.accounts_query),
            pistes: Arc::new(self.pistes),
            pistes_query: Arc::new(self.pistes_query),
            features: Arc::new(self.features),
            features_query: Arc::new(self.features_query),
            communes: Arc::new(self.communes),
            communes_query: Arc::new(self.communes_query),
        }))
    }
}

/// Application with the full API mounted over `ports`.
pub fn test_app(
    ports: MockPorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(ports.into_state())
        .wrap(NormalizePath::trim())
        .configure(configure_api)
}

/// Send `request` to an app over `ports`; returns the status and JSON body
/// (`null` when empty).
pub async fn call(ports: MockPorts, request: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(ports)).await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

/// `details.<key>` of an error payload.
pub fn detail<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.get("details").and_then(|d| d.get(key))
}
