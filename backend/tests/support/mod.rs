//! Shared harness for end-to-end HTTP tests over the in-memory store.
//!
//! Integration tests compile as separate crates under `backend/tests/`; this
//! module builds the full actix app (routing, extractor error handlers,
//! trailing-slash normalisation, trace middleware) over a seeded
//! [`MemoryStore`] so requests run through every layer without a database.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::middleware::NormalizePath;
use actix_web::{App, test, web};
use pprcollecte::Trace;
use pprcollecte::domain::NewCommune;
use pprcollecte::domain::ports::AdminRepository;
use pprcollecte::inbound::http::configure_api;
use pprcollecte::inbound::http::state::{DrivenPorts, HttpState, HttpStatePorts};
use pprcollecte::outbound::memory::MemoryStore;
use serde_json::Value;

/// Identifiers of the seeded administrative hierarchy.
///
/// Kindia region holds the Kindia prefecture (Bambaya, Friguiagbé); Boké
/// region holds the Boffa prefecture (Koba).
pub struct Seed {
    pub kindia_region: i32,
    pub boke_region: i32,
    pub kindia_prefecture: i32,
    pub boffa_prefecture: i32,
    pub bambaya: i32,
    pub friguiagbe: i32,
    pub koba: i32,
}

/// App state plus the store behind it.
pub struct TestApp {
    pub store: MemoryStore,
    pub seed: Seed,
    state: web::Data<HttpState>,
}

async fn commune(store: &MemoryStore, nom: &str, prefecture: i32) -> i32 {
    store
        .insert_commune(&NewCommune {
            nom: nom.to_owned(),
            prefectures_id: prefecture,
        })
        .await
        .expect("commune")
        .id
}

impl TestApp {
    /// App over a store holding two regions, two prefectures and three
    /// communes.
    pub async fn seeded() -> Self {
        let store = MemoryStore::new();
        let kindia_region = store.add_region("Kindia").expect("region");
        let boke_region = store.add_region("Boké").expect("region");
        let kindia_prefecture = store
            .add_prefecture("Kindia", Some(kindia_region))
            .expect("prefecture");
        let boffa_prefecture = store
            .add_prefecture("Boffa", Some(boke_region))
            .expect("prefecture");
        let bambaya = commune(&store, "Bambaya", kindia_prefecture).await;
        let friguiagbe = commune(&store, "Friguiagbé", kindia_prefecture).await;
        let koba = commune(&store, "Koba", boffa_prefecture).await;

        let shared = Arc::new(store.clone());
        let ports = HttpStatePorts::from(DrivenPorts {
            accounts: shared.clone(),
            admin: shared.clone(),
            references: shared.clone(),
            pistes: shared.clone(),
            features: shared,
            clock: Arc::new(mockable::DefaultClock),
        });

        Self {
            store,
            seed: Seed {
                kindia_region,
                boke_region,
                kindia_prefecture,
                boffa_prefecture,
                bambaya,
                friguiagbe,
                koba,
            },
            state: web::Data::new(HttpState::new(ports)),
        }
    }

    /// Send `request` through the full app and decode the JSON body.
    pub async fn call(&self, request: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(self.state.clone())
                .wrap(NormalizePath::trim())
                .wrap(Trace)
                .configure(configure_api),
        )
        .await;
        let res = test::call_service(&app, request.to_request()).await;
        let status = res.status();
        let bytes = test::read_body(res).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, body)
    }

    /// Create `body` at `uri`, asserting `201 Created`.
    pub async fn create(&self, uri: &str, body: Value) -> Value {
        let (status, created) = self
            .call(test::TestRequest::post().uri(uri).set_json(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {created}");
        created
    }

    /// Fetch `uri`, asserting `200 OK`.
    pub async fn get(&self, uri: &str) -> Value {
        let (status, body) = self.call(test::TestRequest::get().uri(uri)).await;
        assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
        body
    }
}

/// `details.<key>` of an error body.
pub fn detail<'a>(body: &'a Value, key: &str) -> &'a Value {
    &body["details"][key]
}

/// Property values of every feature in a collection.
pub fn property(collection: &Value, key: &str) -> Vec<Value> {
    collection["features"]
        .as_array()
        .expect("features array")
        .iter()
        .map(|feature| feature["properties"][key].clone())
        .collect()
}
