//! End-to-end account, login and commune endpoints over the in-memory store.

mod support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use rstest::rstest;
use serde_json::{Value, json};
use support::{TestApp, detail};

fn agent(mail: &str, role: &str, commune: Option<i32>) -> Value {
    json!({
        "nom": "Camara",
        "prenom": "Aissatou",
        "mail": mail,
        "mdp": "s3cret",
        "role": role,
        "communes_rurales_id": commune
    })
}

fn names(body: &Value, key: &str) -> Vec<Value> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|row| row[key].clone())
        .collect()
}

#[rstest]
#[actix_web::test]
async fn created_account_can_log_in() {
    let app = TestApp::seeded().await;

    let created = app
        .create(
            "/api/users",
            agent("a.camara@pprcollecte.gn", "user", Some(app.seed.bambaya)),
        )
        .await;
    assert_eq!(created["role"], "user");
    assert_eq!(created["communes_rurales_id"], app.seed.bambaya);
    assert!(created.get("mdp").is_none());

    let (status, profile) = app
        .call(
            TestRequest::post()
                .uri("/api/login")
                .set_json(json!({"mail": "a.camara@pprcollecte.gn", "mdp": "s3cret"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"], created["id"]);
    assert!(profile.get("mdp").is_none());
}

#[rstest]
#[case(json!({"mail": "a.camara@pprcollecte.gn", "mdp": "wrong"}), StatusCode::UNAUTHORIZED)]
#[case(json!({"mail": "nobody@pprcollecte.gn", "mdp": "s3cret"}), StatusCode::NOT_FOUND)]
#[case(json!({"mail": "a.camara@pprcollecte.gn"}), StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn failed_logins_are_distinguished(#[case] credentials: Value, #[case] expected: StatusCode) {
    let app = TestApp::seeded().await;
    app.create("/api/users", agent("a.camara@pprcollecte.gn", "user", None))
        .await;

    let (status, body) = app
        .call(TestRequest::post().uri("/api/login").set_json(credentials))
        .await;

    assert_eq!(status, expected);
    assert!(body["message"].is_string());
}

#[rstest]
#[actix_web::test]
async fn duplicate_mail_is_rejected() {
    let app = TestApp::seeded().await;
    app.create("/api/users", agent("a.camara@pprcollecte.gn", "user", None))
        .await;

    let (status, body) = app
        .call(
            TestRequest::post()
                .uri("/api/users")
                .set_json(agent("a.camara@pprcollecte.gn", "admin", None)),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&body, "field"), "mail");
    assert_eq!(detail(&body, "code"), "duplicate");
}

#[rstest]
#[case(agent("x@pprcollecte.gn", "guest", None), "role", "invalid_role")]
#[case(agent("not-a-mail", "user", None), "mail", "invalid_mail")]
#[case(agent("x@pprcollecte.gn", "user", Some(999)), "communes_rurales_id", "dangling_reference")]
#[case(json!({"mail": "x@pprcollecte.gn", "mdp": "s3cret", "role": "user"}), "nom", "missing_field")]
#[actix_web::test]
async fn invalid_accounts_are_rejected(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = TestApp::seeded().await;

    let (status, body) = app
        .call(TestRequest::post().uri("/api/users").set_json(payload))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&body, "field"), field);
    assert_eq!(detail(&body, "code"), code);
    assert_eq!(app.get("/api/users").await, json!([]));
}

#[rstest]
#[actix_web::test]
async fn listing_filters_by_role_and_scope() {
    let app = TestApp::seeded().await;
    let seed = &app.seed;
    app.create("/api/users", agent("kindia@pprcollecte.gn", "user", Some(seed.bambaya)))
        .await;
    app.create("/api/users", agent("boke@pprcollecte.gn", "user", Some(seed.koba)))
        .await;
    app.create("/api/users", agent("chef@pprcollecte.gn", "super_admin", None))
        .await;

    let admins = app.get("/api/users?role=super_admin").await;
    assert_eq!(names(&admins, "mail"), vec![json!("chef@pprcollecte.gn")]);

    let boke = app
        .get(&format!("/api/users?region_id={}", seed.boke_region))
        .await;
    assert_eq!(names(&boke, "mail"), vec![json!("boke@pprcollecte.gn")]);

    let everyone = app.get("/api/login").await;
    assert_eq!(everyone.as_array().map(Vec::len), Some(3));
}

#[rstest]
#[actix_web::test]
async fn update_detaches_commune_and_delete_removes_account() {
    let app = TestApp::seeded().await;
    let created = app
        .create(
            "/api/users",
            agent("a.camara@pprcollecte.gn", "user", Some(app.seed.bambaya)),
        )
        .await;
    let id = created["id"].as_i64().expect("id");

    let (status, updated) = app
        .call(
            TestRequest::put()
                .uri(&format!("/api/users/{id}"))
                .set_json(json!({"communes_rurales_id": null, "role": "admin"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["communes_rurales_id"], Value::Null);
    assert_eq!(updated["role"], "admin");
    assert_eq!(updated["nom"], "Camara");

    let (deleted, body) = app
        .call(TestRequest::delete().uri(&format!("/api/users/{id}")))
        .await;
    assert_eq!(deleted, StatusCode::OK);
    assert_eq!(body["message"], format!("account {id} deleted"));

    let (again, _) = app
        .call(TestRequest::delete().uri(&format!("/api/users/{id}")))
        .await;
    assert_eq!(again, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn commune_search_matches_fragment_with_hierarchy() {
    let app = TestApp::seeded().await;

    let found = app.get("/api/communes?q=bam").await;

    assert_eq!(
        found,
        json!([{
            "id": app.seed.bambaya,
            "nom": "Bambaya",
            "prefecture_id": app.seed.kindia_prefecture,
            "prefecture_nom": "Kindia",
            "region_id": app.seed.kindia_region,
            "region_nom": "Kindia"
        }])
    );
}

#[rstest]
#[actix_web::test]
async fn commune_listing_is_sorted_and_scoped() {
    let app = TestApp::seeded().await;

    let all = app.get("/api/communes").await;
    assert_eq!(
        names(&all, "nom"),
        vec![json!("Bambaya"), json!("Friguiagbé"), json!("Koba")]
    );

    let boffa = app
        .get(&format!("/api/communes?prefecture_id={}", app.seed.boffa_prefecture))
        .await;
    assert_eq!(names(&boffa, "nom"), vec![json!("Koba")]);
}

#[rstest]
#[actix_web::test]
async fn commune_creation_checks_prefecture() {
    let app = TestApp::seeded().await;

    let created = app
        .create(
            "/api/communes",
            json!({"nom": "Sangarédi", "prefectures_id": app.seed.boffa_prefecture}),
        )
        .await;
    assert_eq!(created["region_nom"], "Boké");

    let (status, body) = app
        .call(
            TestRequest::post()
                .uri("/api/communes")
                .set_json(json!({"nom": "Nowhere", "prefectures_id": 999})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&body, "code"), "dangling_reference");
}

#[rstest]
#[actix_web::test]
async fn deleting_a_prefecture_removes_communes_and_detaches_accounts() {
    let app = TestApp::seeded().await;
    let created = app
        .create(
            "/api/users",
            agent("a.camara@pprcollecte.gn", "user", Some(app.seed.friguiagbe)),
        )
        .await;

    assert!(
        app.store
            .delete_prefecture(app.seed.kindia_prefecture)
            .expect("delete")
    );

    let communes = app.get("/api/communes").await;
    assert_eq!(names(&communes, "nom"), vec![json!("Koba")]);
    let accounts = app.get("/api/users").await;
    assert_eq!(accounts[0]["id"], created["id"]);
    assert_eq!(accounts[0]["communes_rurales_id"], Value::Null);
}
