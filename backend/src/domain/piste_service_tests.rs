//! Tests for the road segment service.

use std::sync::Arc;

use geo_types::{LineString, MultiLineString};
use serde_json::json;

use super::*;
use crate::domain::geometry::{FeatureGeometry, Shape};
use crate::domain::ports::{
    MockAdminRepository, MockPisteRepository, MockReferenceLookup, PisteRepositoryError,
};
use crate::domain::test_fixtures::{fixture_clock, fixture_timestamp, object};
use crate::domain::{CommuneSummary, ErrorCode};

fn stored_geometry() -> FeatureGeometry {
    FeatureGeometry::new(
        Srid::Utm28N,
        Shape::MultiLineString(MultiLineString::new(vec![LineString::from(vec![
            (642_698.2277, 1_050_398.7689),
            (643_800.0, 1_051_200.0),
        ])])),
    )
    .expect("valid storage geometry")
}

fn stored_piste(id: i32, commune: Option<i32>) -> Piste {
    Piste {
        id,
        geometry: stored_geometry(),
        attributes: PisteAttributes {
            code_piste: Some(100 + id),
            communes_rurales_id: commune,
            ..PisteAttributes::default()
        },
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

fn echo_insert(pistes: &mut MockPisteRepository) {
    pistes.expect_insert().returning(|new| {
        Ok(Piste {
            id: 1,
            geometry: new.geometry.clone(),
            attributes: new.attributes.clone(),
            created_at: new.created_at,
            updated_at: new.updated_at,
        })
    });
}

fn make_service(
    pistes: MockPisteRepository,
    admin: MockAdminRepository,
    references: MockReferenceLookup,
) -> PisteService {
    PisteService::new(
        Arc::new(pistes),
        Arc::new(admin),
        Arc::new(references),
        fixture_clock(),
    )
}

fn all_references_exist() -> MockReferenceLookup {
    let mut references = MockReferenceLookup::new();
    references.expect_exists().returning(|_, _| Ok(true));
    references
}

#[tokio::test]
async fn create_stores_utm_geometry_with_timestamps() {
    let mut pistes = MockPisteRepository::new();
    echo_insert(&mut pistes);
    let service = make_service(pistes, MockAdminRepository::new(), all_references_exist());

    let payload = object(json!({
        "geom": {
            "type": "LineString",
            "coordinates": [[642698.2277, 1050398.7689], [643800.0, 1051200.0]]
        },
        "code_piste": 1203,
        "communes_rurales_id": 4,
        "nom_origine_piste": "Bamba"
    }));
    let piste = PistesCommand::create(&service, payload).await.expect("created");

    assert_eq!(piste.geometry.srid(), Srid::Utm28N);
    assert!(matches!(piste.geometry.shape(), Shape::MultiLineString(_)));
    assert_eq!(piste.attributes.code_piste, Some(1203));
    assert_eq!(piste.attributes.nom_origine_piste.as_deref(), Some("Bamba"));
    assert_eq!(piste.created_at, fixture_timestamp());
    assert_eq!(piste.updated_at, piste.created_at);
}

#[tokio::test]
async fn create_projects_wgs84_input() {
    let mut pistes = MockPisteRepository::new();
    echo_insert(&mut pistes);
    let service = make_service(pistes, MockAdminRepository::new(), MockReferenceLookup::new());

    let payload = object(json!({
        "geom": "{\"type\":\"LineString\",\"coordinates\":[[-13.7,9.5],[-13.69,9.51]]}",
        "srid": 4326
    }));
    let piste = PistesCommand::create(&service, payload).await.expect("created");

    assert_eq!(piste.geometry.srid(), Srid::Utm28N);
    let first = piste.geometry.shape().coords().next().expect("coordinate");
    assert!((first.x - 642_698.2277).abs() < 1e-2);
    assert!((first.y - 1_050_398.7689).abs() < 1e-2);
}

#[tokio::test]
async fn create_requires_geometry() {
    let mut pistes = MockPisteRepository::new();
    pistes.expect_insert().never();
    let service = make_service(pistes, MockAdminRepository::new(), MockReferenceLookup::new());

    let error = PistesCommand::create(&service, object(json!({ "code_piste": 5 })))
        .await
        .expect_err("missing geom");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.details().expect("details")["field"], "geom");
}

#[tokio::test]
async fn create_rejects_point_geometry() {
    let mut pistes = MockPisteRepository::new();
    pistes.expect_insert().never();
    let service = make_service(pistes, MockAdminRepository::new(), MockReferenceLookup::new());

    let payload = object(json!({
        "geom": { "type": "Point", "coordinates": [642698.0, 1050398.0] }
    }));
    let error = PistesCommand::create(&service, payload)
        .await
        .expect_err("point rejected");
    assert_eq!(error.details().expect("details")["code"], "malformed_geometry");
}

#[tokio::test]
async fn create_rejects_unsupported_srid() {
    let service = make_service(
        MockPisteRepository::new(),
        MockAdminRepository::new(),
        MockReferenceLookup::new(),
    );
    let payload = object(json!({
        "geom": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] },
        "srid": 3857
    }));
    let error = PistesCommand::create(&service, payload)
        .await
        .expect_err("unsupported srid");
    assert_eq!(error.details().expect("details")["field"], "srid");
}

#[tokio::test]
async fn create_rejects_dangling_login() {
    let mut references = MockReferenceLookup::new();
    references
        .expect_exists()
        .returning(|target, _| Ok(target != ReferenceTarget::Account));
    let mut pistes = MockPisteRepository::new();
    pistes.expect_insert().never();
    let service = make_service(pistes, MockAdminRepository::new(), references);

    let payload = object(json!({
        "geom": { "type": "LineString", "coordinates": [[642698.0, 1050398.0], [643000.0, 1050500.0]] },
        "communes_rurales_id": 4,
        "login_id": 77
    }));
    let error = PistesCommand::create(&service, payload)
        .await
        .expect_err("dangling login");
    let details = error.details().expect("details");
    assert_eq!(details["field"], "login_id");
    assert_eq!(details["code"], "dangling_reference");
}

#[tokio::test]
async fn list_returns_display_geometry_for_scope() {
    let mut admin = MockAdminRepository::new();
    admin.expect_communes().return_once(|_| {
        Ok(vec![CommuneSummary {
            id: 4,
            nom: "Bamba".to_owned(),
            prefecture_id: Some(2),
            prefecture_nom: Some("Boké".to_owned()),
            region_id: Some(1),
            region_nom: Some("Boké".to_owned()),
        }])
    });
    let mut pistes = MockPisteRepository::new();
    pistes
        .expect_list()
        .withf(|query| query.commune_ids == Some(vec![4]))
        .return_once(|_| Ok(vec![stored_piste(1, Some(4))]));
    let service = make_service(pistes, admin, MockReferenceLookup::new());

    let listed = service
        .list(AdminFilter::default().with_commune(Some(4)))
        .await
        .expect("listed");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].geometry.srid(), Srid::Wgs84);
    let first = listed[0].geometry.shape().coords().next().expect("coordinate");
    assert!((first.x + 13.7).abs() < 1e-6);
    assert!((first.y - 9.5).abs() < 1e-6);
}

#[tokio::test]
async fn update_changes_attributes_only() {
    let mut pistes = MockPisteRepository::new();
    pistes
        .expect_find()
        .return_once(|id| Ok(Some(stored_piste(id, Some(4)))));
    pistes
        .expect_update()
        .withf(|piste| {
            piste.attributes.entreprise.as_deref() == Some("SOGEA")
                && piste.geometry == stored_geometry()
                && piste.created_at == fixture_timestamp()
        })
        .return_once(|piste| Ok(Some(piste.clone())));
    let service = make_service(pistes, MockAdminRepository::new(), all_references_exist());

    let payload = object(json!({
        "entreprise": "SOGEA",
        "geom": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] }
    }));
    let updated = service.update(2, payload).await.expect("updated");
    assert_eq!(updated.geometry.srid(), Srid::Wgs84);
    assert_eq!(updated.attributes.communes_rurales_id, Some(4));
}

#[tokio::test]
async fn get_missing_piste_is_not_found() {
    let mut pistes = MockPisteRepository::new();
    pistes.expect_find().return_once(|_| Ok(None));
    let service = make_service(pistes, MockAdminRepository::new(), MockReferenceLookup::new());

    let error = service.get(9).await.expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn duplicate_code_piste_is_invalid_request() {
    let mut pistes = MockPisteRepository::new();
    pistes
        .expect_insert()
        .return_once(|_| Err(PisteRepositoryError::duplicate("code_piste")));
    let service = make_service(pistes, MockAdminRepository::new(), MockReferenceLookup::new());

    let payload = object(json!({
        "geom": { "type": "LineString", "coordinates": [[642698.0, 1050398.0], [643000.0, 1050500.0]] },
        "code_piste": 12
    }));
    let error = PistesCommand::create(&service, payload)
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.details().expect("details")["field"], "code_piste");
}
