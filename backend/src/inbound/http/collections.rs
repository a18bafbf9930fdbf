//! GeoJSON rendering of survey records.
//!
//! Road segments and infrastructure features leave the service as GeoJSON
//! `Feature`s. The coordinate system travels in an `srid` foreign member
//! because stored piste geometry (EPSG:32628) is returned as-is on create.

use geojson::feature::Id;
use geojson::{Feature as GeoJsonFeature, FeatureCollection, Geometry, JsonObject};
use serde_json::{Value, json};

use crate::domain::geometry::{FeatureGeometry, Shape};
use crate::domain::{Error, Feature, Piste};

fn geometry(value: &FeatureGeometry) -> Geometry {
    let shape = match value.shape() {
        Shape::Point(point) => geojson::Value::from(point),
        Shape::LineString(line) => geojson::Value::from(line),
        Shape::MultiLineString(lines) => geojson::Value::from(lines),
    };
    Geometry::new(shape)
}

fn feature(id: i32, value: &FeatureGeometry, properties: JsonObject) -> GeoJsonFeature {
    let mut foreign = JsonObject::new();
    foreign.insert("srid".to_owned(), json!(value.srid().code()));
    GeoJsonFeature {
        bbox: None,
        geometry: Some(geometry(value)),
        id: Some(Id::Number(id.into())),
        properties: Some(properties),
        foreign_members: Some(foreign),
    }
}

/// Render a road segment with its survey attributes as properties.
///
/// # Errors
/// Internal error when the attributes fail to serialise.
pub fn piste_feature(piste: &Piste) -> Result<GeoJsonFeature, Error> {
    let mut properties = match serde_json::to_value(&piste.attributes) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => return Err(Error::internal("piste attributes are not an object")),
    };
    properties.insert("id".to_owned(), json!(piste.id));
    properties.insert("created_at".to_owned(), json!(piste.created_at));
    properties.insert("updated_at".to_owned(), json!(piste.updated_at));
    Ok(feature(piste.id, &piste.geometry, properties))
}

/// Render a collection of road segments.
///
/// # Errors
/// Propagates [`piste_feature`] failures.
pub fn piste_collection(pistes: &[Piste]) -> Result<FeatureCollection, Error> {
    let features = pistes
        .iter()
        .map(piste_feature)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(collection(features))
}

/// Render an infrastructure feature.
///
/// Source coordinates come back under the subtype's own field names, so a
/// client can send back what it received.
#[must_use]
pub fn infrastructure_feature(record: &Feature) -> GeoJsonFeature {
    let mut properties = record.attributes.clone();
    properties.insert("id".to_owned(), json!(record.id));
    properties.insert("type_infrastructure".to_owned(), json!(record.kind.slug()));
    properties.insert("fid".to_owned(), json!(record.fid));
    properties.insert("code_piste".to_owned(), json!(record.code_piste));
    properties.insert("login_id".to_owned(), json!(record.login_id));
    let source = [
        record.source.x,
        record.source.y,
        record.source.x_end,
        record.source.y_end,
    ];
    for (name, value) in record
        .kind
        .schema()
        .geometry
        .coordinate_fields()
        .into_iter()
        .zip(source)
    {
        properties.insert(name.to_owned(), json!(value));
    }
    properties.insert("created_at".to_owned(), json!(record.created_at));
    properties.insert("updated_at".to_owned(), json!(record.updated_at));
    feature(record.id, &record.geometry, properties)
}

/// Render a collection of infrastructure features.
#[must_use]
pub fn infrastructure_collection(records: &[Feature]) -> FeatureCollection {
    collection(records.iter().map(infrastructure_feature).collect())
}

fn collection(features: Vec<GeoJsonFeature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
