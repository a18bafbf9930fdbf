//! Infrastructure features: one record shape shared by twelve subtypes.

mod mapper;
mod schema;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::fields::Presence;
use super::geometry::{FeatureGeometry, Shape};

pub use mapper::FeatureRecordMapper;
pub use schema::{
    AttributeField, AttributeType, FeatureKind, FeatureSchema, GeometrySource, UnknownFeatureKind,
};

/// Raw coordinates as submitted, kept for provenance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceCoordinates {
    /// x of the point or first endpoint.
    pub x: Option<f64>,
    /// y of the point or first endpoint.
    pub y: Option<f64>,
    /// x of the second endpoint.
    pub x_end: Option<f64>,
    /// y of the second endpoint.
    pub y_end: Option<f64>,
}

impl SourceCoordinates {
    /// Provenance derived from a freshly built geometry.
    #[must_use]
    pub fn from_geometry(geometry: &FeatureGeometry) -> Self {
        match geometry.shape() {
            Shape::Point(point) => Self {
                x: Some(point.x()),
                y: Some(point.y()),
                ..Self::default()
            },
            Shape::LineString(line) => {
                let first = line.0.first();
                let last = line.0.last();
                Self {
                    x: first.map(|c| c.x),
                    y: first.map(|c| c.y),
                    x_end: last.map(|c| c.x),
                    y_end: last.map(|c| c.y),
                }
            }
            Shape::MultiLineString(_) => Self::default(),
        }
    }
}

/// A persisted infrastructure feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Surrogate identifier.
    pub id: i32,
    /// Subtype.
    pub kind: FeatureKind,
    /// Geometry in WGS 84.
    pub geometry: FeatureGeometry,
    /// Optional numeric identifier assigned in the field.
    pub fid: Option<i64>,
    /// Submitted coordinates.
    pub source: SourceCoordinates,
    /// Allow-listed attributes keyed by logical name.
    pub attributes: Map<String, Value>,
    /// Road segment the feature sits on, by its code.
    pub code_piste: Option<i32>,
    /// Account that recorded the feature.
    pub login_id: Option<i32>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A feature ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeature {
    /// Subtype.
    pub kind: FeatureKind,
    /// Geometry in WGS 84.
    pub geometry: FeatureGeometry,
    /// Optional numeric identifier assigned in the field.
    pub fid: Option<i64>,
    /// Submitted coordinates.
    pub source: SourceCoordinates,
    /// Allow-listed attributes.
    pub attributes: Map<String, Value>,
    /// Road segment reference.
    pub code_piste: Option<i32>,
    /// Recording account.
    pub login_id: Option<i32>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at` on insert.
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureChanges {
    /// Replacement geometry, when a complete coordinate set was supplied.
    pub geometry: Option<FeatureGeometry>,
    /// New field identifier.
    pub fid: Presence<i64>,
    /// Attributes to set; `null` clears an attribute.
    pub attributes: Map<String, Value>,
    /// New road segment reference.
    pub code_piste: Presence<i32>,
    /// New recording account.
    pub login_id: Presence<i32>,
    /// Modification time.
    pub updated_at: DateTime<Utc>,
}

/// Non-null references a write wants to establish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureReferences {
    /// Road segment code.
    pub code_piste: Option<i32>,
    /// Account identifier.
    pub login_id: Option<i32>,
}

impl NewFeature {
    /// References to verify before inserting.
    #[must_use]
    pub const fn references(&self) -> FeatureReferences {
        FeatureReferences {
            code_piste: self.code_piste,
            login_id: self.login_id,
        }
    }
}

impl FeatureChanges {
    /// References the update sets to a non-null value.
    #[must_use]
    pub fn references(&self) -> FeatureReferences {
        FeatureReferences {
            code_piste: self.code_piste.flatten(),
            login_id: self.login_id.flatten(),
        }
    }
}

impl Feature {
    /// Apply `changes` in place. The identifier and creation time never change.
    pub fn apply(&mut self, changes: FeatureChanges) {
        if let Some(geometry) = changes.geometry {
            self.source = SourceCoordinates::from_geometry(&geometry);
            self.geometry = geometry;
        }
        if let Some(fid) = changes.fid {
            self.fid = fid;
        }
        for (name, value) in changes.attributes {
            if value.is_null() {
                self.attributes.remove(&name);
            } else {
                self.attributes.insert(name, value);
            }
        }
        if let Some(code_piste) = changes.code_piste {
            self.code_piste = code_piste;
        }
        if let Some(login_id) = changes.login_id {
            self.login_id = login_id;
        }
        self.updated_at = changes.updated_at;
    }
}

/// Filters accepted when listing features.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureQuery {
    /// Only features on this road segment.
    pub code_piste: Option<i32>,
    /// Only features whose road segment lies in one of these communes.
    pub commune_ids: Option<Vec<i32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Srid;
    use chrono::TimeZone;
    use geo_types::{line_string, point};
    use serde_json::json;

    fn school() -> Feature {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid time");
        let geometry = FeatureGeometry::new(Srid::Wgs84, Shape::Point(point!(x: -13.7, y: 9.5)))
            .expect("valid point");
        Feature {
            id: 1,
            kind: FeatureKind::School,
            source: SourceCoordinates::from_geometry(&geometry),
            geometry,
            fid: Some(4),
            attributes: json!({"nom": "Ecole A", "type": "primaire"})
                .as_object()
                .cloned()
                .expect("object"),
            code_piste: Some(10),
            login_id: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn apply_merges_attributes_and_keeps_identity() {
        let mut feature = school();
        let created = feature.created_at;
        let later = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).single().expect("valid time");
        feature.apply(FeatureChanges {
            geometry: None,
            fid: None,
            attributes: json!({"nom": "Ecole B", "type": null})
                .as_object()
                .cloned()
                .expect("object"),
            code_piste: Some(None),
            login_id: None,
            updated_at: later,
        });
        assert_eq!(feature.id, 1);
        assert_eq!(feature.created_at, created);
        assert_eq!(feature.updated_at, later);
        assert_eq!(feature.attributes.get("nom"), Some(&json!("Ecole B")));
        assert!(!feature.attributes.contains_key("type"));
        assert_eq!(feature.code_piste, None);
        assert_eq!(feature.fid, Some(4));
    }

    #[test]
    fn provenance_follows_line_endpoints() {
        let line = FeatureGeometry::new(
            Srid::Wgs84,
            Shape::LineString(geo_types::line_string![(x: 1.0, y: 2.0), (x: 3.0, y: 4.0)]),
        )
        .expect("valid line");
        let source = SourceCoordinates::from_geometry(&line);
        assert_eq!(
            source,
            SourceCoordinates {
                x: Some(1.0),
                y: Some(2.0),
                x_end: Some(3.0),
                y_end: Some(4.0),
            }
        );
    }
}
