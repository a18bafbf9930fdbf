//! Binds built geometry and allow-listed attributes into feature records.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

use super::{
    AttributeField, AttributeType, FeatureChanges, FeatureKind, GeometrySource, NewFeature,
    SourceCoordinates,
};
use crate::domain::Error;
use crate::domain::fields::{FieldReader, Presence, invalid_field};
use crate::domain::geometry::{FeatureGeometry, GeometryBuilder, GeometryError, Srid};

/// Storage reference system of every infrastructure feature.
const FEATURE_SRID: Srid = Srid::Wgs84;

/// Turns request payloads into [`NewFeature`] and [`FeatureChanges`].
///
/// Unknown keys are ignored. Identifiers and audit timestamps are never read
/// from the payload; the caller supplies `now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureRecordMapper {
    builder: GeometryBuilder,
}

impl FeatureRecordMapper {
    /// Mapper building geometry with `builder`.
    #[must_use]
    pub const fn new(builder: GeometryBuilder) -> Self {
        Self { builder }
    }

    /// Map a creation payload. Geometry is required.
    ///
    /// # Errors
    /// Field-level validation errors for mistyped values and geometry errors
    /// when coordinates are missing, malformed or out of range.
    pub fn to_new_record(
        &self,
        kind: FeatureKind,
        input: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<NewFeature, Error> {
        let source = &kind.schema().geometry;
        let geometry = self.build_geometry(source, input)?.ok_or_else(|| {
            let field = source.coordinate_fields().first().copied().unwrap_or("geom");
            GeometryError::malformed(field, "coordinates are required")
        })?;
        let reader = FieldReader::new(input);
        let mut attributes = Map::new();
        for field in kind.schema().attributes {
            if let Some(Some(value)) = read_attribute(&reader, field)? {
                attributes.insert(field.name.to_owned(), value);
            }
        }
        Ok(NewFeature {
            kind,
            source: SourceCoordinates::from_geometry(&geometry),
            geometry,
            fid: reader.integer("fid")?.flatten(),
            attributes,
            code_piste: reader.id("code_piste")?.flatten(),
            login_id: reader.id("login_id")?.flatten(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Map a partial update payload.
    ///
    /// Geometry is rebuilt only when every coordinate field is present.
    ///
    /// # Errors
    /// As for [`Self::to_new_record`], except that absent coordinates are
    /// not an error.
    pub fn to_changes(
        &self,
        kind: FeatureKind,
        input: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<FeatureChanges, Error> {
        let geometry = self.build_geometry(&kind.schema().geometry, input)?;
        let reader = FieldReader::new(input);
        let mut attributes = Map::new();
        for field in kind.schema().attributes {
            match read_attribute(&reader, field)? {
                Some(Some(value)) => {
                    attributes.insert(field.name.to_owned(), value);
                }
                Some(None) => {
                    attributes.insert(field.name.to_owned(), Value::Null);
                }
                None => {}
            }
        }
        Ok(FeatureChanges {
            geometry,
            fid: reader.integer("fid")?,
            attributes,
            code_piste: reader.id("code_piste")?,
            login_id: reader.id("login_id")?,
            updated_at: now,
        })
    }

    fn build_geometry(
        &self,
        source: &GeometrySource,
        input: &Map<String, Value>,
    ) -> Result<Option<FeatureGeometry>, GeometryError> {
        match source {
            GeometrySource::Point(fields) => self.builder.point(input, *fields, FEATURE_SRID),
            GeometrySource::Endpoints(fields) => {
                self.builder.endpoints(input, *fields, FEATURE_SRID)
            }
        }
    }
}

fn read_attribute(reader: &FieldReader<'_>, field: &AttributeField) -> Result<Presence<Value>, Error> {
    let name = field.name;
    Ok(match field.ty {
        AttributeType::Text => reader.text(name)?.map(|v| v.map(Value::String)),
        AttributeType::Integer => reader.integer(name)?.map(|v| v.map(Value::from)),
        AttributeType::Float => match reader.float(name)? {
            Some(Some(v)) => Some(Some(
                Number::from_f64(v)
                    .map(Value::Number)
                    .ok_or_else(|| invalid_field(name, "invalid_type", format!("{name} must be a number")))?,
            )),
            Some(None) => Some(None),
            None => None,
        },
        AttributeType::Timestamp => reader
            .timestamp(name)?
            .map(|v| v.map(|at| Value::String(at.to_rfc3339_opts(SecondsFormat::Secs, true)))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::geometry::Shape;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).single().expect("valid time")
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn detail<'a>(err: &'a Error, key: &str) -> Option<&'a Value> {
        err.details().and_then(|d| d.get(key))
    }

    #[rstest]
    fn maps_school_with_allow_list(now: DateTime<Utc>) {
        let input = object(json!({
            "id": 99,
            "created_at": "2001-01-01",
            "x_ecole": -13.7,
            "y_ecole": 9.5,
            "nom": "Ecole de Kindia",
            "type": "primaire",
            "date_creation": "1998-09-01",
            "couleur": "bleu",
            "fid": "17",
            "code_piste": 1203,
        }));
        let record = FeatureRecordMapper::default()
            .to_new_record(FeatureKind::School, &input, now)
            .expect("valid record");

        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, now);
        assert_eq!(record.fid, Some(17));
        assert_eq!(record.code_piste, Some(1203));
        assert_eq!(record.source.x, Some(-13.7));
        assert_eq!(
            Value::Object(record.attributes),
            json!({
                "nom": "Ecole de Kindia",
                "type": "primaire",
                "date_creation": "1998-09-01T00:00:00Z",
            })
        );
    }

    #[rstest]
    fn create_without_coordinates_is_malformed(now: DateTime<Utc>) {
        let input = object(json!({"nom": "Pont sans position"}));
        let err = FeatureRecordMapper::default()
            .to_new_record(FeatureKind::Bridge, &input, now)
            .expect_err("geometry required");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(detail(&err, "code"), Some(&json!("malformed_geometry")));
        assert_eq!(detail(&err, "field"), Some(&json!("x_pont")));
    }

    #[rstest]
    fn mistyped_attribute_is_field_error(now: DateTime<Utc>) {
        let input = object(json!({
            "x_buse": -13.7,
            "y_buse": 9.5,
            "nombre_ouvertures": "plusieurs",
        }));
        let err = FeatureRecordMapper::default()
            .to_new_record(FeatureKind::Culvert, &input, now)
            .expect_err("integer expected");
        assert_eq!(detail(&err, "field"), Some(&json!("nombre_ouvertures")));
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_type")));
    }

    #[rstest]
    fn ferry_builds_line(now: DateTime<Utc>) {
        let input = object(json!({
            "x_debut_traversee_bac": -13.70,
            "y_debut_traversee_bac": 9.50,
            "x_fin_traversee_bac": -13.69,
            "y_fin_traversee_bac": 9.52,
            "type_bac": "motorisé",
        }));
        let record = FeatureRecordMapper::default()
            .to_new_record(FeatureKind::Ferry, &input, now)
            .expect("valid ferry");
        assert!(matches!(record.geometry.shape(), Shape::LineString(_)));
        assert_eq!(record.source.y_end, Some(9.52));
    }

    #[rstest]
    fn update_without_coordinates_keeps_geometry(now: DateTime<Utc>) {
        let input = object(json!({"x_marche": -13.7, "nom": null, "type": "hebdomadaire"}));
        let changes = FeatureRecordMapper::default()
            .to_changes(FeatureKind::Market, &input, now)
            .expect("valid changes");
        assert!(changes.geometry.is_none());
        assert_eq!(changes.attributes.get("nom"), Some(&Value::Null));
        assert_eq!(changes.attributes.get("type"), Some(&json!("hebdomadaire")));
        assert_eq!(changes.code_piste, None);
        assert_eq!(changes.updated_at, now);
    }

    #[rstest]
    fn update_can_clear_references(now: DateTime<Utc>) {
        let input = object(json!({"code_piste": null, "login_id": 3}));
        let changes = FeatureRecordMapper::default()
            .to_changes(FeatureKind::Locality, &input, now)
            .expect("valid changes");
        assert_eq!(changes.code_piste, Some(None));
        assert_eq!(changes.references().login_id, Some(3));
        assert_eq!(changes.references().code_piste, None);
    }
}
