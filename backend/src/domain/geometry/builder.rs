//! Raw survey input to canonical geometries.
//!
//! Surveyors send coordinates in three forms: an `x`/`y` pair, two pairs of
//! endpoints, or a GeoJSON line payload. Pairs that are only partly present
//! mean "no geometry supplied" so attribute-only updates stay possible.

use geo_types::{Coord, LineString, MultiLineString, Point};
use serde_json::{Map, Value};

use super::{CoordinateProjector, FeatureGeometry, GeometryError, Shape, Srid};

/// Input field names holding one `(x, y)` position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointFields {
    /// Field holding the x ordinate (longitude or easting).
    pub x: &'static str,
    /// Field holding the y ordinate (latitude or northing).
    pub y: &'static str,
}

/// Input field names holding the two ends of a crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointFields {
    /// First endpoint.
    pub start: PointFields,
    /// Second endpoint.
    pub end: PointFields,
}

/// Builds [`FeatureGeometry`] values from loosely typed input.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryBuilder {
    projector: CoordinateProjector,
}

impl GeometryBuilder {
    /// Builder that projects paths with `projector`.
    #[must_use]
    pub const fn new(projector: CoordinateProjector) -> Self {
        Self { projector }
    }

    /// Build a point from the `fields` pair.
    ///
    /// Returns `Ok(None)` when either ordinate is absent.
    ///
    /// # Errors
    /// [`GeometryError::MalformedGeometry`] for a present but non-numeric
    /// ordinate and [`GeometryError::InvalidCoordinateRange`] for a point
    /// outside `srid`.
    pub fn point(
        &self,
        input: &Map<String, Value>,
        fields: PointFields,
        srid: Srid,
    ) -> Result<Option<FeatureGeometry>, GeometryError> {
        let Some(coord) = read_pair(input, fields)? else {
            return Ok(None);
        };
        FeatureGeometry::new(srid, Shape::Point(Point(coord))).map(Some)
    }

    /// Build a two-vertex line from the endpoint pairs.
    ///
    /// Returns `Ok(None)` unless all four ordinates are present.
    ///
    /// # Errors
    /// As for [`Self::point`].
    pub fn endpoints(
        &self,
        input: &Map<String, Value>,
        fields: EndpointFields,
        srid: Srid,
    ) -> Result<Option<FeatureGeometry>, GeometryError> {
        let start = read_pair(input, fields.start)?;
        let end = read_pair(input, fields.end)?;
        let (Some(start), Some(end)) = (start, end) else {
            return Ok(None);
        };
        let line = LineString::new(vec![start, end]);
        FeatureGeometry::new(srid, Shape::LineString(line)).map(Some)
    }

    /// Build a storage-system multi-line from a GeoJSON payload.
    ///
    /// `payload` is a GeoJSON `LineString` or `MultiLineString` object, or a
    /// string containing one. Coordinates are read in `source` and projected
    /// into the storage system.
    ///
    /// # Errors
    /// [`GeometryError::MalformedGeometry`] when the payload is not a 2D line
    /// of at least two positions per part, and
    /// [`GeometryError::InvalidCoordinateRange`] when a position falls
    /// outside `source` or the storage system.
    pub fn path(
        &self,
        field: &str,
        payload: &Value,
        source: Srid,
    ) -> Result<FeatureGeometry, GeometryError> {
        let parsed = match payload {
            Value::String(text) => serde_json::from_str::<Value>(text)
                .map_err(|err| GeometryError::malformed(field, err.to_string()))?,
            other => other.clone(),
        };
        let geometry = geojson::Geometry::from_json_value(parsed)
            .map_err(|err| GeometryError::malformed(field, err.to_string()))?;

        let parts = match geometry.value {
            geojson::Value::LineString(positions) => vec![positions],
            geojson::Value::MultiLineString(lines) => lines,
            other => {
                return Err(GeometryError::malformed(
                    field,
                    format!("expected LineString or MultiLineString, got {}", type_name(&other)),
                ));
            }
        };
        if parts.is_empty() {
            return Err(GeometryError::malformed(field, "no lines supplied"));
        }

        let lines = parts
            .iter()
            .map(|positions| to_line(field, positions))
            .collect::<Result<Vec<_>, _>>()?;
        let declared = FeatureGeometry::new(
            source,
            Shape::MultiLineString(MultiLineString::new(lines)),
        )?;
        self.projector.to_storage(&declared)
    }
}

fn type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn to_line(field: &str, positions: &[Vec<f64>]) -> Result<LineString<f64>, GeometryError> {
    if positions.len() < 2 {
        return Err(GeometryError::malformed(
            field,
            "each line needs at least two positions",
        ));
    }
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
            [_, _] => Err(GeometryError::malformed(field, "positions must be finite")),
            _ => Err(GeometryError::malformed(
                field,
                format!("positions must have two ordinates, got {}", position.len()),
            )),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn read_pair(
    input: &Map<String, Value>,
    fields: PointFields,
) -> Result<Option<Coord<f64>>, GeometryError> {
    let x = read_number(input, fields.x)?;
    let y = read_number(input, fields.y)?;
    Ok(x.zip(y).map(|(x, y)| Coord { x, y }))
}

/// Read an optional number; numeric strings are accepted.
pub(crate) fn read_number(
    input: &Map<String, Value>,
    field: &str,
) -> Result<Option<f64>, GeometryError> {
    let parsed = match input.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(None),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(GeometryError::malformed(field, "expected a finite number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    const SCHOOL: PointFields = PointFields {
        x: "x_ecole",
        y: "y_ecole",
    };
    const FERRY: EndpointFields = EndpointFields {
        start: PointFields {
            x: "x_debut_traversee_bac",
            y: "y_debut_traversee_bac",
        },
        end: PointFields {
            x: "x_fin_traversee_bac",
            y: "y_fin_traversee_bac",
        },
    };

    #[fixture]
    fn builder() -> GeometryBuilder {
        GeometryBuilder::default()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[rstest]
    #[case(json!({"x_ecole": -13.7, "y_ecole": 9.5}), -13.7, 9.5)]
    #[case(json!({"x_ecole": "-12.25", "y_ecole": " 10.5 "}), -12.25, 10.5)]
    #[case(json!({"x_ecole": 0, "y_ecole": 0}), 0.0, 0.0)]
    fn point_keeps_input_ordinates(
        builder: GeometryBuilder,
        #[case] input: Value,
        #[case] x: f64,
        #[case] y: f64,
    ) {
        let geometry = builder
            .point(&object(input), SCHOOL, Srid::Wgs84)
            .expect("valid point")
            .expect("geometry supplied");
        assert_eq!(geometry.shape(), &Shape::Point(Point::new(x, y)));
        assert_eq!(geometry.srid(), Srid::Wgs84);
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({"x_ecole": -13.7}))]
    #[case(json!({"y_ecole": 9.5, "x_ecole": null}))]
    #[case(json!({"x_ecole": "", "y_ecole": 9.5}))]
    fn partial_pairs_mean_no_geometry(builder: GeometryBuilder, #[case] input: Value) {
        let geometry = builder
            .point(&object(input), SCHOOL, Srid::Wgs84)
            .expect("partial pair is not an error");
        assert!(geometry.is_none());
    }

    #[rstest]
    #[case(json!({"x_ecole": "abc", "y_ecole": 9.5}), "x_ecole")]
    #[case(json!({"x_ecole": -13.7, "y_ecole": [1]}), "y_ecole")]
    #[case(json!({"x_ecole": true}), "x_ecole")]
    fn non_numeric_ordinates_are_malformed(
        builder: GeometryBuilder,
        #[case] input: Value,
        #[case] bad_field: &str,
    ) {
        let err = builder
            .point(&object(input), SCHOOL, Srid::Wgs84)
            .expect_err("non-numeric input");
        assert!(
            matches!(&err, GeometryError::MalformedGeometry { field, .. } if field == bad_field),
            "unexpected error {err:?}"
        );
    }

    #[rstest]
    fn point_outside_domain_is_rejected(builder: GeometryBuilder) {
        let input = object(json!({"x_ecole": 9.5, "y_ecole": -130.0}));
        let err = builder
            .point(&input, SCHOOL, Srid::Wgs84)
            .expect_err("latitude out of range");
        assert!(matches!(err, GeometryError::InvalidCoordinateRange { .. }));
    }

    #[rstest]
    fn endpoints_build_two_vertex_line(builder: GeometryBuilder) {
        let input = object(json!({
            "x_debut_traversee_bac": -13.70,
            "y_debut_traversee_bac": 9.50,
            "x_fin_traversee_bac": -13.69,
            "y_fin_traversee_bac": 9.52,
        }));
        let geometry = builder
            .endpoints(&input, FERRY, Srid::Wgs84)
            .expect("valid line")
            .expect("geometry supplied");
        let Shape::LineString(line) = geometry.shape() else {
            panic!("expected a line");
        };
        let coords: Vec<_> = line.coords().map(|c| (c.x, c.y)).collect();
        assert_eq!(coords, vec![(-13.70, 9.50), (-13.69, 9.52)]);
    }

    #[rstest]
    fn three_endpoint_ordinates_mean_no_geometry(builder: GeometryBuilder) {
        let input = object(json!({
            "x_debut_traversee_bac": -13.70,
            "y_debut_traversee_bac": 9.50,
            "x_fin_traversee_bac": -13.69,
        }));
        let geometry = builder.endpoints(&input, FERRY, Srid::Wgs84).expect("no error");
        assert!(geometry.is_none());
    }

    #[rstest]
    fn single_line_path_becomes_multi_line_in_storage(builder: GeometryBuilder) {
        let payload = json!({
            "type": "LineString",
            "coordinates": [[642698.2, 1050398.7], [643100.0, 1050900.0]]
        });
        let geometry = builder
            .path("geom", &payload, Srid::Utm28N)
            .expect("valid path");
        assert_eq!(geometry.srid(), Srid::Utm28N);
        let Shape::MultiLineString(lines) = geometry.shape() else {
            panic!("expected a multi-line");
        };
        assert_eq!(lines.0.len(), 1);
        assert_eq!(lines.0[0].0.len(), 2);
    }

    #[rstest]
    fn geographic_path_is_projected_to_storage(builder: GeometryBuilder) {
        let payload = json!({
            "type": "MultiLineString",
            "coordinates": [[[-13.7, 9.5], [-13.69, 9.51]], [[-13.6, 9.6], [-13.59, 9.61]]]
        });
        let geometry = builder
            .path("geom", &payload, Srid::Wgs84)
            .expect("valid path");
        assert_eq!(geometry.srid(), Srid::Utm28N);
        let first = geometry.shape().coords().next().expect("has coordinates");
        assert!((first.x - 642_698.227_7).abs() < 1e-3);
    }

    #[rstest]
    fn path_accepts_serialised_geojson(builder: GeometryBuilder) {
        let payload = json!(
            r#"{"type":"LineString","coordinates":[[600000,1000000],[600100,1000100]]}"#
        );
        let geometry = builder
            .path("geom", &payload, Srid::Utm28N)
            .expect("string payload parses");
        assert_eq!(geometry.shape().type_name(), "MultiLineString");
    }

    #[rstest]
    #[case(json!({"type": "Point", "coordinates": [1.0, 2.0]}))]
    #[case(json!({"type": "LineString", "coordinates": [[600000, 1000000]]}))]
    #[case(json!({"type": "LineString", "coordinates": [[600000, 1000000, 5], [600100, 1000100, 5]]}))]
    #[case(json!({"type": "MultiLineString", "coordinates": []}))]
    #[case(json!("not geojson"))]
    #[case(json!(42))]
    fn path_rejects_malformed_payloads(builder: GeometryBuilder, #[case] payload: Value) {
        let err = builder
            .path("geom", &payload, Srid::Utm28N)
            .expect_err("malformed path");
        assert!(matches!(err, GeometryError::MalformedGeometry { .. }), "{err:?}");
    }
}
