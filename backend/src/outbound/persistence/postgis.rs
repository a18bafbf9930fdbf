//! EWKB encoding of [`FeatureGeometry`] for the PostGIS `geometry` column.
//!
//! Values are written with their SRID embedded so PostGIS checks them
//! against the column's type modifier, and read back into the domain type
//! with the same range validation applied on construction.

use std::io::Cursor;

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use geo_types::{Coord, LineString, MultiLineString, Point};
use postgis::ewkb::{
    self, AsEwkbLineString, AsEwkbMultiLineString, AsEwkbPoint, EwkbRead, EwkbWrite,
};

use crate::domain::geometry::{FeatureGeometry, Shape, Srid};

use super::schema::sql_types::Geometry;

/// A domain geometry bound to the `geometry` SQL type.
#[derive(Debug, Clone, PartialEq, AsExpression, FromSqlRow)]
#[diesel(sql_type = Geometry)]
pub(crate) struct PgGeometry(pub FeatureGeometry);

fn ewkb_point(coord: Coord<f64>, srid: Option<i32>) -> ewkb::Point {
    ewkb::Point::new(coord.x, coord.y, srid)
}

fn ewkb_line(line: &LineString<f64>, srid: Option<i32>) -> ewkb::LineString {
    ewkb::LineString {
        points: line.coords().map(|c| ewkb_point(*c, None)).collect(),
        srid,
    }
}

fn geo_line(line: &ewkb::LineString) -> LineString<f64> {
    LineString::new(line.points.iter().map(|p| Coord { x: p.x, y: p.y }).collect())
}

impl ToSql<Geometry, Pg> for PgGeometry {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let srid = Some(self.0.srid().code());
        match self.0.shape() {
            Shape::Point(point) => ewkb_point(point.0, srid).as_ewkb().write_ewkb(out)?,
            Shape::LineString(line) => ewkb_line(line, srid).as_ewkb().write_ewkb(out)?,
            Shape::MultiLineString(lines) => ewkb::MultiLineString {
                lines: lines.iter().map(|line| ewkb_line(line, None)).collect(),
                srid,
            }
            .as_ewkb()
            .write_ewkb(out)?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<Geometry, Pg> for PgGeometry {
    fn from_sql(value: PgValue<'_>) -> deserialize::Result<Self> {
        let mut reader = Cursor::new(value.as_bytes());
        let (shape, srid) = match ewkb::Geometry::read_ewkb(&mut reader)? {
            ewkb::GeometryT::Point(point) => (Shape::Point(Point::new(point.x, point.y)), point.srid),
            ewkb::GeometryT::LineString(line) => (Shape::LineString(geo_line(&line)), line.srid),
            ewkb::GeometryT::MultiLineString(lines) => (
                Shape::MultiLineString(MultiLineString::new(
                    lines.lines.iter().map(geo_line).collect(),
                )),
                lines.srid,
            ),
            _ => return Err("unsupported geometry type in store".into()),
        };
        let code = srid.ok_or("stored geometry carries no SRID")?;
        let srid = Srid::from_code(code).ok_or_else(|| format!("unsupported stored SRID {code}"))?;
        Ok(Self(FeatureGeometry::new(srid, shape)?))
    }
}
