//! Canonical geometries and their reference systems.
//!
//! Every geometry the service persists is a [`FeatureGeometry`]: one of
//! three shapes tagged with the SRID its coordinates are expressed in. Axis
//! order is always `(x, y)` = `(longitude, latitude)` or
//! `(easting, northing)`.

mod builder;
mod projection;

use std::fmt;

use geo_types::{Coord, LineString, MultiLineString, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use builder::{EndpointFields, GeometryBuilder, PointFields};
pub use projection::CoordinateProjector;

/// Coordinate reference systems handled by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Srid {
    /// WGS 84 geographic coordinates (EPSG:4326).
    Wgs84,
    /// WGS 84 / UTM zone 28N (EPSG:32628).
    Utm28N,
}

impl Srid {
    /// Numeric EPSG code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Wgs84 => 4326,
            Self::Utm28N => 32628,
        }
    }

    /// Look up a supported SRID by code.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            4326 => Some(Self::Wgs84),
            32628 => Some(Self::Utm28N),
            _ => None,
        }
    }

    /// Whether `(x, y)` lies inside this system's valid domain.
    #[must_use]
    pub fn contains(self, x: f64, y: f64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        match self {
            Self::Wgs84 => (-180.0..=180.0).contains(&x) && (-90.0..=90.0).contains(&y),
            Self::Utm28N => {
                (-600_000.0..=1_600_000.0).contains(&x) && (0.0..=9_400_000.0).contains(&y)
            }
        }
    }
}

impl From<Srid> for i32 {
    fn from(value: Srid) -> Self {
        value.code()
    }
}

impl TryFrom<i32> for Srid {
    type Error = GeometryError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_code(value).ok_or_else(|| {
            GeometryError::malformed("srid", format!("unsupported SRID {value}"))
        })
    }
}

impl fmt::Display for Srid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.code())
    }
}

/// Shapes a feature geometry can take.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A single position.
    Point(Point<f64>),
    /// An open line, used for two-endpoint crossings.
    LineString(LineString<f64>),
    /// One or more lines, used for road segments.
    MultiLineString(MultiLineString<f64>),
}

impl Shape {
    /// Every coordinate of the shape in order.
    pub fn coords(&self) -> Box<dyn Iterator<Item = Coord<f64>> + '_> {
        match self {
            Self::Point(point) => Box::new(std::iter::once(point.0)),
            Self::LineString(line) => Box::new(line.coords().copied()),
            Self::MultiLineString(lines) => {
                Box::new(lines.iter().flat_map(|line| line.coords().copied()))
            }
        }
    }

    /// Apply `f` to every coordinate, keeping the shape.
    ///
    /// # Errors
    /// Propagates the first error `f` returns.
    pub fn try_map_coords<F>(&self, mut f: F) -> Result<Self, GeometryError>
    where
        F: FnMut(Coord<f64>) -> Result<Coord<f64>, GeometryError>,
    {
        Ok(match self {
            Self::Point(point) => Self::Point(Point(f(point.0)?)),
            Self::LineString(line) => Self::LineString(map_line(line, &mut f)?),
            Self::MultiLineString(lines) => Self::MultiLineString(MultiLineString::new(
                lines
                    .iter()
                    .map(|line| map_line(line, &mut f))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
        })
    }

    /// OGC geometry type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::LineString(_) => "LineString",
            Self::MultiLineString(_) => "MultiLineString",
        }
    }
}

fn map_line<F>(line: &LineString<f64>, f: &mut F) -> Result<LineString<f64>, GeometryError>
where
    F: FnMut(Coord<f64>) -> Result<Coord<f64>, GeometryError>,
{
    line.coords()
        .map(|c| f(*c))
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

/// A validated geometry tagged with its reference system.
///
/// Construction checks that every coordinate lies inside the SRID's domain,
/// so a value of this type is always storable.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureGeometry {
    srid: Srid,
    shape: Shape,
}

impl FeatureGeometry {
    /// Validate `shape` against `srid`.
    ///
    /// # Errors
    /// [`GeometryError::InvalidCoordinateRange`] when a coordinate falls
    /// outside the domain of `srid`.
    pub fn new(srid: Srid, shape: Shape) -> Result<Self, GeometryError> {
        if let Some(bad) = shape.coords().find(|c| !srid.contains(c.x, c.y)) {
            return Err(GeometryError::out_of_range(srid, bad.x, bad.y));
        }
        Ok(Self { srid, shape })
    }

    /// Reference system of the coordinates.
    #[must_use]
    pub const fn srid(&self) -> Srid {
        self.srid
    }

    /// Underlying shape.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }
}

/// Failures raised while building or projecting geometries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Input could not be turned into the expected geometry.
    #[error("malformed geometry in `{field}`: {reason}")]
    MalformedGeometry {
        /// Input field at fault.
        field: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A coordinate lies outside the reference system's valid domain.
    #[error("coordinate ({x}, {y}) is outside the valid range of {srid}")]
    InvalidCoordinateRange {
        /// System whose domain was violated.
        srid: Srid,
        /// Offending x ordinate.
        x: f64,
        /// Offending y ordinate.
        y: f64,
    },
}

impl GeometryError {
    /// Build a [`GeometryError::MalformedGeometry`].
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedGeometry {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`GeometryError::InvalidCoordinateRange`].
    #[must_use]
    pub const fn out_of_range(srid: Srid, x: f64, y: f64) -> Self {
        Self::InvalidCoordinateRange { srid, x, y }
    }
}
