//! Per-subtype field schemas for infrastructure features.
//!
//! Each subtype differs only in the names of its source coordinate fields
//! and its attribute list; everything else about a feature is shared.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::geometry::{EndpointFields, PointFields};

/// Infrastructure feature subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Health centres (`services_santes`).
    HealthService,
    /// Infrastructure not covered elsewhere (`autres_infrastructures`).
    OtherInfrastructure,
    /// Ferry crossings (`bacs`), surveyed as two endpoints.
    Ferry,
    /// Administrative buildings (`batiments_administratifs`).
    AdministrativeBuilding,
    /// Pipe culverts (`buses`).
    Culvert,
    /// Box culverts (`dalots`).
    BoxCulvert,
    /// Schools (`ecoles`).
    School,
    /// Water infrastructure (`infrastructures_hydrauliques`).
    WaterInfrastructure,
    /// Localities (`localites`).
    Locality,
    /// Markets (`marches`).
    Market,
    /// Submersible crossings (`passages_submersibles`), surveyed as two endpoints.
    SubmersibleCrossing,
    /// Bridges (`ponts`).
    Bridge,
}

impl FeatureKind {
    /// Every subtype, in route registration order.
    pub const ALL: [Self; 12] = [
        Self::HealthService,
        Self::OtherInfrastructure,
        Self::Ferry,
        Self::AdministrativeBuilding,
        Self::Culvert,
        Self::BoxCulvert,
        Self::School,
        Self::WaterInfrastructure,
        Self::Locality,
        Self::Market,
        Self::SubmersibleCrossing,
        Self::Bridge,
    ];

    /// URL slug and stored discriminator.
    #[must_use]
    pub fn slug(self) -> &'static str {
        self.schema().slug
    }

    /// Subtype for a slug.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    /// Field schema of the subtype.
    #[must_use]
    pub fn schema(self) -> &'static FeatureSchema {
        match self {
            Self::HealthService => &HEALTH_SERVICE,
            Self::OtherInfrastructure => &OTHER_INFRASTRUCTURE,
            Self::Ferry => &FERRY,
            Self::AdministrativeBuilding => &ADMINISTRATIVE_BUILDING,
            Self::Culvert => &CULVERT,
            Self::BoxCulvert => &BOX_CULVERT,
            Self::School => &SCHOOL,
            Self::WaterInfrastructure => &WATER_INFRASTRUCTURE,
            Self::Locality => &LOCALITY,
            Self::Market => &MARKET,
            Self::SubmersibleCrossing => &SUBMERSIBLE_CROSSING,
            Self::Bridge => &BRIDGE,
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Raised when a slug names no subtype.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown infrastructure type: {0}")]
pub struct UnknownFeatureKind(pub String);

impl FromStr for FeatureKind {
    type Err = UnknownFeatureKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slug(s).ok_or_else(|| UnknownFeatureKind(s.to_owned()))
    }
}

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    /// Free text.
    Text,
    /// Whole number.
    Integer,
    /// Decimal number.
    Float,
    /// Date or date-time, normalised to RFC 3339 UTC.
    Timestamp,
}

/// One attribute in a subtype's allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeField {
    /// Logical name used in payloads and storage.
    pub name: &'static str,
    /// Expected value type.
    pub ty: AttributeType,
}

/// Where a subtype's geometry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometrySource {
    /// A single `(x, y)` pair.
    Point(PointFields),
    /// Two endpoint pairs forming a line.
    Endpoints(EndpointFields),
}

impl GeometrySource {
    /// Input field names carrying coordinates, in `x, y[, x_end, y_end]` order.
    #[must_use]
    pub fn coordinate_fields(&self) -> Vec<&'static str> {
        match self {
            Self::Point(point) => vec![point.x, point.y],
            Self::Endpoints(ends) => vec![ends.start.x, ends.start.y, ends.end.x, ends.end.y],
        }
    }
}

/// Field schema for one subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    /// URL slug and stored discriminator.
    pub slug: &'static str,
    /// Source of the geometry.
    pub geometry: GeometrySource,
    /// Allow-listed attributes.
    pub attributes: &'static [AttributeField],
}

const fn text(name: &'static str) -> AttributeField {
    AttributeField { name, ty: AttributeType::Text }
}

const fn timestamp(name: &'static str) -> AttributeField {
    AttributeField { name, ty: AttributeType::Timestamp }
}

const fn integer(name: &'static str) -> AttributeField {
    AttributeField { name, ty: AttributeType::Integer }
}

const fn float(name: &'static str) -> AttributeField {
    AttributeField { name, ty: AttributeType::Float }
}

const fn point(x: &'static str, y: &'static str) -> GeometrySource {
    GeometrySource::Point(PointFields { x, y })
}

const fn endpoints(
    start_x: &'static str,
    start_y: &'static str,
    end_x: &'static str,
    end_y: &'static str,
) -> GeometrySource {
    GeometrySource::Endpoints(EndpointFields {
        start: PointFields { x: start_x, y: start_y },
        end: PointFields { x: end_x, y: end_y },
    })
}

static HEALTH_SERVICE: FeatureSchema = FeatureSchema {
    slug: "services_santes",
    geometry: point("x_sante", "y_sante"),
    attributes: &[text("nom"), text("type"), timestamp("date_creation")],
};

static OTHER_INFRASTRUCTURE: FeatureSchema = FeatureSchema {
    slug: "autres_infrastructures",
    geometry: point("x_autre_infrastructure", "y_autre_infrastructure"),
    attributes: &[text("type"), timestamp("date_creation")],
};

static FERRY: FeatureSchema = FeatureSchema {
    slug: "bacs",
    geometry: endpoints(
        "x_debut_traversee_bac",
        "y_debut_traversee_bac",
        "x_fin_traversee_bac",
        "y_fin_traversee_bac",
    ),
    attributes: &[text("type_bac"), text("nom_cours_eau")],
};

static ADMINISTRATIVE_BUILDING: FeatureSchema = FeatureSchema {
    slug: "batiments_administratifs",
    geometry: point("x_batiment_administratif", "y_batiment_administratif"),
    attributes: &[text("nom"), text("type"), timestamp("date_creation")],
};

static CULVERT: FeatureSchema = FeatureSchema {
    slug: "buses",
    geometry: point("x_buse", "y_buse"),
    attributes: &[text("type_buse"), integer("nombre_ouvertures")],
};

static BOX_CULVERT: FeatureSchema = FeatureSchema {
    slug: "dalots",
    geometry: point("x_dalot", "y_dalot"),
    attributes: &[text("situation_dalot"), integer("nombre_ouvertures")],
};

static SCHOOL: FeatureSchema = FeatureSchema {
    slug: "ecoles",
    geometry: point("x_ecole", "y_ecole"),
    attributes: &[text("nom"), text("type"), timestamp("date_creation")],
};

static WATER_INFRASTRUCTURE: FeatureSchema = FeatureSchema {
    slug: "infrastructures_hydrauliques",
    geometry: point("x_infrastructure_hydraulique", "y_infrastructure_hydraulique"),
    attributes: &[text("nom"), text("type"), timestamp("date_creation")],
};

static LOCALITY: FeatureSchema = FeatureSchema {
    slug: "localites",
    geometry: point("x_localite", "y_localite"),
    attributes: &[text("nom"), text("type")],
};

static MARKET: FeatureSchema = FeatureSchema {
    slug: "marches",
    geometry: point("x_marche", "y_marche"),
    attributes: &[text("nom"), text("type")],
};

static SUBMERSIBLE_CROSSING: FeatureSchema = FeatureSchema {
    slug: "passages_submersibles",
    geometry: endpoints(
        "x_debut_passage_submersible",
        "y_debut_passage_submersible",
        "x_fin_passage_submersible",
        "y_fin_passage_submersible",
    ),
    attributes: &[text("type_materiau"), float("longueur")],
};

static BRIDGE: FeatureSchema = FeatureSchema {
    slug: "ponts",
    geometry: point("x_pont", "y_pont"),
    attributes: &[
        text("situation_pont"),
        text("type_pont"),
        text("nom_cours_eau"),
        float("longueur"),
    ],
};
