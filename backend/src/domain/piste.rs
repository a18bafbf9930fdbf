//! Road segments ("pistes").
//!
//! A piste's geometry is fixed at creation and stored in UTM zone 28N;
//! later updates only touch the survey attributes below.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::Error;
use super::fields::{FieldReader, Presence};
use super::geometry::FeatureGeometry;

macro_rules! piste_attributes {
    ($($(#[$meta:meta])* $field:ident : $ty:ty => $reader:ident),* $(,)?) => {
        /// Survey attributes of a road segment.
        #[derive(Debug, Clone, Default, PartialEq, Serialize)]
        pub struct PisteAttributes {
            $($(#[$meta])* pub $field: Option<$ty>,)*
        }

        /// Partial update of [`PisteAttributes`]; `Some(None)` clears a value.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct PisteChanges {
            $($(#[$meta])* pub $field: Presence<$ty>,)*
        }

        impl PisteChanges {
            /// Read every known attribute out of `input`; other keys are ignored.
            ///
            /// # Errors
            /// Field-level error for the first mistyped value.
            pub fn read(input: &Map<String, Value>) -> Result<Self, Error> {
                let reader = FieldReader::new(input);
                Ok(Self {
                    $($field: reader.$reader(stringify!($field))?,)*
                })
            }

            /// Attributes for a new segment: absent and `null` both mean unset.
            #[must_use]
            pub fn into_attributes(self) -> PisteAttributes {
                PisteAttributes {
                    $($field: self.$field.flatten(),)*
                }
            }
        }

        impl PisteAttributes {
            /// Apply `changes` in place.
            pub fn apply(&mut self, changes: PisteChanges) {
                $(
                    if let Some(value) = changes.$field {
                        self.$field = value;
                    }
                )*
            }
        }
    };
}

piste_attributes! {
    /// Human-assigned code, unique when present.
    code_piste: i32 => id,
    /// Commune the segment belongs to.
    communes_rurales_id: i32 => id,
    /// Account that surveyed the segment.
    login_id: i32 => id,
    /// Survey start.
    heure_debut: DateTime<Utc> => timestamp,
    /// Survey end.
    heure_fin: DateTime<Utc> => timestamp,
    /// Name of the starting place.
    nom_origine_piste: String => text,
    /// Starting point x.
    x_origine: f64 => float,
    /// Starting point y.
    y_origine: f64 => float,
    /// Name of the destination.
    nom_destination_piste: String => text,
    /// Destination x.
    x_destination: f64 => float,
    /// Destination y.
    y_destination: f64 => float,
    /// Whether the segment crosses another road.
    existence_intersection: i32 => id,
    /// Intersection x.
    x_intersection: f64 => float,
    /// Intersection y.
    y_intersection: f64 => float,
    /// Kind of land occupation along the segment.
    type_occupation: String => text,
    /// Occupation start.
    debut_occupation: DateTime<Utc> => timestamp,
    /// Occupation end.
    fin_occupation: DateTime<Utc> => timestamp,
    /// Right-of-way width in metres.
    largeur_emprise: f64 => float,
    /// Traffic frequency.
    frequence_trafic: f64 => float,
    /// Traffic type.
    type_trafic: String => text,
    /// Works carried out.
    travaux_realises: String => text,
    /// When the works happened, as reported.
    date_travaux: String => text,
    /// Contractor.
    entreprise: String => text,
}

/// A stored road segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Piste {
    /// Surrogate identifier.
    pub id: i32,
    /// Geometry; UTM 28N when stored, WGS 84 once prepared for display.
    pub geometry: FeatureGeometry,
    /// Survey attributes.
    pub attributes: PisteAttributes,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A road segment ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPiste {
    /// Geometry in the storage system.
    pub geometry: FeatureGeometry,
    /// Survey attributes.
    pub attributes: PisteAttributes,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at` on insert.
    pub updated_at: DateTime<Utc>,
}
