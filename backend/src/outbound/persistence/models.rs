//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; repositories convert them to
//! and from domain records.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{Piste, PisteAttributes};

use super::postgis::PgGeometry;
use super::schema::{communes_rurales, infrastructures, login, pistes};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Row read from `login`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = login)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: i32,
    pub nom: String,
    pub prenom: String,
    pub mail: String,
    pub mdp: String,
    pub role: String,
    pub communes_rurales_id: Option<i32>,
}

/// Insertable and changeset form of an account.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = login)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AccountValues<'a> {
    pub nom: &'a str,
    pub prenom: &'a str,
    pub mail: &'a str,
    pub mdp: &'a str,
    pub role: &'a str,
    pub communes_rurales_id: Option<i32>,
}

// ---------------------------------------------------------------------------
// Road segments
// ---------------------------------------------------------------------------

/// Survey attribute columns of `pistes`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = pistes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PisteAttributeColumns {
    pub code_piste: Option<i32>,
    pub communes_rurales_id: Option<i32>,
    pub login_id: Option<i32>,
    pub heure_debut: Option<DateTime<Utc>>,
    pub heure_fin: Option<DateTime<Utc>>,
    pub nom_origine_piste: Option<String>,
    pub x_origine: Option<f64>,
    pub y_origine: Option<f64>,
    pub nom_destination_piste: Option<String>,
    pub x_destination: Option<f64>,
    pub y_destination: Option<f64>,
    pub existence_intersection: Option<i32>,
    pub x_intersection: Option<f64>,
    pub y_intersection: Option<f64>,
    pub type_occupation: Option<String>,
    pub debut_occupation: Option<DateTime<Utc>>,
    pub fin_occupation: Option<DateTime<Utc>>,
    pub largeur_emprise: Option<f64>,
    pub frequence_trafic: Option<f64>,
    pub type_trafic: Option<String>,
    pub travaux_realises: Option<String>,
    pub date_travaux: Option<String>,
    pub entreprise: Option<String>,
}

impl From<PisteAttributeColumns> for PisteAttributes {
    fn from(row: PisteAttributeColumns) -> Self {
        Self {
            code_piste: row.code_piste,
            communes_rurales_id: row.communes_rurales_id,
            login_id: row.login_id,
            heure_debut: row.heure_debut,
            heure_fin: row.heure_fin,
            nom_origine_piste: row.nom_origine_piste,
            x_origine: row.x_origine,
            y_origine: row.y_origine,
            nom_destination_piste: row.nom_destination_piste,
            x_destination: row.x_destination,
            y_destination: row.y_destination,
            existence_intersection: row.existence_intersection,
            x_intersection: row.x_intersection,
            y_intersection: row.y_intersection,
            type_occupation: row.type_occupation,
            debut_occupation: row.debut_occupation,
            fin_occupation: row.fin_occupation,
            largeur_emprise: row.largeur_emprise,
            frequence_trafic: row.frequence_trafic,
            type_trafic: row.type_trafic,
            travaux_realises: row.travaux_realises,
            date_travaux: row.date_travaux,
            entreprise: row.entreprise,
        }
    }
}

impl From<&PisteAttributes> for PisteAttributeColumns {
    fn from(attributes: &PisteAttributes) -> Self {
        let attributes = attributes.clone();
        Self {
            code_piste: attributes.code_piste,
            communes_rurales_id: attributes.communes_rurales_id,
            login_id: attributes.login_id,
            heure_debut: attributes.heure_debut,
            heure_fin: attributes.heure_fin,
            nom_origine_piste: attributes.nom_origine_piste,
            x_origine: attributes.x_origine,
            y_origine: attributes.y_origine,
            nom_destination_piste: attributes.nom_destination_piste,
            x_destination: attributes.x_destination,
            y_destination: attributes.y_destination,
            existence_intersection: attributes.existence_intersection,
            x_intersection: attributes.x_intersection,
            y_intersection: attributes.y_intersection,
            type_occupation: attributes.type_occupation,
            debut_occupation: attributes.debut_occupation,
            fin_occupation: attributes.fin_occupation,
            largeur_emprise: attributes.largeur_emprise,
            frequence_trafic: attributes.frequence_trafic,
            type_trafic: attributes.type_trafic,
            travaux_realises: attributes.travaux_realises,
            date_travaux: attributes.date_travaux,
            entreprise: attributes.entreprise,
        }
    }
}

/// Row read from `pistes`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pistes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PisteRow {
    pub id: i32,
    pub geom: PgGeometry,
    #[diesel(embed)]
    pub attributes: PisteAttributeColumns,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PisteRow> for Piste {
    fn from(row: PisteRow) -> Self {
        Self {
            id: row.id,
            geometry: row.geom.0,
            attributes: row.attributes.into(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable form of a new road segment.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pistes)]
pub(crate) struct NewPisteRow {
    pub geom: PgGeometry,
    #[diesel(embed)]
    pub attributes: PisteAttributeColumns,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Infrastructure features
// ---------------------------------------------------------------------------

/// Row read from `infrastructures`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = infrastructures)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FeatureRow {
    pub id: i32,
    pub kind: String,
    pub geom: PgGeometry,
    pub fid: Option<i64>,
    pub source_x: Option<f64>,
    pub source_y: Option<f64>,
    pub source_x_end: Option<f64>,
    pub source_y_end: Option<f64>,
    pub attributes: serde_json::Value,
    pub code_piste: Option<i32>,
    pub login_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable and changeset form of a feature.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = infrastructures)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct FeatureValues {
    pub kind: &'static str,
    pub geom: PgGeometry,
    pub fid: Option<i64>,
    pub source_x: Option<f64>,
    pub source_y: Option<f64>,
    pub source_x_end: Option<f64>,
    pub source_y_end: Option<f64>,
    pub attributes: serde_json::Value,
    pub code_piste: Option<i32>,
    pub login_id: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Administrative hierarchy
// ---------------------------------------------------------------------------

/// Insertable commune.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = communes_rurales)]
pub(crate) struct NewCommuneRow<'a> {
    pub nom: &'a str,
    pub prefectures_id: Option<i32>,
}
