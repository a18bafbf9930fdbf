//! Diesel table definitions for the PostGIS schema.
//!
//! Kept in step with `backend/migrations`. Boundary geometries of the
//! administrative tables are not read by the service and are left out.

/// Custom SQL types.
pub mod sql_types {
    /// PostGIS `geometry`.
    #[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "geometry"))]
    pub struct Geometry;
}

diesel::table! {
    /// Top level of the administrative hierarchy.
    regions (id) {
        id -> Int4,
        nom -> Varchar,
    }
}

diesel::table! {
    /// Prefectures; `regions_id` is cleared when the region is deleted.
    prefectures (id) {
        id -> Int4,
        nom -> Varchar,
        regions_id -> Nullable<Int4>,
    }
}

diesel::table! {
    /// Rural communes; deleted with their prefecture.
    communes_rurales (id) {
        id -> Int4,
        nom -> Varchar,
        prefectures_id -> Nullable<Int4>,
    }
}

diesel::table! {
    /// Field agent accounts. `mail` is unique; `mdp` holds an Argon2 PHC string.
    login (id) {
        id -> Int4,
        nom -> Varchar,
        prenom -> Varchar,
        mail -> Varchar,
        mdp -> Varchar,
        role -> Varchar,
        communes_rurales_id -> Nullable<Int4>,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use super::sql_types::Geometry;

    /// Road segments; geometry is a MultiLineString in EPSG:32628.
    pistes (id) {
        id -> Int4,
        geom -> Geometry,
        code_piste -> Nullable<Int4>,
        communes_rurales_id -> Nullable<Int4>,
        login_id -> Nullable<Int4>,
        heure_debut -> Nullable<Timestamptz>,
        heure_fin -> Nullable<Timestamptz>,
        nom_origine_piste -> Nullable<Varchar>,
        x_origine -> Nullable<Float8>,
        y_origine -> Nullable<Float8>,
        nom_destination_piste -> Nullable<Varchar>,
        x_destination -> Nullable<Float8>,
        y_destination -> Nullable<Float8>,
        existence_intersection -> Nullable<Int4>,
        x_intersection -> Nullable<Float8>,
        y_intersection -> Nullable<Float8>,
        type_occupation -> Nullable<Varchar>,
        debut_occupation -> Nullable<Timestamptz>,
        fin_occupation -> Nullable<Timestamptz>,
        largeur_emprise -> Nullable<Float8>,
        frequence_trafic -> Nullable<Float8>,
        type_trafic -> Nullable<Varchar>,
        travaux_realises -> Nullable<Varchar>,
        date_travaux -> Nullable<Varchar>,
        entreprise -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use super::sql_types::Geometry;

    /// Every infrastructure feature subtype, discriminated by `kind`.
    infrastructures (id) {
        id -> Int4,
        kind -> Varchar,
        geom -> Geometry,
        fid -> Nullable<Int8>,
        source_x -> Nullable<Float8>,
        source_y -> Nullable<Float8>,
        source_x_end -> Nullable<Float8>,
        source_y_end -> Nullable<Float8>,
        attributes -> Jsonb,
        code_piste -> Nullable<Int4>,
        login_id -> Nullable<Int4>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(prefectures -> regions (regions_id));
diesel::joinable!(communes_rurales -> prefectures (prefectures_id));
diesel::joinable!(login -> communes_rurales (communes_rurales_id));
diesel::joinable!(pistes -> communes_rurales (communes_rurales_id));
diesel::joinable!(pistes -> login (login_id));
diesel::joinable!(infrastructures -> login (login_id));

diesel::allow_tables_to_appear_in_same_query!(
    regions,
    prefectures,
    communes_rurales,
    login,
    pistes,
    infrastructures,
);
