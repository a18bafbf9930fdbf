//! PostgreSQL-backed `FeatureRepository` over the shared `infrastructures`
//! table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::Value;

use crate::domain::ports::{FeatureRepository, FeatureRepositoryError};
use crate::domain::{Feature, FeatureKind, FeatureQuery, NewFeature, SourceCoordinates};

use super::diesel_error_mapping::{classify_diesel_error, classify_pool_error};
use super::models::{FeatureRow, FeatureValues};
use super::pool::{DbPool, PoolError};
use super::postgis::PgGeometry;
use super::schema::{infrastructures, pistes};

/// Diesel implementation of [`FeatureRepository`].
#[derive(Clone)]
pub struct DieselFeatureRepository {
    pool: DbPool,
}

impl DieselFeatureRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FeatureRepositoryError {
    classify_pool_error(error).into()
}

fn map_diesel_error(error: diesel::result::Error) -> FeatureRepositoryError {
    classify_diesel_error("infrastructures", error).into()
}

fn row_to_feature(row: FeatureRow) -> Result<Feature, FeatureRepositoryError> {
    let kind = row.kind.parse::<FeatureKind>().map_err(|err| {
        FeatureRepositoryError::corrupt(format!("row {}: {err}", row.id))
    })?;
    let Value::Object(attributes) = row.attributes else {
        return Err(FeatureRepositoryError::corrupt(format!(
            "row {}: attributes are not an object",
            row.id
        )));
    };
    Ok(Feature {
        id: row.id,
        kind,
        geometry: row.geom.0,
        fid: row.fid,
        source: SourceCoordinates {
            x: row.source_x,
            y: row.source_y,
            x_end: row.source_x_end,
            y_end: row.source_y_end,
        },
        attributes,
        code_piste: row.code_piste,
        login_id: row.login_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn values(feature: &NewFeature) -> FeatureValues {
    FeatureValues {
        kind: feature.kind.slug(),
        geom: PgGeometry(feature.geometry.clone()),
        fid: feature.fid,
        source_x: feature.source.x,
        source_y: feature.source.y,
        source_x_end: feature.source.x_end,
        source_y_end: feature.source.y_end,
        attributes: Value::Object(feature.attributes.clone()),
        code_piste: feature.code_piste,
        login_id: feature.login_id,
        updated_at: feature.updated_at,
    }
}

#[async_trait]
impl FeatureRepository for DieselFeatureRepository {
    async fn list(
        &self,
        kind: FeatureKind,
        query: &FeatureQuery,
    ) -> Result<Vec<Feature>, FeatureRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut statement = infrastructures::table
            .filter(infrastructures::kind.eq(kind.slug()))
            .select(FeatureRow::as_select())
            .order(infrastructures::id.asc())
            .into_boxed();
        if let Some(code) = query.code_piste {
            statement = statement.filter(infrastructures::code_piste.eq(code));
        }
        if let Some(ids) = &query.commune_ids {
            let codes = pistes::table
                .filter(pistes::communes_rurales_id.eq_any(ids.clone()))
                .select(pistes::code_piste);
            statement = statement.filter(infrastructures::code_piste.eq_any(codes));
        }
        let rows: Vec<FeatureRow> = statement.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_feature).collect()
    }

    async fn find(
        &self,
        kind: FeatureKind,
        id: i32,
    ) -> Result<Option<Feature>, FeatureRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<FeatureRow> = infrastructures::table
            .filter(infrastructures::id.eq(id))
            .filter(infrastructures::kind.eq(kind.slug()))
            .select(FeatureRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_feature).transpose()
    }

    async fn insert(&self, feature: &NewFeature) -> Result<Feature, FeatureRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: FeatureRow = diesel::insert_into(infrastructures::table)
            .values((
                values(feature),
                infrastructures::created_at.eq(feature.created_at),
            ))
            .returning(FeatureRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_feature(row)
    }

    async fn update(&self, feature: &Feature) -> Result<Option<Feature>, FeatureRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = values(&NewFeature {
            kind: feature.kind,
            geometry: feature.geometry.clone(),
            fid: feature.fid,
            source: feature.source,
            attributes: feature.attributes.clone(),
            code_piste: feature.code_piste,
            login_id: feature.login_id,
            created_at: feature.created_at,
            updated_at: feature.updated_at,
        });
        let row: Option<FeatureRow> = diesel::update(
            infrastructures::table
                .filter(infrastructures::id.eq(feature.id))
                .filter(infrastructures::kind.eq(feature.kind.slug())),
        )
        .set(&changes)
        .returning(FeatureRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        row.map(row_to_feature).transpose()
    }

    async fn delete(&self, kind: FeatureKind, id: i32) -> Result<bool, FeatureRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            infrastructures::table
                .filter(infrastructures::id.eq(id))
                .filter(infrastructures::kind.eq(kind.slug())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
