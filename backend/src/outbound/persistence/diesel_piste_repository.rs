//! PostgreSQL-backed `PisteRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PisteQuery, PisteRepository, PisteRepositoryError};
use crate::domain::{NewPiste, Piste};

use super::diesel_error_mapping::{classify_diesel_error, classify_pool_error};
use super::models::{NewPisteRow, PisteAttributeColumns, PisteRow};
use super::pool::{DbPool, PoolError};
use super::postgis::PgGeometry;
use super::schema::pistes;

/// Diesel implementation of [`PisteRepository`].
#[derive(Clone)]
pub struct DieselPisteRepository {
    pool: DbPool,
}

impl DieselPisteRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PisteRepositoryError {
    classify_pool_error(error).into()
}

fn map_diesel_error(error: diesel::result::Error) -> PisteRepositoryError {
    classify_diesel_error("pistes", error).into()
}

#[async_trait]
impl PisteRepository for DieselPisteRepository {
    async fn list(&self, query: &PisteQuery) -> Result<Vec<Piste>, PisteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut statement = pistes::table
            .select(PisteRow::as_select())
            .order(pistes::id.asc())
            .into_boxed();
        if let Some(ids) = &query.commune_ids {
            statement = statement.filter(pistes::communes_rurales_id.eq_any(ids.clone()));
        }
        let rows: Vec<PisteRow> = statement.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Piste::from).collect())
    }

    async fn find(&self, id: i32) -> Result<Option<Piste>, PisteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PisteRow> = pistes::table
            .find(id)
            .select(PisteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Piste::from))
    }

    async fn insert(&self, piste: &NewPiste) -> Result<Piste, PisteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let values = NewPisteRow {
            geom: PgGeometry(piste.geometry.clone()),
            attributes: PisteAttributeColumns::from(&piste.attributes),
            created_at: piste.created_at,
            updated_at: piste.updated_at,
        };
        let row: PisteRow = diesel::insert_into(pistes::table)
            .values(&values)
            .returning(PisteRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn update(&self, piste: &Piste) -> Result<Option<Piste>, PisteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let columns = PisteAttributeColumns::from(&piste.attributes);
        let row: Option<PisteRow> = diesel::update(pistes::table.find(piste.id))
            .set((&columns, pistes::updated_at.eq(piste.updated_at)))
            .returning(PisteRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Piste::from))
    }

    async fn delete(&self, id: i32) -> Result<bool, PisteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(pistes::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
