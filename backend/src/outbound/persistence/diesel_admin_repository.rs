//! PostgreSQL-backed `AdminRepository` over regions, prefectures and
//! communes.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{AdminRepository, AdminRepositoryError};
use crate::domain::{AdminScope, CommuneSummary, NewCommune};

use super::diesel_error_mapping::{classify_diesel_error, classify_pool_error};
use super::models::NewCommuneRow;
use super::pool::{DbPool, PoolError};
use super::schema::{communes_rurales, prefectures, regions};

type CommuneTuple = (i32, String, Option<i32>, Option<String>, Option<i32>, Option<String>);

/// Diesel implementation of [`AdminRepository`].
#[derive(Clone)]
pub struct DieselAdminRepository {
    pool: DbPool,
}

impl DieselAdminRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AdminRepositoryError {
    classify_pool_error(error).into()
}

fn map_diesel_error(error: diesel::result::Error) -> AdminRepositoryError {
    classify_diesel_error("communes_rurales", error).into()
}

fn to_summary(
    (id, nom, prefecture_id, prefecture_nom, region_id, region_nom): CommuneTuple,
) -> CommuneSummary {
    CommuneSummary {
        id,
        nom,
        prefecture_id,
        prefecture_nom,
        region_id,
        region_nom,
    }
}

async fn load_communes(
    conn: &mut AsyncPgConnection,
    scope: &AdminScope,
) -> Result<Vec<CommuneSummary>, AdminRepositoryError> {
    let mut statement = communes_rurales::table
        .left_join(prefectures::table.left_join(regions::table))
        .select((
            communes_rurales::id,
            communes_rurales::nom,
            communes_rurales::prefectures_id,
            prefectures::nom.nullable(),
            prefectures::regions_id.nullable(),
            regions::nom.nullable(),
        ))
        .order((communes_rurales::nom.asc(), communes_rurales::id.asc()))
        .into_boxed();
    if let Some(id) = scope.commune_id {
        statement = statement.filter(communes_rurales::id.eq(id));
    }
    if let Some(id) = scope.prefecture_id {
        statement = statement.filter(communes_rurales::prefectures_id.eq(id));
    }
    if let Some(id) = scope.region_id {
        statement = statement.filter(prefectures::regions_id.eq(id));
    }
    if let Some(pattern) = scope.name_pattern() {
        statement = statement.filter(communes_rurales::nom.ilike(pattern));
    }
    let rows: Vec<CommuneTuple> = statement.load(conn).await.map_err(map_diesel_error)?;
    Ok(rows.into_iter().map(to_summary).collect())
}

#[async_trait]
impl AdminRepository for DieselAdminRepository {
    async fn communes(
        &self,
        scope: &AdminScope,
    ) -> Result<Vec<CommuneSummary>, AdminRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_communes(&mut conn, scope).await
    }

    async fn insert_commune(
        &self,
        commune: &NewCommune,
    ) -> Result<CommuneSummary, AdminRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id: i32 = diesel::insert_into(communes_rurales::table)
            .values(&NewCommuneRow {
                nom: &commune.nom,
                prefectures_id: Some(commune.prefectures_id),
            })
            .returning(communes_rurales::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let scope = AdminScope {
            commune_id: Some(id),
            ..AdminScope::default()
        };
        load_communes(&mut conn, &scope)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AdminRepositoryError::query(format!("commune {id} vanished after insert")))
    }
}
