//! Existence checks backing reference validation.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ReferenceLookup, ReferenceLookupError, ReferenceTarget};

use super::diesel_error_mapping::{classify_diesel_error, classify_pool_error};
use super::pool::DbPool;
use super::schema::{communes_rurales, login, pistes, prefectures};

/// Diesel implementation of [`ReferenceLookup`].
#[derive(Clone)]
pub struct DieselReferenceLookup {
    pool: DbPool,
}

impl DieselReferenceLookup {
    /// Create a lookup over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceLookup for DieselReferenceLookup {
    async fn exists(&self, target: ReferenceTarget, key: i32) -> Result<bool, ReferenceLookupError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| ReferenceLookupError::from(classify_pool_error(err)))?;
        let (table, result) = match target {
            ReferenceTarget::Commune => (
                "communes_rurales",
                diesel::select(exists(communes_rurales::table.find(key)))
                    .get_result::<bool>(&mut conn)
                    .await,
            ),
            ReferenceTarget::Prefecture => (
                "prefectures",
                diesel::select(exists(prefectures::table.find(key)))
                    .get_result::<bool>(&mut conn)
                    .await,
            ),
            ReferenceTarget::Account => (
                "login",
                diesel::select(exists(login::table.find(key)))
                    .get_result::<bool>(&mut conn)
                    .await,
            ),
            ReferenceTarget::PisteCode => (
                "pistes",
                diesel::select(exists(pistes::table.filter(pistes::code_piste.eq(key))))
                    .get_result::<bool>(&mut conn)
                    .await,
            ),
        };
        result.map_err(|err| classify_diesel_error(table, err).into())
    }
}
