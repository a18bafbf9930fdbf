//! Commune search and creation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::collection::{ensure_reference, store_error};
use super::ports::{
    AdminRepository, CommunesCommand, CommunesQuery, ReferenceLookup, ReferenceTarget,
};
use super::{AdminFilter, CommuneSummary, Error, NewCommune, sort_communes};

const CONTEXT: &str = "administrative repository";

/// Implements the commune driving ports.
#[derive(Clone)]
pub struct CommuneService {
    admin: Arc<dyn AdminRepository>,
    references: Arc<dyn ReferenceLookup>,
}

impl CommuneService {
    /// Build the service from its driven ports.
    pub fn new(admin: Arc<dyn AdminRepository>, references: Arc<dyn ReferenceLookup>) -> Self {
        Self { admin, references }
    }
}

#[async_trait]
impl CommunesQuery for CommuneService {
    async fn search(&self, scope: AdminFilter) -> Result<Vec<CommuneSummary>, Error> {
        let scope = scope.resolve()?;
        let mut communes = self
            .admin
            .communes(&scope)
            .await
            .map_err(|err| store_error(CONTEXT, err))?;
        sort_communes(&mut communes);
        Ok(communes)
    }
}

#[async_trait]
impl CommunesCommand for CommuneService {
    async fn create(&self, commune: NewCommune) -> Result<CommuneSummary, Error> {
        ensure_reference(
            self.references.as_ref(),
            ReferenceTarget::Prefecture,
            "prefectures_id",
            Some(commune.prefectures_id),
        )
        .await?;
        let created = self
            .admin
            .insert_commune(&commune)
            .await
            .map_err(|err| store_error(CONTEXT, err))?;
        info!(commune_id = created.id, prefecture_id = commune.prefectures_id, "commune created");
        Ok(created)
    }
}
