//! Infrastructure feature services, shared by every subtype.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Map, Value};
use tracing::info;

use super::collection::{ensure_reference, scoped_communes, store_error};
use super::feature::FeatureReferences;
use super::ports::{
    AdminRepository, FeatureRepository, FeaturesCommand, FeaturesListRequest, FeaturesQuery,
    ReferenceLookup, ReferenceTarget,
};
use super::{Error, Feature, FeatureKind, FeatureQuery, FeatureRecordMapper};

const CONTEXT: &str = "feature repository";

/// Implements the feature driving ports for all [`FeatureKind`]s.
#[derive(Clone)]
pub struct FeatureService {
    features: Arc<dyn FeatureRepository>,
    admin: Arc<dyn AdminRepository>,
    references: Arc<dyn ReferenceLookup>,
    clock: Arc<dyn Clock>,
    mapper: FeatureRecordMapper,
}

impl FeatureService {
    /// Build the service from its driven ports.
    pub fn new(
        features: Arc<dyn FeatureRepository>,
        admin: Arc<dyn AdminRepository>,
        references: Arc<dyn ReferenceLookup>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            features,
            admin,
            references,
            clock,
            mapper: FeatureRecordMapper::default(),
        }
    }

    async fn check_references(&self, refs: FeatureReferences) -> Result<(), Error> {
        ensure_reference(
            self.references.as_ref(),
            ReferenceTarget::PisteCode,
            "code_piste",
            refs.code_piste,
        )
        .await?;
        ensure_reference(
            self.references.as_ref(),
            ReferenceTarget::Account,
            "login_id",
            refs.login_id,
        )
        .await
    }

    async fn load(&self, kind: FeatureKind, id: i32) -> Result<Feature, Error> {
        self.features
            .find(kind, id)
            .await
            .map_err(|err| store_error(CONTEXT, err))?
            .ok_or_else(|| not_found(kind, id))
    }
}

fn not_found(kind: FeatureKind, id: i32) -> Error {
    Error::not_found(format!("{kind} {id} not found"))
}

#[async_trait]
impl FeaturesQuery for FeatureService {
    async fn list(
        &self,
        kind: FeatureKind,
        request: FeaturesListRequest,
    ) -> Result<Vec<Feature>, Error> {
        let commune_ids = scoped_communes(self.admin.as_ref(), request.scope).await?;
        let query = FeatureQuery {
            code_piste: request.code_piste,
            commune_ids,
        };
        self.features
            .list(kind, &query)
            .await
            .map_err(|err| store_error(CONTEXT, err))
    }

    async fn get(&self, kind: FeatureKind, id: i32) -> Result<Feature, Error> {
        self.load(kind, id).await
    }
}

#[async_trait]
impl FeaturesCommand for FeatureService {
    async fn create(
        &self,
        kind: FeatureKind,
        payload: Map<String, Value>,
    ) -> Result<Feature, Error> {
        let record = self.mapper.to_new_record(kind, &payload, self.clock.utc())?;
        self.check_references(record.references()).await?;
        let feature = self
            .features
            .insert(&record)
            .await
            .map_err(|err| store_error(CONTEXT, err))?;
        info!(%kind, feature_id = feature.id, code_piste = ?feature.code_piste, "feature created");
        Ok(feature)
    }

    async fn update(
        &self,
        kind: FeatureKind,
        id: i32,
        payload: Map<String, Value>,
    ) -> Result<Feature, Error> {
        let changes = self.mapper.to_changes(kind, &payload, self.clock.utc())?;
        let mut feature = self.load(kind, id).await?;
        self.check_references(changes.references()).await?;
        feature.apply(changes);
        let stored = self
            .features
            .update(&feature)
            .await
            .map_err(|err| store_error(CONTEXT, err))?
            .ok_or_else(|| not_found(kind, id))?;
        info!(%kind, feature_id = id, "feature updated");
        Ok(stored)
    }

    async fn delete(&self, kind: FeatureKind, id: i32) -> Result<(), Error> {
        let deleted = self
            .features
            .delete(kind, id)
            .await
            .map_err(|err| store_error(CONTEXT, err))?;
        if deleted {
            info!(%kind, feature_id = id, "feature deleted");
            Ok(())
        } else {
            Err(not_found(kind, id))
        }
    }
}

#[cfg(test)]
#[path = "feature_service_tests.rs"]
mod tests;
