//! Road segment services.
//!
//! Creation builds the path geometry, projects it into UTM 28N and checks
//! the segment's references before a single insert. Reads hand geometry
//! back in WGS 84.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Map, Value};
use tracing::info;

use super::collection::{ensure_reference, scoped_communes, store_error};
use super::fields::{FieldReader, missing_field};
use super::geometry::{CoordinateProjector, GeometryBuilder, Srid};
use super::ports::{
    AdminRepository, PisteQuery, PisteRepository, PistesCommand, PistesQuery, ReferenceLookup,
    ReferenceTarget,
};
use super::{AdminFilter, Error, NewPiste, Piste, PisteAttributes, PisteChanges};

const CONTEXT: &str = "piste repository";
const GEOMETRY_FIELD: &str = "geom";

/// Implements the road segment driving ports.
#[derive(Clone)]
pub struct PisteService {
    pistes: Arc<dyn PisteRepository>,
    admin: Arc<dyn AdminRepository>,
    references: Arc<dyn ReferenceLookup>,
    clock: Arc<dyn Clock>,
    builder: GeometryBuilder,
    projector: CoordinateProjector,
}

impl PisteService {
    /// Build the service from its driven ports.
    pub fn new(
        pistes: Arc<dyn PisteRepository>,
        admin: Arc<dyn AdminRepository>,
        references: Arc<dyn ReferenceLookup>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pistes,
            admin,
            references,
            clock,
            builder: GeometryBuilder::default(),
            projector: CoordinateProjector::default(),
        }
    }

    async fn check_references(&self, attributes: &PisteAttributes) -> Result<(), Error> {
        ensure_reference(
            self.references.as_ref(),
            ReferenceTarget::Commune,
            "communes_rurales_id",
            attributes.communes_rurales_id,
        )
        .await?;
        ensure_reference(
            self.references.as_ref(),
            ReferenceTarget::Account,
            "login_id",
            attributes.login_id,
        )
        .await
    }

    fn for_display(&self, mut piste: Piste) -> Result<Piste, Error> {
        piste.geometry = self.projector.to_display(&piste.geometry)?;
        Ok(piste)
    }

    async fn load(&self, id: i32) -> Result<Piste, Error> {
        self.pistes
            .find(id)
            .await
            .map_err(|err| store_error(CONTEXT, err))?
            .ok_or_else(|| Error::not_found(format!("piste {id} not found")))
    }
}

fn source_srid(payload: &Map<String, Value>) -> Result<Srid, Error> {
    match FieldReader::new(payload).id("srid")?.flatten() {
        None => Ok(Srid::Utm28N),
        Some(code) => Ok(Srid::try_from(code)?),
    }
}

#[async_trait]
impl PistesQuery for PisteService {
    async fn list(&self, scope: AdminFilter) -> Result<Vec<Piste>, Error> {
        let commune_ids = scoped_communes(self.admin.as_ref(), scope).await?;
        let pistes = self
            .pistes
            .list(&PisteQuery { commune_ids })
            .await
            .map_err(|err| store_error(CONTEXT, err))?;
        pistes
            .into_iter()
            .map(|piste| self.for_display(piste))
            .collect()
    }

    async fn get(&self, id: i32) -> Result<Piste, Error> {
        let piste = self.load(id).await?;
        self.for_display(piste)
    }
}

#[async_trait]
impl PistesCommand for PisteService {
    async fn create(&self, payload: Map<String, Value>) -> Result<Piste, Error> {
        let geom = payload
            .get(GEOMETRY_FIELD)
            .filter(|value| !value.is_null())
            .ok_or_else(|| missing_field(GEOMETRY_FIELD))?;
        let source = source_srid(&payload)?;
        let geometry = self.builder.path(GEOMETRY_FIELD, geom, source)?;
        let attributes = PisteChanges::read(&payload)?.into_attributes();
        self.check_references(&attributes).await?;

        let now = self.clock.utc();
        let piste = self
            .pistes
            .insert(&NewPiste {
                geometry,
                attributes,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| store_error(CONTEXT, err))?;
        info!(piste_id = piste.id, code_piste = ?piste.attributes.code_piste, %source, "piste created");
        Ok(piste)
    }

    async fn update(&self, id: i32, payload: Map<String, Value>) -> Result<Piste, Error> {
        let changes = PisteChanges::read(&payload)?;
        let mut piste = self.load(id).await?;
        piste.attributes.apply(changes);
        self.check_references(&piste.attributes).await?;
        piste.updated_at = self.clock.utc();

        let stored = self
            .pistes
            .update(&piste)
            .await
            .map_err(|err| store_error(CONTEXT, err))?
            .ok_or_else(|| Error::not_found(format!("piste {id} not found")))?;
        info!(piste_id = id, "piste updated");
        self.for_display(stored)
    }

    async fn delete(&self, id: i32) -> Result<(), Error> {
        let deleted = self
            .pistes
            .delete(id)
            .await
            .map_err(|err| store_error(CONTEXT, err))?;
        if deleted {
            info!(piste_id = id, "piste deleted");
            Ok(())
        } else {
            Err(Error::not_found(format!("piste {id} not found")))
        }
    }
}

#[cfg(test)]
#[path = "piste_service_tests.rs"]
mod tests;
