//! Builders selecting the driven adapters behind the HTTP state.

use std::sync::Arc;

use actix_web::web;

use pprcollecte::inbound::http::state::{DrivenPorts, HttpState, HttpStatePorts};
use pprcollecte::outbound::memory::MemoryStore;
use pprcollecte::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselAdminRepository, DieselFeatureRepository,
    DieselPisteRepository, DieselReferenceLookup,
};

use super::ServerConfig;

fn diesel_ports(pool: &DbPool) -> DrivenPorts {
    DrivenPorts {
        accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
        admin: Arc::new(DieselAdminRepository::new(pool.clone())),
        references: Arc::new(DieselReferenceLookup::new(pool.clone())),
        pistes: Arc::new(DieselPisteRepository::new(pool.clone())),
        features: Arc::new(DieselFeatureRepository::new(pool.clone())),
        clock: Arc::new(mockable::DefaultClock),
    }
}

fn memory_ports(store: MemoryStore) -> DrivenPorts {
    let store = Arc::new(store);
    DrivenPorts {
        accounts: store.clone(),
        admin: store.clone(),
        references: store.clone(),
        pistes: store.clone(),
        features: store,
        clock: Arc::new(mockable::DefaultClock),
    }
}

/// Select Diesel adapters when a pool is configured, otherwise an empty
/// in-memory store.
fn build_driven_ports(config: &ServerConfig) -> DrivenPorts {
    match &config.db_pool {
        Some(pool) => diesel_ports(pool),
        None => memory_ports(MemoryStore::new()),
    }
}

/// Build the shared HTTP state from the configured adapters.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = HttpStatePorts::from(build_driven_ports(config));
    web::Data::new(HttpState::new(ports))
}
