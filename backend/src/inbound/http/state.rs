//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountRepository, AccountsCommand, AccountsQuery, AdminRepository, CommunesCommand,
    CommunesQuery, FeatureRepository, FeaturesCommand, FeaturesQuery, LoginService,
    PisteRepository, PistesCommand, PistesQuery, ReferenceLookup,
};
use crate::domain::{AccountService, CommuneService, FeatureService, PisteService};

/// Driven adapters the domain services are built over.
///
/// The server picks Diesel repositories when a database is configured and
/// the in-memory store otherwise.
#[derive(Clone)]
pub struct DrivenPorts {
    pub accounts: Arc<dyn AccountRepository>,
    pub admin: Arc<dyn AdminRepository>,
    pub references: Arc<dyn ReferenceLookup>,
    pub pistes: Arc<dyn PisteRepository>,
    pub features: Arc<dyn FeatureRepository>,
    pub clock: Arc<dyn Clock>,
}

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountsCommand>,
    pub accounts_query: Arc<dyn AccountsQuery>,
    pub pistes: Arc<dyn PistesCommand>,
    pub pistes_query: Arc<dyn PistesQuery>,
    pub features: Arc<dyn FeaturesCommand>,
    pub features_query: Arc<dyn FeaturesQuery>,
    pub communes: Arc<dyn CommunesCommand>,
    pub communes_query: Arc<dyn CommunesQuery>,
}

impl From<DrivenPorts> for HttpStatePorts {
    fn from(driven: DrivenPorts) -> Self {
        let DrivenPorts {
            accounts,
            admin,
            references,
            pistes,
            features,
            clock,
        } = driven;
        let account_service = Arc::new(AccountService::new(
            accounts,
            admin.clone(),
            references.clone(),
        ));
        let piste_service = Arc::new(PisteService::new(
            pistes,
            admin.clone(),
            references.clone(),
            clock.clone(),
        ));
        let feature_service = Arc::new(FeatureService::new(
            features,
            admin.clone(),
            references.clone(),
            clock,
        ));
        let commune_service = Arc::new(CommuneService::new(admin, references));
        Self {
            login: account_service.clone(),
            accounts: account_service.clone(),
            accounts_query: account_service,
            pistes: piste_service.clone(),
            pistes_query: piste_service,
            features: feature_service.clone(),
            features_query: feature_service,
            communes: commune_service.clone(),
            communes_query: commune_service,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountsCommand>,
    pub accounts_query: Arc<dyn AccountsQuery>,
    pub pistes: Arc<dyn PistesCommand>,
    pub pistes_query: Arc<dyn PistesQuery>,
    pub features: Arc<dyn FeaturesCommand>,
    pub features_query: Arc<dyn FeaturesQuery>,
    pub communes: Arc<dyn CommunesCommand>,
    pub communes_query: Arc<dyn CommunesQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use pprcollecte::domain::{AccountService, CommuneService, FeatureService, PisteService};
    /// use pprcollecte::inbound::http::state::{HttpState, HttpStatePorts};
    /// use pprcollecte::outbound::memory::MemoryStore;
    ///
    /// let store = Arc::new(MemoryStore::new());
    /// let clock: Arc<dyn mockable::Clock> = Arc::new(mockable::DefaultClock);
    /// let accounts = Arc::new(AccountService::new(store.clone(), store.clone(), store.clone()));
    /// let pistes = Arc::new(PisteService::new(
    ///     store.clone(),
    ///     store.clone(),
    ///     store.clone(),
    ///     clock.clone(),
    /// ));
    /// let features = Arc::new(FeatureService::new(store.clone(), store.clone(), store.clone(), clock));
    /// let communes = Arc::new(CommuneService::new(store.clone(), store));
    /// let state = HttpState::new(HttpStatePorts {
    ///     login: accounts.clone(),
    ///     accounts: accounts.clone(),
    ///     accounts_query: accounts,
    ///     pistes: pistes.clone(),
    ///     pistes_query: pistes,
    ///     features: features.clone(),
    ///     features_query: features,
    ///     communes: communes.clone(),
    ///     communes_query: communes,
    /// });
    /// let _login = state.login.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            accounts,
            accounts_query,
            pistes,
            pistes_query,
            features,
            features_query,
            communes,
            communes_query,
        } = ports;
        Self {
            login,
            accounts,
            accounts_query,
            pistes,
            pistes_query,
            features,
            features_query,
            communes,
            communes_query,
        }
    }
}
