//! In-process store implementing every driven port.
//!
//! Used when no database is configured and by the integration tests. It
//! mirrors the PostGIS schema's constraints: unique `mail` and `code_piste`,
//! foreign keys checked on write, `ON DELETE SET NULL` for optional links and
//! `ON DELETE CASCADE` from prefectures to communes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, AdminRepository, AdminRepositoryError,
    FeatureRepository, FeatureRepositoryError, PisteQuery, PisteRepository, PisteRepositoryError,
    ReferenceLookup, ReferenceLookupError, ReferenceTarget,
};
use crate::domain::{
    Account, AccountQuery, AdminScope, CommuneSummary, Feature, FeatureKind, FeatureQuery,
    NewAccount, NewCommune, NewFeature, NewPiste, Piste, sort_communes,
};

#[derive(Debug, Clone)]
struct RegionRecord {
    nom: String,
}

#[derive(Debug, Clone)]
struct PrefectureRecord {
    nom: String,
    regions_id: Option<i32>,
}

#[derive(Debug, Clone)]
struct CommuneRecord {
    nom: String,
    prefectures_id: Option<i32>,
}

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn insert(&mut self, row: T) -> i32 {
        self.next_id += 1;
        self.rows.insert(self.next_id, row);
        self.next_id
    }
}

#[derive(Debug, Default)]
struct State {
    regions: Table<RegionRecord>,
    prefectures: Table<PrefectureRecord>,
    communes: Table<CommuneRecord>,
    accounts: Table<Account>,
    pistes: Table<Piste>,
    features: Table<Feature>,
}

impl State {
    fn commune_summary(&self, id: i32, commune: &CommuneRecord) -> CommuneSummary {
        let prefecture = commune
            .prefectures_id
            .and_then(|pid| self.prefectures.rows.get(&pid).map(|p| (pid, p)));
        let region = prefecture
            .and_then(|(_, p)| p.regions_id)
            .and_then(|rid| self.regions.rows.get(&rid).map(|r| (rid, r)));
        CommuneSummary {
            id,
            nom: commune.nom.clone(),
            prefecture_id: commune.prefectures_id,
            prefecture_nom: prefecture.map(|(_, p)| p.nom.clone()),
            region_id: prefecture.and_then(|(_, p)| p.regions_id),
            region_nom: region.map(|(_, r)| r.nom.clone()),
        }
    }

    fn piste_code_exists(&self, code: i32) -> bool {
        self.pistes
            .rows
            .values()
            .any(|p| p.attributes.code_piste == Some(code))
    }

    fn missing_piste_reference(&self, piste: &Piste) -> Option<&'static str> {
        let attributes = &piste.attributes;
        if attributes
            .communes_rurales_id
            .is_some_and(|id| !self.communes.rows.contains_key(&id))
        {
            return Some("communes_rurales_id");
        }
        if attributes
            .login_id
            .is_some_and(|id| !self.accounts.rows.contains_key(&id))
        {
            return Some("login_id");
        }
        None
    }

    fn duplicate_code(&self, piste: &Piste) -> bool {
        piste.attributes.code_piste.is_some_and(|code| {
            self.pistes
                .rows
                .iter()
                .any(|(id, other)| *id != piste.id && other.attributes.code_piste == Some(code))
        })
    }

    fn missing_feature_reference(&self, feature: &Feature) -> Option<&'static str> {
        if feature.code_piste.is_some_and(|code| !self.piste_code_exists(code)) {
            return Some("code_piste");
        }
        if feature
            .login_id
            .is_some_and(|id| !self.accounts.rows.contains_key(&id))
        {
            return Some("login_id");
        }
        None
    }

    fn cascade_commune_delete(&mut self, commune_id: i32) {
        self.communes.rows.remove(&commune_id);
        for account in self.accounts.rows.values_mut() {
            if account.communes_rurales_id == Some(commune_id) {
                account.communes_rurales_id = None;
            }
        }
        for piste in self.pistes.rows.values_mut() {
            if piste.attributes.communes_rurales_id == Some(commune_id) {
                piste.attributes.communes_rurales_id = None;
            }
        }
    }
}

/// Shared in-memory store; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

fn poisoned() -> String {
    "in-memory store lock poisoned".to_owned()
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, String> {
        self.state.lock().map_err(|_| poisoned())
    }

    /// Add a region and return its identifier.
    ///
    /// # Errors
    /// Fails only if the store lock is poisoned.
    pub fn add_region(&self, nom: &str) -> Result<i32, AdminRepositoryError> {
        let mut state = self.lock().map_err(AdminRepositoryError::connection)?;
        Ok(state.regions.insert(RegionRecord {
            nom: nom.to_owned(),
        }))
    }

    /// Add a prefecture under `region` and return its identifier.
    ///
    /// # Errors
    /// [`AdminRepositoryError::MissingReference`] when `region` is unknown.
    pub fn add_prefecture(
        &self,
        nom: &str,
        region: Option<i32>,
    ) -> Result<i32, AdminRepositoryError> {
        let mut state = self.lock().map_err(AdminRepositoryError::connection)?;
        if region.is_some_and(|id| !state.regions.rows.contains_key(&id)) {
            return Err(AdminRepositoryError::missing_reference("regions_id"));
        }
        Ok(state.prefectures.insert(PrefectureRecord {
            nom: nom.to_owned(),
            regions_id: region,
        }))
    }

    /// Delete a region; its prefectures lose the link.
    ///
    /// # Errors
    /// Fails only if the store lock is poisoned.
    pub fn delete_region(&self, id: i32) -> Result<bool, AdminRepositoryError> {
        let mut state = self.lock().map_err(AdminRepositoryError::connection)?;
        let removed = state.regions.rows.remove(&id).is_some();
        for prefecture in state.prefectures.rows.values_mut() {
            if prefecture.regions_id == Some(id) {
                prefecture.regions_id = None;
            }
        }
        Ok(removed)
    }

    /// Delete a prefecture together with its communes.
    ///
    /// # Errors
    /// Fails only if the store lock is poisoned.
    pub fn delete_prefecture(&self, id: i32) -> Result<bool, AdminRepositoryError> {
        let mut state = self.lock().map_err(AdminRepositoryError::connection)?;
        let removed = state.prefectures.rows.remove(&id).is_some();
        let communes: Vec<i32> = state
            .communes
            .rows
            .iter()
            .filter(|(_, c)| c.prefectures_id == Some(id))
            .map(|(cid, _)| *cid)
            .collect();
        for commune in communes {
            state.cascade_commune_delete(commune);
        }
        Ok(removed)
    }

    /// Delete a commune; accounts and road segments lose the link.
    ///
    /// # Errors
    /// Fails only if the store lock is poisoned.
    pub fn delete_commune(&self, id: i32) -> Result<bool, AdminRepositoryError> {
        let mut state = self.lock().map_err(AdminRepositoryError::connection)?;
        let existed = state.communes.rows.contains_key(&id);
        state.cascade_commune_delete(id);
        Ok(existed)
    }
}

#[async_trait]
impl AdminRepository for MemoryStore {
    async fn communes(
        &self,
        scope: &AdminScope,
    ) -> Result<Vec<CommuneSummary>, AdminRepositoryError> {
        let state = self.lock().map_err(AdminRepositoryError::connection)?;
        let mut communes: Vec<_> = state
            .communes
            .rows
            .iter()
            .map(|(id, commune)| state.commune_summary(*id, commune))
            .filter(|summary| scope.matches(summary))
            .collect();
        sort_communes(&mut communes);
        Ok(communes)
    }

    async fn insert_commune(
        &self,
        commune: &NewCommune,
    ) -> Result<CommuneSummary, AdminRepositoryError> {
        let mut state = self.lock().map_err(AdminRepositoryError::connection)?;
        if !state.prefectures.rows.contains_key(&commune.prefectures_id) {
            return Err(AdminRepositoryError::missing_reference("prefectures_id"));
        }
        let record = CommuneRecord {
            nom: commune.nom.clone(),
            prefectures_id: Some(commune.prefectures_id),
        };
        let id = state.communes.insert(record.clone());
        Ok(state.commune_summary(id, &record))
    }
}

#[async_trait]
impl ReferenceLookup for MemoryStore {
    async fn exists(&self, target: ReferenceTarget, key: i32) -> Result<bool, ReferenceLookupError> {
        let state = self.lock().map_err(ReferenceLookupError::connection)?;
        Ok(match target {
            ReferenceTarget::Commune => state.communes.rows.contains_key(&key),
            ReferenceTarget::Prefecture => state.prefectures.rows.contains_key(&key),
            ReferenceTarget::Account => state.accounts.rows.contains_key(&key),
            ReferenceTarget::PisteCode => state.piste_code_exists(key),
        })
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn list(&self, query: &AccountQuery) -> Result<Vec<Account>, AccountRepositoryError> {
        let state = self.lock().map_err(AccountRepositoryError::connection)?;
        Ok(state
            .accounts
            .rows
            .values()
            .filter(|a| query.role.is_none_or(|role| a.role == role))
            .filter(|a| {
                query.commune_ids.as_ref().is_none_or(|ids| {
                    a.communes_rurales_id.is_some_and(|id| ids.contains(&id))
                })
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Account>, AccountRepositoryError> {
        let state = self.lock().map_err(AccountRepositoryError::connection)?;
        Ok(state.accounts.rows.get(&id).cloned())
    }

    async fn find_by_mail(&self, mail: &str) -> Result<Option<Account>, AccountRepositoryError> {
        let state = self.lock().map_err(AccountRepositoryError::connection)?;
        Ok(state
            .accounts
            .rows
            .values()
            .find(|a| a.mail.as_str() == mail)
            .cloned())
    }

    async fn insert(&self, account: &NewAccount) -> Result<Account, AccountRepositoryError> {
        let mut state = self.lock().map_err(AccountRepositoryError::connection)?;
        if state.accounts.rows.values().any(|a| a.mail == account.mail) {
            return Err(AccountRepositoryError::duplicate("mail"));
        }
        if account
            .communes_rurales_id
            .is_some_and(|id| !state.communes.rows.contains_key(&id))
        {
            return Err(AccountRepositoryError::missing_reference("communes_rurales_id"));
        }
        let id = state.accounts.next_id + 1;
        let stored = Account {
            id,
            nom: account.nom.clone(),
            prenom: account.prenom.clone(),
            mail: account.mail.clone(),
            password: account.password.clone(),
            role: account.role,
            communes_rurales_id: account.communes_rurales_id,
        };
        state.accounts.insert(stored.clone());
        Ok(stored)
    }

    async fn update(&self, account: &Account) -> Result<Option<Account>, AccountRepositoryError> {
        let mut state = self.lock().map_err(AccountRepositoryError::connection)?;
        if !state.accounts.rows.contains_key(&account.id) {
            return Ok(None);
        }
        if state
            .accounts
            .rows
            .values()
            .any(|a| a.id != account.id && a.mail == account.mail)
        {
            return Err(AccountRepositoryError::duplicate("mail"));
        }
        if account
            .communes_rurales_id
            .is_some_and(|id| !state.communes.rows.contains_key(&id))
        {
            return Err(AccountRepositoryError::missing_reference("communes_rurales_id"));
        }
        state.accounts.rows.insert(account.id, account.clone());
        Ok(Some(account.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, AccountRepositoryError> {
        let mut state = self.lock().map_err(AccountRepositoryError::connection)?;
        if state.accounts.rows.remove(&id).is_none() {
            return Ok(false);
        }
        for piste in state.pistes.rows.values_mut() {
            if piste.attributes.login_id == Some(id) {
                piste.attributes.login_id = None;
            }
        }
        for feature in state.features.rows.values_mut() {
            if feature.login_id == Some(id) {
                feature.login_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl PisteRepository for MemoryStore {
    async fn list(&self, query: &PisteQuery) -> Result<Vec<Piste>, PisteRepositoryError> {
        let state = self.lock().map_err(PisteRepositoryError::connection)?;
        Ok(state
            .pistes
            .rows
            .values()
            .filter(|p| {
                query.commune_ids.as_ref().is_none_or(|ids| {
                    p.attributes
                        .communes_rurales_id
                        .is_some_and(|id| ids.contains(&id))
                })
            })
            .cloned()
            .collect())
    }

    async fn find(&self, id: i32) -> Result<Option<Piste>, PisteRepositoryError> {
        let state = self.lock().map_err(PisteRepositoryError::connection)?;
        Ok(state.pistes.rows.get(&id).cloned())
    }

    async fn insert(&self, piste: &NewPiste) -> Result<Piste, PisteRepositoryError> {
        let mut state = self.lock().map_err(PisteRepositoryError::connection)?;
        let stored = Piste {
            id: state.pistes.next_id + 1,
            geometry: piste.geometry.clone(),
            attributes: piste.attributes.clone(),
            created_at: piste.created_at,
            updated_at: piste.updated_at,
        };
        if state.duplicate_code(&stored) {
            return Err(PisteRepositoryError::duplicate("code_piste"));
        }
        if let Some(field) = state.missing_piste_reference(&stored) {
            return Err(PisteRepositoryError::missing_reference(field));
        }
        state.pistes.insert(stored.clone());
        Ok(stored)
    }

    async fn update(&self, piste: &Piste) -> Result<Option<Piste>, PisteRepositoryError> {
        let mut state = self.lock().map_err(PisteRepositoryError::connection)?;
        let Some(current) = state.pistes.rows.get(&piste.id).cloned() else {
            return Ok(None);
        };
        let updated = Piste {
            attributes: piste.attributes.clone(),
            updated_at: piste.updated_at,
            ..current.clone()
        };
        if state.duplicate_code(&updated) {
            return Err(PisteRepositoryError::duplicate("code_piste"));
        }
        if let Some(field) = state.missing_piste_reference(&updated) {
            return Err(PisteRepositoryError::missing_reference(field));
        }
        let old_code = current.attributes.code_piste;
        let new_code = updated.attributes.code_piste;
        if old_code != new_code {
            for feature in state.features.rows.values_mut() {
                if old_code.is_some() && feature.code_piste == old_code {
                    feature.code_piste = new_code;
                }
            }
        }
        state.pistes.rows.insert(piste.id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: i32) -> Result<bool, PisteRepositoryError> {
        let mut state = self.lock().map_err(PisteRepositoryError::connection)?;
        let Some(removed) = state.pistes.rows.remove(&id) else {
            return Ok(false);
        };
        if let Some(code) = removed.attributes.code_piste {
            for feature in state.features.rows.values_mut() {
                if feature.code_piste == Some(code) {
                    feature.code_piste = None;
                }
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl FeatureRepository for MemoryStore {
    async fn list(
        &self,
        kind: FeatureKind,
        query: &FeatureQuery,
    ) -> Result<Vec<Feature>, FeatureRepositoryError> {
        let state = self.lock().map_err(FeatureRepositoryError::connection)?;
        let scoped_codes: Option<Vec<i32>> = query.commune_ids.as_ref().map(|ids| {
            state
                .pistes
                .rows
                .values()
                .filter(|p| {
                    p.attributes
                        .communes_rurales_id
                        .is_some_and(|id| ids.contains(&id))
                })
                .filter_map(|p| p.attributes.code_piste)
                .collect()
        });
        Ok(state
            .features
            .rows
            .values()
            .filter(|f| f.kind == kind)
            .filter(|f| query.code_piste.is_none_or(|code| f.code_piste == Some(code)))
            .filter(|f| {
                scoped_codes.as_ref().is_none_or(|codes| {
                    f.code_piste.is_some_and(|code| codes.contains(&code))
                })
            })
            .cloned()
            .collect())
    }

    async fn find(
        &self,
        kind: FeatureKind,
        id: i32,
    ) -> Result<Option<Feature>, FeatureRepositoryError> {
        let state = self.lock().map_err(FeatureRepositoryError::connection)?;
        Ok(state
            .features
            .rows
            .get(&id)
            .filter(|f| f.kind == kind)
            .cloned())
    }

    async fn insert(&self, feature: &NewFeature) -> Result<Feature, FeatureRepositoryError> {
        let mut state = self.lock().map_err(FeatureRepositoryError::connection)?;
        let stored = Feature {
            id: state.features.next_id + 1,
            kind: feature.kind,
            geometry: feature.geometry.clone(),
            fid: feature.fid,
            source: feature.source,
            attributes: feature.attributes.clone(),
            code_piste: feature.code_piste,
            login_id: feature.login_id,
            created_at: feature.created_at,
            updated_at: feature.updated_at,
        };
        if let Some(field) = state.missing_feature_reference(&stored) {
            return Err(FeatureRepositoryError::missing_reference(field));
        }
        state.features.insert(stored.clone());
        Ok(stored)
    }

    async fn update(&self, feature: &Feature) -> Result<Option<Feature>, FeatureRepositoryError> {
        let mut state = self.lock().map_err(FeatureRepositoryError::connection)?;
        let exists = state
            .features
            .rows
            .get(&feature.id)
            .is_some_and(|f| f.kind == feature.kind);
        if !exists {
            return Ok(None);
        }
        if let Some(field) = state.missing_feature_reference(feature) {
            return Err(FeatureRepositoryError::missing_reference(field));
        }
        state.features.rows.insert(feature.id, feature.clone());
        Ok(Some(feature.clone()))
    }

    async fn delete(&self, kind: FeatureKind, id: i32) -> Result<bool, FeatureRepositoryError> {
        let mut state = self.lock().map_err(FeatureRepositoryError::connection)?;
        let matches = state.features.rows.get(&id).is_some_and(|f| f.kind == kind);
        if matches {
            state.features.rows.remove(&id);
        }
        Ok(matches)
    }
}
