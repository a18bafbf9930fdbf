//! Account services: login, listing and administration.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::collection::{ensure_reference, scoped_communes, store_error};
use super::ports::{
    AccountRepository, AccountsCommand, AccountsListRequest, AccountsQuery, AdminRepository,
    LoginService, ReferenceLookup, ReferenceTarget,
};
use super::{
    AccountDraft, AccountPatch, AccountProfile, AccountQuery, Error, LoginCredentials, NewAccount,
    PasswordHash,
};

const CONTEXT: &str = "account repository";

/// Implements the account driving ports over an [`AccountRepository`].
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    admin: Arc<dyn AdminRepository>,
    references: Arc<dyn ReferenceLookup>,
}

impl AccountService {
    /// Build the service from its driven ports.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        admin: Arc<dyn AdminRepository>,
        references: Arc<dyn ReferenceLookup>,
    ) -> Self {
        Self {
            accounts,
            admin,
            references,
        }
    }

    async fn ensure_commune(&self, commune: Option<i32>) -> Result<(), Error> {
        ensure_reference(
            self.references.as_ref(),
            ReferenceTarget::Commune,
            "communes_rurales_id",
            commune,
        )
        .await
    }
}

#[async_trait]
impl LoginService for AccountService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AccountProfile, Error> {
        let account = self
            .accounts
            .find_by_mail(credentials.mail())
            .await
            .map_err(|err| store_error(CONTEXT, err))?
            .ok_or_else(|| Error::not_found("no account for this mail"))?;
        if account.password.verify_blocking(credentials.password()).await? {
            info!(account_id = account.id, "login succeeded");
            Ok(account.profile())
        } else {
            warn!(account_id = account.id, "login rejected: password mismatch");
            Err(Error::unauthorized("incorrect password"))
        }
    }
}

#[async_trait]
impl AccountsQuery for AccountService {
    async fn list(&self, request: AccountsListRequest) -> Result<Vec<AccountProfile>, Error> {
        let commune_ids = scoped_communes(self.admin.as_ref(), request.scope).await?;
        let query = AccountQuery {
            role: request.role,
            commune_ids,
        };
        let accounts = self
            .accounts
            .list(&query)
            .await
            .map_err(|err| store_error(CONTEXT, err))?;
        Ok(accounts.iter().map(super::Account::profile).collect())
    }
}

#[async_trait]
impl AccountsCommand for AccountService {
    async fn create(&self, draft: AccountDraft) -> Result<AccountProfile, Error> {
        self.ensure_commune(draft.communes_rurales_id).await?;
        let password = PasswordHash::hash_blocking(&draft.password).await?;
        let account = self
            .accounts
            .insert(&NewAccount {
                nom: draft.nom,
                prenom: draft.prenom,
                mail: draft.mail,
                password,
                role: draft.role,
                communes_rurales_id: draft.communes_rurales_id,
            })
            .await
            .map_err(|err| store_error(CONTEXT, err))?;
        info!(account_id = account.id, role = %account.role, "account created");
        Ok(account.profile())
    }

    async fn update(&self, id: i32, patch: AccountPatch) -> Result<AccountProfile, Error> {
        let mut account = self
            .accounts
            .find_by_id(id)
            .await
            .map_err(|err| store_error(CONTEXT, err))?
            .ok_or_else(|| Error::not_found(format!("account {id} not found")))?;
        self.ensure_commune(patch.communes_rurales_id.flatten()).await?;
        let password = match patch.password.as_deref() {
            Some(clear) => Some(PasswordHash::hash_blocking(clear).await?),
            None => None,
        };
        account.apply(patch, password);
        let stored = self
            .accounts
            .update(&account)
            .await
            .map_err(|err| store_error(CONTEXT, err))?
            .ok_or_else(|| Error::not_found(format!("account {id} not found")))?;
        info!(account_id = id, "account updated");
        Ok(stored.profile())
    }

    async fn delete(&self, id: i32) -> Result<(), Error> {
        let deleted = self
            .accounts
            .delete(id)
            .await
            .map_err(|err| store_error(CONTEXT, err))?;
        if deleted {
            info!(account_id = id, "account deleted");
            Ok(())
        } else {
            Err(Error::not_found(format!("account {id} not found")))
        }
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
