//! PostgreSQL-backed `AccountRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, AccountQuery, Email, NewAccount, PasswordHash};

use super::diesel_error_mapping::{classify_diesel_error, classify_pool_error};
use super::models::{AccountRow, AccountValues};
use super::pool::{DbPool, PoolError};
use super::schema::login;

/// Diesel implementation of [`AccountRepository`] over the `login` table.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    classify_pool_error(error).into()
}

fn map_diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    classify_diesel_error("login", error).into()
}

fn row_to_account(row: AccountRow) -> Result<Account, AccountRepositoryError> {
    let mail = Email::try_from(row.mail.as_str()).map_err(|err| {
        AccountRepositoryError::query(format!("stored account {} has {err}", row.id))
    })?;
    let role = row.role.parse().map_err(|err| {
        AccountRepositoryError::query(format!("stored account {} has {err}", row.id))
    })?;
    Ok(Account {
        id: row.id,
        nom: row.nom,
        prenom: row.prenom,
        mail,
        password: PasswordHash::from_stored(row.mdp),
        role,
        communes_rurales_id: row.communes_rurales_id,
    })
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn list(&self, query: &AccountQuery) -> Result<Vec<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut statement = login::table
            .select(AccountRow::as_select())
            .order(login::id.asc())
            .into_boxed();
        if let Some(role) = query.role {
            statement = statement.filter(login::role.eq(role.as_str()));
        }
        if let Some(ids) = &query.commune_ids {
            statement = statement.filter(login::communes_rurales_id.eq_any(ids.clone()));
        }
        let rows: Vec<AccountRow> = statement.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_account).collect()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AccountRow> = login::table
            .find(id)
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn find_by_mail(&self, mail: &str) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AccountRow> = login::table
            .filter(login::mail.eq(mail))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn insert(&self, account: &NewAccount) -> Result<Account, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let values = AccountValues {
            nom: &account.nom,
            prenom: &account.prenom,
            mail: account.mail.as_str(),
            mdp: account.password.as_str(),
            role: account.role.as_str(),
            communes_rurales_id: account.communes_rurales_id,
        };
        let row: AccountRow = diesel::insert_into(login::table)
            .values(&values)
            .returning(AccountRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_account(row)
    }

    async fn update(&self, account: &Account) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let values = AccountValues {
            nom: &account.nom,
            prenom: &account.prenom,
            mail: account.mail.as_str(),
            mdp: account.password.as_str(),
            role: account.role.as_str(),
            communes_rurales_id: account.communes_rurales_id,
        };
        let row: Option<AccountRow> = diesel::update(login::table.find(account.id))
            .set(&values)
            .returning(AccountRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn delete(&self, id: i32) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(login::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
