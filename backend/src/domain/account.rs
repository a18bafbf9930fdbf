//! Field agent accounts.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::auth::PasswordHash;
use super::Error;
use super::fields::{Presence, invalid_field, missing_field};

#[expect(
    clippy::expect_used,
    reason = "the pattern is a compile-time constant covered by tests"
)]
static MAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid mail pattern")
});

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Field surveyor.
    User,
    /// Regional administrator.
    Admin,
    /// Platform administrator.
    SuperAdmin,
}

impl Role {
    /// Stored and serialised name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccountValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(AccountValidationError::InvalidRole(other.to_owned())),
        }
    }
}

/// Validated mail address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Borrow the address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Email {
    type Error = AccountValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::Missing("mail"));
        }
        if !MAIL_PATTERN.is_match(trimmed) {
            return Err(AccountValidationError::InvalidMail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reasons account input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountValidationError {
    /// A required field was absent or blank.
    #[error("missing required field: {0}")]
    Missing(&'static str),
    /// `mail` is not an address.
    #[error("mail is not a valid address")]
    InvalidMail,
    /// `role` is not one of the known roles.
    #[error("role must be one of user, admin, super_admin (got {0})")]
    InvalidRole(String),
    /// `communes_rurales_id` is not positive.
    #[error("communes_rurales_id must be a positive integer")]
    InvalidCommune,
}

impl From<AccountValidationError> for Error {
    fn from(err: AccountValidationError) -> Self {
        let message = err.to_string();
        match err {
            AccountValidationError::Missing(field) => missing_field(field),
            AccountValidationError::InvalidMail => invalid_field("mail", "invalid_mail", message),
            AccountValidationError::InvalidRole(_) => {
                invalid_field("role", "invalid_role", message)
            }
            AccountValidationError::InvalidCommune => {
                invalid_field("communes_rurales_id", "invalid_id", message)
            }
        }
    }
}

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Surrogate identifier.
    pub id: i32,
    /// Family name.
    pub nom: String,
    /// Given name.
    pub prenom: String,
    /// Unique mail address.
    pub mail: Email,
    /// Password hash.
    pub password: PasswordHash,
    /// Role.
    pub role: Role,
    /// Owning commune.
    pub communes_rurales_id: Option<i32>,
}

impl Account {
    /// Public projection without the password.
    #[must_use]
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id,
            nom: self.nom.clone(),
            prenom: self.prenom.clone(),
            mail: self.mail.as_str().to_owned(),
            role: self.role,
            communes_rurales_id: self.communes_rurales_id,
        }
    }

    /// Apply an update whose password, if any, is already hashed.
    pub fn apply(&mut self, patch: AccountPatch, password: Option<PasswordHash>) {
        if let Some(nom) = patch.nom {
            self.nom = nom;
        }
        if let Some(prenom) = patch.prenom {
            self.prenom = prenom;
        }
        if let Some(mail) = patch.mail {
            self.mail = mail;
        }
        if let Some(password) = password {
            self.password = password;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(commune) = patch.communes_rurales_id {
            self.communes_rurales_id = commune;
        }
    }
}

/// Account as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Surrogate identifier.
    pub id: i32,
    /// Family name.
    pub nom: String,
    /// Given name.
    pub prenom: String,
    /// Mail address.
    pub mail: String,
    /// Role.
    pub role: Role,
    /// Owning commune.
    pub communes_rurales_id: Option<i32>,
}

/// Validated input for a new account, password still in clear.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountDraft {
    /// Family name.
    pub nom: String,
    /// Given name.
    pub prenom: String,
    /// Mail address.
    pub mail: Email,
    /// Clear-text password, hashed by the service.
    pub password: Zeroizing<String>,
    /// Role.
    pub role: Role,
    /// Owning commune.
    pub communes_rurales_id: Option<i32>,
}

impl fmt::Debug for AccountDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountDraft")
            .field("nom", &self.nom)
            .field("prenom", &self.prenom)
            .field("mail", &self.mail)
            .field("role", &self.role)
            .field("communes_rurales_id", &self.communes_rurales_id)
            .finish_non_exhaustive()
    }
}

/// Raw account fields as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountInput<'a> {
    /// Family name.
    pub nom: Option<&'a str>,
    /// Given name.
    pub prenom: Option<&'a str>,
    /// Mail address.
    pub mail: Option<&'a str>,
    /// Clear-text password.
    pub mdp: Option<&'a str>,
    /// Role name.
    pub role: Option<&'a str>,
    /// Owning commune; `Some(None)` clears it.
    pub communes_rurales_id: Presence<i32>,
}

fn required_text(value: Option<&str>, field: &'static str) -> Result<String, AccountValidationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or(AccountValidationError::Missing(field))
}

fn commune(value: Presence<i32>) -> Result<Presence<i32>, AccountValidationError> {
    match value {
        Some(Some(id)) if id <= 0 => Err(AccountValidationError::InvalidCommune),
        other => Ok(other),
    }
}

impl AccountDraft {
    /// Validate a creation payload.
    ///
    /// # Errors
    /// [`AccountValidationError`] for the first invalid field.
    pub fn try_from_input(input: &AccountInput<'_>) -> Result<Self, AccountValidationError> {
        let nom = required_text(input.nom, "nom")?;
        let prenom = required_text(input.prenom, "prenom")?;
        let mail = Email::try_from(input.mail.unwrap_or_default())?;
        let password = input
            .mdp
            .filter(|p| !p.is_empty())
            .ok_or(AccountValidationError::Missing("mdp"))?;
        let role = required_text(input.role, "role")?.parse()?;
        Ok(Self {
            nom,
            prenom,
            mail,
            password: Zeroizing::new(password.to_owned()),
            role,
            communes_rurales_id: commune(input.communes_rurales_id)?.flatten(),
        })
    }
}

/// Validated partial update.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    /// New family name.
    pub nom: Option<String>,
    /// New given name.
    pub prenom: Option<String>,
    /// New mail address.
    pub mail: Option<Email>,
    /// New clear-text password.
    pub password: Option<Zeroizing<String>>,
    /// New role.
    pub role: Option<Role>,
    /// New owning commune; `Some(None)` clears it.
    pub communes_rurales_id: Presence<i32>,
}

impl fmt::Debug for AccountPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountPatch")
            .field("nom", &self.nom)
            .field("prenom", &self.prenom)
            .field("mail", &self.mail)
            .field("password_changed", &self.password.is_some())
            .field("role", &self.role)
            .field("communes_rurales_id", &self.communes_rurales_id)
            .finish()
    }
}

impl AccountPatch {
    /// Validate an update payload. Supplied fields follow the creation rules.
    ///
    /// # Errors
    /// [`AccountValidationError`] for the first invalid supplied field.
    pub fn try_from_input(input: &AccountInput<'_>) -> Result<Self, AccountValidationError> {
        let nom = input.nom.map(|v| required_text(Some(v), "nom")).transpose()?;
        let prenom = input
            .prenom
            .map(|v| required_text(Some(v), "prenom"))
            .transpose()?;
        let mail = input.mail.map(Email::try_from).transpose()?;
        let password = input
            .mdp
            .map(|p| {
                if p.is_empty() {
                    Err(AccountValidationError::Missing("mdp"))
                } else {
                    Ok(Zeroizing::new(p.to_owned()))
                }
            })
            .transpose()?;
        let role = input.role.map(|r| r.trim().parse()).transpose()?;
        Ok(Self {
            nom,
            prenom,
            mail,
            password,
            role,
            communes_rurales_id: commune(input.communes_rurales_id)?,
        })
    }
}

/// Filters for listing accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountQuery {
    /// Only accounts with this role.
    pub role: Option<Role>,
    /// Only accounts attached to one of these communes.
    pub commune_ids: Option<Vec<i32>>,
}

/// An account ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Family name.
    pub nom: String,
    /// Given name.
    pub prenom: String,
    /// Mail address.
    pub mail: Email,
    /// Password hash.
    pub password: PasswordHash,
    /// Role.
    pub role: Role,
    /// Owning commune.
    pub communes_rurales_id: Option<i32>,
}
