//! Login credentials and password hashing.
//!
//! Passwords are stored as Argon2id PHC strings with a random salt and are
//! only ever compared through [`PasswordHash::verify`].

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use zeroize::Zeroizing;

use super::Error;
use super::fields::missing_field;

/// Reasons a login payload is rejected before any lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// `mail` was missing or blank.
    #[error("mail must not be empty")]
    EmptyMail,
    /// `mdp` was missing or empty.
    #[error("mdp must not be empty")]
    EmptyPassword,
}

impl From<LoginValidationError> for Error {
    fn from(err: LoginValidationError) -> Self {
        match err {
            LoginValidationError::EmptyMail => missing_field("mail"),
            LoginValidationError::EmptyPassword => missing_field("mdp"),
        }
    }
}

/// Validated login payload.
///
/// # Examples
/// ```
/// use pprcollecte::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(Some(" agent@pprcollecte.gn "), Some("secret")).unwrap();
/// assert_eq!(creds.mail(), "agent@pprcollecte.gn");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    mail: String,
    password: Zeroizing<String>,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("mail", &self.mail)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl LoginCredentials {
    /// Validate raw `mail` and `mdp` values.
    ///
    /// # Errors
    /// [`LoginValidationError`] when either part is absent or blank.
    pub fn try_from_parts(
        mail: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, LoginValidationError> {
        let mail = mail
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or(LoginValidationError::EmptyMail)?;
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or(LoginValidationError::EmptyPassword)?;
        Ok(Self {
            mail: mail.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Mail used for the account lookup.
    #[must_use]
    pub fn mail(&self) -> &str {
        &self.mail
    }

    /// Clear-text password supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Argon2id hash of an account password in PHC string form.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

impl PasswordHash {
    /// Hash `password` with a fresh random salt.
    ///
    /// # Errors
    /// Internal error if the hasher rejects its parameters.
    pub fn hash(password: &str) -> Result<Self, Error> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
    }

    /// [`Self::hash`] on Tokio's blocking pool so request workers keep
    /// serving while Argon2 runs.
    ///
    /// # Errors
    /// As for [`Self::hash`], or internal error if the task is cancelled.
    pub async fn hash_blocking(password: &str) -> Result<Self, Error> {
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
    }

    /// Wrap a stored PHC string.
    #[must_use]
    pub const fn from_stored(phc: String) -> Self {
        Self(phc)
    }

    /// Stored PHC string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `password` matches. A stored value that is not a valid PHC
    /// string never matches.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        password_hash::PasswordHash::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// [`Self::verify`] on Tokio's blocking pool.
    ///
    /// # Errors
    /// Internal error if the task is cancelled.
    pub async fn verify_blocking(&self, password: &str) -> Result<bool, Error> {
        let stored = self.clone();
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || stored.verify(&password))
            .await
            .map_err(|err| Error::internal(format!("password check task failed: {err}")))
    }
}
