//! Classification of pool and Diesel failures shared by every repository.
//!
//! Unique and foreign-key violations are reported against the column named
//! by the violated constraint. Constraints follow PostgreSQL's default
//! naming, `{table}_{column}_key` and `{table}_{column}_fkey`.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{
    AccountRepositoryError, AdminRepositoryError, FeatureRepositoryError, PisteRepositoryError,
    ReferenceLookupError,
};

use super::pool::PoolError;

/// What went wrong, independent of the repository that hit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFault {
    /// No usable connection.
    Connection(String),
    /// The statement failed.
    Query(String),
    /// A unique column already holds the value.
    Duplicate(String),
    /// A foreign key points at nothing.
    MissingReference(String),
}

pub(crate) fn classify_pool_error(error: PoolError) -> StoreFault {
    StoreFault::Connection(error.into_message())
}

pub(crate) fn classify_diesel_error(table: &str, error: DieselError) -> StoreFault {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, table, message = info.message(), "diesel operation failed");
        }
        _ => debug!(table, %error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreFault::Duplicate(constraint_column(table, info.constraint_name(), "_key"))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            StoreFault::MissingReference(constraint_column(table, info.constraint_name(), "_fkey"))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreFault::Connection("database connection error".to_owned())
        }
        DieselError::NotFound => StoreFault::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => StoreFault::Query("database query error".to_owned()),
        DieselError::DeserializationError(err) => {
            StoreFault::Query(format!("unreadable row: {err}"))
        }
        _ => StoreFault::Query("database error".to_owned()),
    }
}

impl From<StoreFault> for AccountRepositoryError {
    fn from(fault: StoreFault) -> Self {
        match fault {
            StoreFault::Connection(message) => Self::connection(message),
            StoreFault::Query(message) => Self::query(message),
            StoreFault::Duplicate(field) => Self::duplicate(field),
            StoreFault::MissingReference(field) => Self::missing_reference(field),
        }
    }
}

impl From<StoreFault> for PisteRepositoryError {
    fn from(fault: StoreFault) -> Self {
        match fault {
            StoreFault::Connection(message) => Self::connection(message),
            StoreFault::Query(message) => Self::query(message),
            StoreFault::Duplicate(field) => Self::duplicate(field),
            StoreFault::MissingReference(field) => Self::missing_reference(field),
        }
    }
}

impl From<StoreFault> for FeatureRepositoryError {
    fn from(fault: StoreFault) -> Self {
        match fault {
            StoreFault::Connection(message) => Self::connection(message),
            StoreFault::Query(message) => Self::query(message),
            StoreFault::Duplicate(field) => Self::query(format!("unexpected duplicate {field}")),
            StoreFault::MissingReference(field) => Self::missing_reference(field),
        }
    }
}

impl From<StoreFault> for AdminRepositoryError {
    fn from(fault: StoreFault) -> Self {
        match fault {
            StoreFault::Connection(message) => Self::connection(message),
            StoreFault::Query(message) => Self::query(message),
            StoreFault::Duplicate(field) => Self::query(format!("unexpected duplicate {field}")),
            StoreFault::MissingReference(field) => Self::missing_reference(field),
        }
    }
}

impl From<StoreFault> for ReferenceLookupError {
    fn from(fault: StoreFault) -> Self {
        match fault {
            StoreFault::Connection(message) => Self::connection(message),
            other => Self::query(format!("{other:?}")),
        }
    }
}

fn constraint_column(table: &str, constraint: Option<&str>, suffix: &str) -> String {
    constraint
        .and_then(|name| name.strip_prefix(table))
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(suffix))
        .filter(|column| !column.is_empty())
        .unwrap_or("unknown")
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorInformation;
    use rstest::rstest;

    struct Violation(&'static str);

    impl DatabaseErrorInformation for Violation {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            Some(self.0)
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: &'static str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Violation(constraint)))
    }

    #[rstest]
    #[case("login", Some("login_mail_key"), "_key", "mail")]
    #[case("pistes", Some("pistes_code_piste_key"), "_key", "code_piste")]
    #[case("pistes", Some("pistes_communes_rurales_id_fkey"), "_fkey", "communes_rurales_id")]
    #[case("infrastructures", Some("infrastructures_login_id_fkey"), "_fkey", "login_id")]
    #[case("login", Some("other_table_mail_key"), "_key", "unknown")]
    #[case("login", None, "_key", "unknown")]
    fn column_from_constraint(
        #[case] table: &str,
        #[case] constraint: Option<&str>,
        #[case] suffix: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(constraint_column(table, constraint, suffix), expected);
    }

    #[rstest]
    fn pool_errors_are_connection_faults() {
        assert_eq!(
            classify_pool_error(PoolError::checkout("timed out")),
            StoreFault::Connection("timed out".to_owned())
        );
    }

    #[rstest]
    fn not_found_is_a_query_fault() {
        assert!(matches!(
            classify_diesel_error("pistes", DieselError::NotFound),
            StoreFault::Query(_)
        ));
    }

    #[rstest]
    fn unique_violation_names_the_column() {
        let fault = classify_diesel_error(
            "pistes",
            database_error(DatabaseErrorKind::UniqueViolation, "pistes_code_piste_key"),
        );
        assert_eq!(fault, StoreFault::Duplicate("code_piste".to_owned()));
        assert_eq!(
            PisteRepositoryError::from(fault),
            PisteRepositoryError::duplicate("code_piste")
        );
    }

    #[rstest]
    fn foreign_key_violation_is_a_missing_reference() {
        let fault = classify_diesel_error(
            "infrastructures",
            database_error(
                DatabaseErrorKind::ForeignKeyViolation,
                "infrastructures_code_piste_fkey",
            ),
        );
        assert_eq!(
            FeatureRepositoryError::from(fault),
            FeatureRepositoryError::missing_reference("code_piste")
        );
    }

    #[rstest]
    fn closed_connection_is_a_connection_fault() {
        let fault = classify_diesel_error(
            "login",
            database_error(DatabaseErrorKind::ClosedConnection, "login_pkey"),
        );
        assert!(matches!(
            AccountRepositoryError::from(fault),
            AccountRepositoryError::Connection { .. }
        ));
    }
}
