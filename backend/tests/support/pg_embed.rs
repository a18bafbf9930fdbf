//! Embedded PostgreSQL bootstrap for the Diesel adapter suites.
//!
//! Every test receives a fresh database on a cluster shared by the test
//! binary, migrated with the production migration runner. The schema needs
//! the PostGIS extension. Stock embedded PostgreSQL builds ship without it,
//! so point `PG_RUNTIME_DIR` at a PostGIS-enabled installation to run these
//! suites; without the extension they skip with a `SKIP-TEST-CLUSTER` marker.

use std::thread;
use std::time::Duration;

use diesel::dsl::sql;
use diesel::pg::PgConnection;
use diesel::sql_types::Bool;
use diesel::{Connection, RunQueryDsl};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use pprcollecte::outbound::persistence::run_pending_migrations;
use tokio::runtime::Runtime;

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Why a migrated database could not be provided.
#[derive(Debug)]
pub enum SetupFailure {
    /// The embedded cluster or the per-test database could not be created.
    Cluster(String),
    /// The cluster runs without the PostGIS extension.
    MissingPostgis,
    /// The schema migrations failed to apply.
    Migration(String),
}

/// A migrated, empty database owned by one test.
pub struct MigratedDatabase {
    pub url: String,
    _database: TemporaryDatabase,
}

fn shared_cluster() -> Result<&'static ClusterHandle, SetupFailure> {
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt >= SHARED_CLUSTER_RETRIES => {
                return Err(SetupFailure::Cluster(format!("{error:?}")));
            }
            Err(_) => {
                thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

fn postgis_available(url: &str) -> Result<bool, SetupFailure> {
    let mut conn = PgConnection::establish(url)
        .map_err(|err| SetupFailure::Cluster(format!("connect: {err}")))?;
    diesel::select(sql::<Bool>(
        "EXISTS (SELECT 1 FROM pg_available_extensions WHERE name = 'postgis')",
    ))
    .get_result(&mut conn)
    .map_err(|err| SetupFailure::Cluster(format!("extension check: {err}")))
}

/// Create a database on the shared cluster and apply every migration.
pub fn migrated_database(runtime: &Runtime) -> Result<MigratedDatabase, SetupFailure> {
    let cluster = shared_cluster()?;
    let database = cluster
        .create_temporary_database()
        .map_err(|err| SetupFailure::Cluster(format!("create database: {err:?}")))?;
    let url = database.url().to_owned();
    if !postgis_available(&url)? {
        return Err(SetupFailure::MissingPostgis);
    }
    runtime
        .block_on(run_pending_migrations(&url))
        .map_err(|err| SetupFailure::Migration(err.to_string()))?;
    Ok(MigratedDatabase {
        url,
        _database: database,
    })
}

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Turn a setup failure into a skip or a test failure.
///
/// A cluster without PostGIS always skips. Cluster bootstrap failures skip
/// only when `SKIP_TEST_CLUSTER` is set so CI breakage is not masked, and a
/// failing migration always fails the test.
///
/// # Panics
/// On migration failures, and on cluster failures unless skipping is enabled.
#[expect(
    clippy::print_stderr,
    reason = "skip markers are grepped from test output"
)]
pub fn handle_setup_failure<T>(failure: SetupFailure) -> Option<T> {
    match failure {
        SetupFailure::MissingPostgis => {
            eprintln!("SKIP-TEST-CLUSTER: postgis extension is not installed in the cluster");
            None
        }
        SetupFailure::Cluster(reason) if should_skip_test_cluster() => {
            eprintln!("SKIP-TEST-CLUSTER: {reason}");
            None
        }
        SetupFailure::Cluster(reason) => {
            panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.")
        }
        SetupFailure::Migration(reason) => panic!("migrations failed to apply: {reason}"),
    }
}
