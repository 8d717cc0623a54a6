//! PostgreSQL test infrastructure
//!
//! `TestDatabase` starts a PostgreSQL container and applies the workspace
//! migrations, yielding a fully migrated connection per test.

use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;

/// A disposable PostgreSQL database for integration tests.
///
/// The container lives as long as this value; dropping it tears the
/// database down.
pub struct TestDatabase {
    _container: ContainerAsync<Postgres>,
    connection: DatabaseConnection,
}

impl TestDatabase {
    /// Start a fresh PostgreSQL container and run all migrations.
    ///
    /// Panics when no Docker daemon is reachable; tests using this helper
    /// are opt-in for environments that have one.
    pub async fn new() -> Self {
        let container = Postgres::default()
            .start()
            .await
            .expect("failed to start postgres container");

        let host = container.get_host().await.expect("container host");
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("container port");

        let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

        let connection = Database::connect(&url)
            .await
            .expect("failed to connect to test database");

        Migrator::up(&connection, None)
            .await
            .expect("failed to run migrations");

        tracing::debug!("Test database ready at {}", url);

        Self {
            _container: container,
            connection,
        }
    }

    /// A cloneable connection to the migrated database.
    pub fn connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }
}
