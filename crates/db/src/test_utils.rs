//! Scratch `PostgreSQL` databases for the integration tests.

use std::sync::Arc;

use civicpulse_common::IdGenerator;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// Tables in child-to-parent order.
const TABLES: [&str; 4] = ["report_upvote", "report_timeline", "report", "profile"];

/// Where the integration tests find `PostgreSQL`, read from `TEST_DB_*`.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        let var = |key: &str, fallback: &str| {
            std::env::var(key).unwrap_or_else(|_| fallback.to_string())
        };
        Self {
            host: var("TEST_DB_HOST", "localhost"),
            port: var("TEST_DB_PORT", "5433").parse().unwrap_or(5433),
            username: var("TEST_DB_USER", "civicpulse_test"),
            password: var("TEST_DB_PASSWORD", "civicpulse_test"),
            database: var("TEST_DB_NAME", "civicpulse_test"),
        }
    }
}

impl TestDbConfig {
    /// URL of the configured database.
    #[must_use]
    pub fn database_url(&self) -> String {
        self.url_for(&self.database)
    }

    fn url_for(&self, database: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{database}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// A migrated database created for one test.
pub struct TestDatabase {
    conn: Arc<DatabaseConnection>,
    config: TestDbConfig,
}

impl TestDatabase {
    /// Connect to the configured database as is.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;
        Ok(Self {
            conn: Arc::new(conn),
            config,
        })
    }

    /// Create and migrate a database of its own, so tests can run in parallel.
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let id = IdGenerator::new().generate();
        // The tail of a ULID is its random part
        config.database = format!("civicpulse_test_{}", &id[id.len() - 10..]);

        let admin = Database::connect(&config.url_for("postgres")).await?;
        admin
            .execute_unprepared(&format!("CREATE DATABASE \"{}\"", config.database))
            .await?;
        admin.close().await?;

        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;
        info!(database = %config.database, "Created test database");

        Ok(Self {
            conn: Arc::new(conn),
            config,
        })
    }

    /// Shared connection for building repositories.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Empty every civicpulse table, keeping the schema.
    pub async fn truncate(&self) -> Result<(), DbErr> {
        self.conn
            .execute_unprepared(&format!("TRUNCATE TABLE {}", TABLES.join(", ")))
            .await?;
        Ok(())
    }

    /// Drop the database even while repositories still hold the connection.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        let admin = Database::connect(&self.config.url_for("postgres")).await?;
        admin
            .execute_unprepared(&format!(
                "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
                self.config.database
            ))
            .await?;
        admin.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_admin_database() {
        let config = TestDbConfig {
            host: "db".to_string(),
            port: 5433,
            username: "user".to_string(),
            password: "pass".to_string(),
            database: "civicpulse_test".to_string(),
        };

        assert_eq!(config.database_url(), "postgres://user:pass@db:5433/civicpulse_test");
        assert_eq!(config.url_for("postgres"), "postgres://user:pass@db:5433/postgres");
    }

    #[test]
    fn test_tables_children_first() {
        let position = |t: &str| TABLES.iter().position(|x| *x == t);
        assert!(position("report_upvote") < position("report"));
        assert!(position("report_timeline") < position("report"));
        assert!(position("report") < position("profile"));
    }
}
