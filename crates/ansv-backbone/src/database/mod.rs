use std::path::{Path, PathBuf};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{error, info};

use crate::config::DatabaseConfig;

pub(crate) mod migration;
pub(crate) mod parameter;

/// Hands out a fresh connection per unit of work.
///
/// Failures are logged by the provider and reported as `None`; callers treat a missing connection as
/// "storage unavailable".
#[cfg_attr(test, automock)]
#[async_trait]
pub(crate) trait ConnectionProvider {
    async fn open(&self) -> Option<DatabaseConnection>;
}

pub(crate) struct SqliteConnectionProvider {
    database_path: PathBuf,
}

impl SqliteConnectionProvider {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self { database_path: config.path.clone() }
    }

    fn connection_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.database_path.display())
    }
}

#[async_trait]
impl ConnectionProvider for SqliteConnectionProvider {
    async fn open(&self) -> Option<DatabaseConnection> {
        let mut options = ConnectOptions::new(self.connection_url());
        options.max_connections(1).min_connections(1).sqlx_logging_level(tracing::log::LevelFilter::Debug);

        match Database::connect(options).await {
            Ok(connection) => Some(connection),
            Err(e) => {
                error!(error = %e, path = %self.database_path.display(), "failed to connect to database.");
                None
            }
        }
    }
}

pub(crate) async fn close_connection(connection: DatabaseConnection) {
    if let Err(e) = connection.close().await {
        error!(error = %e, "failed to close database connection.");
    }
}

pub(crate) fn ensure_data_directory(database_path: &Path) -> anyhow::Result<()> {
    let Some(data_dir) = database_path.parent() else {
        return Ok(());
    };
    if data_dir.as_os_str().is_empty() || data_dir.exists() {
        return Ok(());
    }

    std::fs::create_dir_all(data_dir)?;
    info!(path = %data_dir.display(), "data directory created.");

    Ok(())
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use crate::config::DatabaseConfig;

    use super::{ensure_data_directory, ConnectionProvider, SqliteConnectionProvider};

    #[tokio::test]
    async fn when_data_directory_is_missing_then_it_is_created_and_database_opens() {
        let temp_dir = tempfile::tempdir().expect("creating temp dir should be successful");
        let database_path = temp_dir.path().join("data").join("soporte_db.db");

        ensure_data_directory(&database_path).expect("creating data directory should be successful");
        assert!(database_path.parent().expect("database path should have a parent").exists());

        let provider = SqliteConnectionProvider::new(&DatabaseConfig { path: database_path.clone() });
        let connection = provider.open().await.expect("opening connection should be successful");
        connection.close().await.expect("closing connection should be successful");

        assert!(database_path.exists());
    }

    #[tokio::test]
    async fn when_database_directory_does_not_exist_then_provider_returns_none() {
        let temp_dir = tempfile::tempdir().expect("creating temp dir should be successful");
        let database_path: PathBuf = temp_dir.path().join("missing").join("soporte_db.db");

        let provider = SqliteConnectionProvider::new(&DatabaseConfig { path: database_path });

        assert!(provider.open().await.is_none());
    }
}
