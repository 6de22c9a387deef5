use std::sync::Arc;

use anyhow::Context as _;
use parameter::{ParameterUseCase, ParameterUseCaseImpl};

use crate::{
    config::ApplicationConfig,
    database::{
        close_connection, ensure_data_directory,
        migration::{ensure_columns, ensure_table},
        ConnectionProvider, SqliteConnectionProvider,
    },
    domain::parameter::{ParameterService, SqliteParameterService},
};

pub(crate) mod parameter;

pub(crate) struct Application {
    connection_provider: Arc<dyn ConnectionProvider + Sync + Send>,
    parameter_service: Arc<dyn ParameterService + Sync + Send>,
}

impl Application {
    pub fn new(
        connection_provider: Arc<dyn ConnectionProvider + Sync + Send>,
        parameter_service: Arc<dyn ParameterService + Sync + Send>,
    ) -> Self {
        Self { connection_provider, parameter_service }
    }

    pub fn parameter(&self) -> impl ParameterUseCase {
        ParameterUseCaseImpl::new(self.connection_provider.clone(), self.parameter_service.clone())
    }
}

pub(super) async fn init(config: &ApplicationConfig) -> anyhow::Result<Application> {
    ensure_data_directory(&config.database.path)?;

    let connection_provider = Arc::new(SqliteConnectionProvider::new(&config.database));
    prepare_schema(connection_provider.as_ref()).await?;

    let parameter_service = Arc::new(SqliteParameterService);

    Ok(Application::new(connection_provider, parameter_service))
}

/// Bootstraps the parameters table and applies additive column migrations. Runs before the server
/// accepts traffic.
pub(crate) async fn prepare_schema(connection_provider: &(dyn ConnectionProvider + Sync + Send)) -> anyhow::Result<()> {
    let connection =
        connection_provider.open().await.context("could not open the database to verify its schema")?;

    let result = async {
        ensure_table(&connection).await?;
        ensure_columns(&connection).await?;
        Ok::<_, sea_orm::DbErr>(())
    }
    .await;

    close_connection(connection).await;

    Ok(result?)
}
